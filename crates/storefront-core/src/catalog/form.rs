use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Product, ProductDraft};

static PRICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").expect("valid price pattern"));

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+").expect("valid url pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Title,
    Description,
    Price,
    Discount,
    ImageUrl,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Description,
        FormField::Price,
        FormField::Discount,
        FormField::ImageUrl,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Price => "Price",
            FormField::Discount => "Discount (%)",
            FormField::ImageUrl => "Image URL",
        }
    }
}

/// Field-level messages from a failed validation, in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<(FormField, &'static str)>,
}

impl ValidationErrors {
    fn push(&mut self, field: FormField, message: &'static str) {
        self.errors.push((field, message));
    }

    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| *message)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

/// Raw text of the create/edit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub discount: String,
    pub image_url: String,
}

impl ProductForm {
    /// Pre-fill the form for editing an existing product
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            discount: product
                .discount_percentage
                .map(|d| d.to_string())
                .unwrap_or_default(),
            image_url: product.thumbnail.clone(),
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Price => &self.price,
            FormField::Discount => &self.discount,
            FormField::ImageUrl => &self.image_url,
        }
    }

    pub fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::Price => &mut self.price,
            FormField::Discount => &mut self.discount,
            FormField::ImageUrl => &mut self.image_url,
        }
    }

    /// Check every field and build the request body.
    pub fn validate(&self) -> Result<ProductDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FormField::Title, "Title is required.");
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.push(FormField::Description, "Description is required.");
        }

        let price = self.price.trim();
        let parsed_price = if price.is_empty() {
            errors.push(FormField::Price, "Price is required.");
            None
        } else if !PRICE_PATTERN.is_match(price) {
            errors.push(FormField::Price, "Invalid price.");
            None
        } else {
            price.parse::<f64>().ok()
        };

        let discount = self.discount.trim();
        let parsed_discount = if discount.is_empty() {
            errors.push(FormField::Discount, "Discount is required.");
            None
        } else {
            match discount.parse::<f64>() {
                Ok(d) if d.is_finite() => Some(d),
                _ => {
                    errors.push(FormField::Discount, "Invalid discount.");
                    None
                }
            }
        };

        let image_url = self.image_url.trim();
        if image_url.is_empty() {
            errors.push(FormField::ImageUrl, "Image URL is required.");
        } else if !URL_PATTERN.is_match(image_url) {
            errors.push(FormField::ImageUrl, "Enter a valid URL.");
        }

        match (parsed_price, parsed_discount) {
            (Some(price), Some(discount_percentage)) if errors.is_empty() => Ok(ProductDraft {
                title: title.to_string(),
                description: description.to_string(),
                price,
                discount_percentage,
                thumbnail: image_url.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_on: Option<DateTime<Utc>>,
}

impl Product {
    /// Price before the discount was applied, rounded to cents.
    ///
    /// `None` when there is no discount, or when the discount is 100% or more
    /// and the original price cannot be recovered.
    pub fn original_price(&self) -> Option<f64> {
        let discount = self.discount_percentage?;
        if discount <= 0.0 || discount >= 100.0 {
            return None;
        }
        let original = self.price / (1.0 - discount / 100.0);
        Some((original * 100.0).round() / 100.0)
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }
}

/// Response of `GET /products/category/{slug}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Body sent to create or update a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub discount_percentage: f64,
    pub thumbnail: String,
}

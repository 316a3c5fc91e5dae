//! Catalog structure shown by the front end.
//!
//! Products are browsed by category group: each group is one tab and bundles
//! several API categories whose products are listed together.

pub mod form;

pub use form::{FormField, ProductForm, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryGroup {
    pub label: &'static str,
    pub categories: &'static [&'static str],
}

impl CategoryGroup {
    /// Stable identifier for the group, used as a cache key.
    pub fn key(&self) -> String {
        self.categories.join("+")
    }
}

pub const CATEGORY_GROUPS: &[CategoryGroup] = &[
    CategoryGroup {
        label: "Men's Products",
        categories: &["mens-shirts", "mens-shoes", "mens-watches"],
    },
    CategoryGroup {
        label: "Women's Products",
        categories: &[
            "womens-bags",
            "womens-dresses",
            "womens-jewellery",
            "womens-shoes",
            "womens-watches",
        ],
    },
];

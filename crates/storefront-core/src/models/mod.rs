//! Data models for catalog entities.
//!
//! - `Product`, `ProductDraft`: catalog items and the body used to create/edit them
//! - `UserProfile`: the signed-in user as returned by the login endpoint

pub mod product;
pub mod user;

pub use product::{CategoryResponse, Product, ProductDraft};
pub use user::UserProfile;

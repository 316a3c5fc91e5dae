//! REST API client module for the product catalog service.
//!
//! This module provides the `ApiClient` for logging in and for the product
//! CRUD endpoints, and `ApiError` for typed HTTP failures.
//!
//! Failures keep the `message` field of the response body so it can be shown
//! to the user as-is.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::{user_message, ApiError, ErrorBody};

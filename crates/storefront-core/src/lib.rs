//! Core library for the storefront manager.
//!
//! This crate holds everything that is independent of the terminal front end:
//!
//! - `api`: REST client for the remote product catalog and its login endpoint
//! - `auth`: the persisted session store and its key-value storage backends
//! - `guard`: the route guard that redirects between login and home
//! - `catalog`: category groups and the product form validation rules
//! - `cache`: local JSON cache of product lists
//! - `config`: configuration file and environment overrides
//! - `models`: products and user profiles
//! - `utils`: display formatting helpers

pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod guard;
pub mod models;
pub mod utils;

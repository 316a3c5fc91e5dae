//! Content rendering for each screen.

pub mod detail;
pub mod form;
pub mod login;
pub mod products;
pub mod settings;

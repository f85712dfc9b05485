//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod auth;
pub mod employees;
pub mod extract;
pub mod health;

pub use extract::{ValidPath, ValidatedJson};

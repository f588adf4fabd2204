//! # playnet-core
//!
//! Core crate for Playnet. Contains configuration schemas, typed
//! identifiers, domain events, pagination types, and the unified error
//! system shared by every other crate.
//!
//! This crate has **no** internal dependencies on other Playnet crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

//! # muslib Common Library
//!
//! Shared code for the muslib song catalog including:
//! - Song data model
//! - Database initialization and schema
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};

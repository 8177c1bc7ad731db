//! # Studio Common Library
//!
//! Shared code for the studio-management service:
//! - Error taxonomy shared by stores and services
//! - Bootstrap configuration (TOML + root folder resolution)
//! - Database initialization, schema and row models
//! - Time and UUID helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};

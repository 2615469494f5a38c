//! # SECOP Common Library
//!
//! Shared code for the SECOP supplier lookup service:
//! - Error and result types
//! - Configuration loading
//! - Record model with typed field coercion
//! - Date parsing and display formatting

pub mod config;
pub mod error;
pub mod format;
pub mod record;
pub mod time;

pub use error::{Error, Result};
pub use record::{Record, RecordSet};

//! Core types, errors, and configuration for sftkit.
//!
//! This crate provides the foundational pieces shared by the data pipeline:
//!
//! - The record and batch types (`Example`, `EncodedExample`, `Batch`)
//! - Configuration types for sequence building, collation, and loading
//! - Error handling infrastructure

#![warn(missing_docs)]

mod config;
mod error;
mod types;

pub use config::*;
pub use error::*;
pub use types::*;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::{Result, SftError};
    pub use crate::types::*;
}

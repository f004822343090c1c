//! Shared test utilities for the field-plotter workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic forecast and reference fields
//! - Dataset documents built from those fields
//! - On-disk member trees laid out the way inference output is stored
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{write_member_tree, time::FORECAST_TIME};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

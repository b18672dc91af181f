//! Core types and configuration for the bond reconciliation system.
//!
//! This crate provides shared types used across all other crates:
//! - Purchase and redemption records
//! - Match outcomes, classifications and materialized transactions
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, ReconcileConfig, UnredeemedPolicy};
pub use error::{Error, Result};
pub use types::*;

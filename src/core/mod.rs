//! Core infrastructure for bulk publishing
//!
//! This module provides:
//! - Directory enumeration and repository naming
//! - Oversized file detection
//! - Run statistics and live progress reporting
//! - Layered configuration

pub mod config;

// Internal modules - not part of public API
pub(crate) mod discovery;
pub(crate) mod job;
pub(crate) mod naming;
pub(crate) mod oversize;
pub(crate) mod progress;
pub(crate) mod stats;

// Public API - curated exports only
pub mod api;

pub use api::*;

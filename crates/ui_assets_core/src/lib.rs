//! Shared UI asset deployment domain primitives.
//!
//! This crate owns the custom-resource event and callback contracts, the
//! asset manifest, the runtime configuration bundle, and storage key helpers.
//! It intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod contract;
pub mod manifest;
pub mod runtime_config;
pub mod storage_keys;

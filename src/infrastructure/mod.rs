//! Infrastructure layer.
//!
//! Technical concerns that support the client without containing exchange
//! logic: configuration loading, validation and logging setup.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation

pub mod config;

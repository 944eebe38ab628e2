//! Gems Common - Shared configuration, logging and error types for the screener.
//!
//! This crate provides:
//! - Configuration types and loading (`~/.gems/config.json`)
//! - Error types and handling utilities
//! - Logging setup with noise filtering

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    Config, DataSourceConfig, ObservabilityConfig, OutputConfig, ScreenerOverrides,
};
pub use error::{Error, Result, ResultExt};

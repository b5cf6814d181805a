//! flagctl - manage feature flags and rollout rules from the terminal
//!
//! This crate provides the core functionality for the `flagctl` CLI tool,
//! a client for a LaunchDarkly-compatible flag management REST API.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`api`] - Typed flag documents, gateway trait, reqwest client
//! - [`rules`] - Rollout rule construction and the two patch strategies
//! - [`config`] - Base URL / project / access token resolution
//! - [`validate`] - Pre-flight input validation
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod rules;
pub mod validate;

pub use error::{Error, Result};

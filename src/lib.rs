//! Droidforge - recipe-driven cross-compilation and bundling for Android
//!
//! This library provides the core functionality for cross-compiling a language
//! runtime and its native extension modules against the Android NDK, then
//! packaging the result into a distributable bundle.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and dispatch
//! - [`core`] - Business logic: recipes, resolution, environments, packaging
//! - [`infra`] - Infrastructure layer (filesystem, processes, NDK layout)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

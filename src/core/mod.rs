//! Core business logic module
//!
//! This module contains all business logic for droidforge. Filesystem and
//! process side effects go through [`crate::infra`].
//!
//! # Submodules
//!
//! - [`recipe`] - Recipe definitions and the recipe registry
//! - [`arch`] - Target architecture descriptors
//! - [`resolver`] - Build-order resolution over the recipe graph
//! - [`build_env`] - Cross-compilation environment construction
//! - [`builder`] - Recipe build execution and orchestration
//! - [`filter`] - Copy-filter rules for packaging passes
//! - [`bundle`] - Bundle packaging

pub mod arch;
pub mod build_env;
pub mod builder;
pub mod bundle;
pub mod filter;
pub mod recipe;
pub mod resolver;

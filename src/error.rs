//! Error types for droidforge
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Recipe definition errors
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Recipe not found in registry
    #[error("Recipe '{name}' not found in registry")]
    NotFound { name: String },

    /// Missing required field
    #[error("Recipe '{recipe}' is missing required field '{field}'")]
    MissingField { recipe: String, field: String },

    /// Empty alternative-group
    #[error("Recipe '{recipe}' declares an empty alternative-group dependency")]
    EmptyAlternativeGroup { recipe: String },

    /// Parse error
    #[error("Failed to parse recipe definition: {0}")]
    ParseError(String),
}

/// Dependency resolution errors
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Circular dependency detected
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    /// Two mutually exclusive recipes both selected
    #[error("Recipe '{recipe}' conflicts with '{conflicts_with}': both cannot be in the same build")]
    Conflict {
        recipe: String,
        conflicts_with: String,
    },

    /// Missing dependency
    #[error("Missing dependency: '{dependency}' required by '{recipe}'")]
    UnknownRecipe { recipe: String, dependency: String },

    /// Directly requested recipe not defined
    #[error("Requested recipe '{recipe}' is not defined")]
    UnknownRequested { recipe: String },
}

/// Toolchain environment errors
#[derive(Error, Debug)]
pub enum EnvError {
    /// Requested platform API below a recipe-declared minimum
    #[error(
        "Platform API {requested} is too old for recipe '{recipe}' (requires API {required}+)"
    )]
    PlatformTooOld {
        recipe: String,
        required: u32,
        requested: u32,
    },

    /// Architecture does not support the requested API level
    #[error("Architecture '{arch}' does not support platform API {requested}")]
    UnsupportedApi { arch: String, requested: u32 },

    /// Optional dependency was activated but its build output is absent
    #[error(
        "Optional dependency '{recipe}' is in the build order but its build output is missing at '{path}'"
    )]
    MissingOptionalArtifact { recipe: String, path: PathBuf },
}

/// Build execution errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// External tool exited non-zero
    #[error("Build failed for recipe '{recipe}' ({arch}): {output}")]
    BuildFailed {
        recipe: String,
        arch: String,
        output: String,
    },

    /// Build tool could not be spawned
    #[error("Failed to spawn '{command}' for recipe '{recipe}': {error}")]
    SpawnFailed {
        recipe: String,
        command: String,
        error: String,
    },

    /// Host interpreter not found
    #[error("Host interpreter '{interpreter}' not found on PATH")]
    HostInterpreterNotFound { interpreter: String },
}

/// Bundle packaging errors
#[derive(Error, Debug)]
pub enum BundleError {
    /// Bytecode compilation failed
    #[error("Bytecode compilation failed in '{dir}': {output}")]
    CompileFailed { dir: PathBuf, output: String },

    /// Invalid blacklist pattern
    #[error("Invalid blacklist pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },

    /// Expected build output missing
    #[error("Expected build output missing: '{path}'")]
    MissingOutput { path: PathBuf },

    /// Archive error
    #[error("Failed to write archive '{path}': {error}")]
    Archive { path: PathBuf, error: String },

    /// IO error during packaging
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove path
    #[error("Failed to remove '{path}': {error}")]
    Remove { path: PathBuf, error: String },

    /// Failed to copy file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Top-level droidforge error type
#[derive(Error, Debug)]
pub enum DroidforgeError {
    /// Recipe error
    #[error("Recipe error: {0}")]
    Recipe(#[from] RecipeError),

    /// Resolver error
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// Environment error
    #[error("Environment error: {0}")]
    Env(#[from] EnvError),

    /// Build error
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Bundle error
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}

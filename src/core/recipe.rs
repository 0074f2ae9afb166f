//! Recipe definitions and the recipe registry
//!
//! A recipe is the declarative description of one buildable unit: its
//! identity, source URL template, relationships to other recipes, and the
//! data driving its configure/build steps. Recipes are loaded from TOML,
//! one file per recipe.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::RecipeError;
use crate::infra::filesystem;

/// One dependency slot of a recipe
///
/// Either a single required recipe, or an alternative-group of mutually
/// substitutable recipes of which exactly one must be chosen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DependencySpec {
    /// A single required recipe
    Single(String),
    /// An alternative-group; at least one member must be chosen
    Any(Vec<String>),
}

/// Complete recipe definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    /// Recipe metadata and relationships
    pub recipe: RecipeMetadata,

    /// Build step configuration
    #[serde(default)]
    pub build: RecipeBuildConfig,
}

/// Recipe metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeMetadata {
    /// Recipe name
    pub name: String,

    /// Recipe version
    pub version: String,

    /// Source URL template; `{version}` is substituted
    #[serde(default)]
    pub url: Option<String>,

    /// Required dependencies; entries may be alternative-groups
    #[serde(default)]
    pub depends: Vec<DependencySpec>,

    /// Recipes that cannot co-exist with this one in a build
    #[serde(default)]
    pub conflicts: Vec<String>,

    /// Recipes that activate extra build behavior when also selected
    #[serde(default)]
    pub opt_depends: Vec<String>,

    /// Minimum supported platform API level
    #[serde(default)]
    pub min_platform_api: Option<u32>,
}

/// Build step configuration for a recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeBuildConfig {
    /// Configure program, run from the recipe build directory
    #[serde(default = "default_configure_program")]
    pub configure_program: String,

    /// Configure arguments; `{triple}`, `{clang_target}`, `{api}` and
    /// `{version}` are substituted
    #[serde(default)]
    pub configure_args: Vec<String>,

    /// Make arguments (default `["all"]`)
    #[serde(default = "default_make_args")]
    pub make_args: Vec<String>,

    /// Marker file whose existence means configuration already ran
    #[serde(default = "default_configured_marker")]
    pub configured_marker: String,

    /// Marker file whose existence means the primary artifact was built.
    /// Defaults to the recipe name.
    #[serde(default)]
    pub built_marker: Option<String>,

    /// Generated headers copied after the build for dependents to find
    #[serde(default)]
    pub exported_headers: Vec<ExportedHeader>,

    /// Object files staged from the platform sysroot into the build
    /// directory before linking (e.g. crtbegin_so.o)
    #[serde(default)]
    pub staged_objects: Vec<String>,

    /// Library names dependents link against when this recipe is an
    /// activated optional dependency. Defaults to the recipe name.
    #[serde(default)]
    pub link_libs: Vec<String>,

    /// Environment variable exporting this recipe's version into a
    /// dependent's build (e.g. OPENSSL_VERSION)
    #[serde(default)]
    pub export_version_var: Option<String>,
}

impl Default for RecipeBuildConfig {
    fn default() -> Self {
        Self {
            configure_program: default_configure_program(),
            configure_args: Vec::new(),
            make_args: default_make_args(),
            configured_marker: default_configured_marker(),
            built_marker: None,
            exported_headers: Vec::new(),
            staged_objects: Vec::new(),
            link_libs: Vec::new(),
            export_version_var: None,
        }
    }
}

/// A generated header copied into a dependent-visible location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportedHeader {
    /// Source path, relative to the build directory
    pub src: String,

    /// Destination path, relative to the build directory
    pub dst: String,
}

fn default_configure_program() -> String {
    "./configure".to_string()
}

fn default_make_args() -> Vec<String> {
    vec!["all".to_string()]
}

fn default_configured_marker() -> String {
    "config.status".to_string()
}

impl Recipe {
    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, RecipeError> {
        let recipe: Self =
            toml::from_str(content).map_err(|e| RecipeError::ParseError(e.to_string()))?;
        recipe.validate()?;
        Ok(recipe)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    fn validate(&self) -> Result<(), RecipeError> {
        for dep in &self.recipe.depends {
            if let DependencySpec::Any(group) = dep {
                if group.is_empty() {
                    return Err(RecipeError::EmptyAlternativeGroup {
                        recipe: self.recipe.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Recipe name
    pub fn name(&self) -> &str {
        &self.recipe.name
    }

    /// Recipe version
    pub fn version(&self) -> &str {
        &self.recipe.version
    }

    /// Source URL with `{version}` substituted
    pub fn source_url(&self) -> Option<String> {
        self.recipe
            .url
            .as_ref()
            .map(|u| u.replace("{version}", &self.recipe.version))
    }

    /// Marker file name for the primary build artifact
    pub fn built_marker(&self) -> &str {
        self.build.built_marker.as_deref().unwrap_or(&self.recipe.name)
    }

    /// Library names dependents link against when this recipe is an
    /// activated optional dependency
    pub fn link_libs(&self) -> Vec<&str> {
        if self.build.link_libs.is_empty() {
            vec![self.recipe.name.as_str()]
        } else {
            self.build.link_libs.iter().map(String::as_str).collect()
        }
    }
}

/// Holds recipe definitions for the process lifetime, read-only after load
#[derive(Debug, Default)]
pub struct Registry {
    recipes: HashMap<String, Recipe>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.toml` file in a directory as a recipe
    pub fn load_dir(dir: &Path) -> Result<Self, RecipeError> {
        let mut registry = Self::new();
        let entries = std::fs::read_dir(dir)
            .map_err(|e| RecipeError::ParseError(format!("{}: {e}", dir.display())))?;
        for entry in entries {
            let entry =
                entry.map_err(|e| RecipeError::ParseError(format!("{}: {e}", dir.display())))?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "toml") {
                let content = filesystem::read_file(&path)
                    .map_err(|e| RecipeError::ParseError(e.to_string()))?;
                registry.insert(Recipe::from_toml(&content)?);
            }
        }
        Ok(registry)
    }

    /// Add a recipe definition
    pub fn insert(&mut self, recipe: Recipe) {
        self.recipes.insert(recipe.name().to_string(), recipe);
    }

    /// Look up a recipe by name
    pub fn get(&self, name: &str) -> Result<&Recipe, RecipeError> {
        self.recipes.get(name).ok_or_else(|| RecipeError::NotFound {
            name: name.to_string(),
        })
    }

    /// Whether a recipe is registered
    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    /// Names of all registered recipes
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.recipes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

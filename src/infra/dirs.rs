//! Build directory layout
//!
//! Per-(recipe, architecture) build directories and bundle output roots.
//! A build root is a single-writer resource per architecture; concurrent
//! builds of the same architecture must use separate roots.

use std::path::{Path, PathBuf};

/// Directory layout under a project build root
#[derive(Debug, Clone)]
pub struct BuildDirs {
    root: PathBuf,
}

impl BuildDirs {
    /// Create a layout rooted at `root`
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The build root itself
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build directory for one recipe on one architecture
    pub fn recipe_build_dir(&self, recipe: &str, arch: &str) -> PathBuf {
        self.root.join("build").join(recipe).join(arch)
    }

    /// Library output directory of a built recipe (where its `.a`/`.so` land)
    pub fn recipe_lib_dir(&self, recipe: &str, arch: &str) -> PathBuf {
        self.recipe_build_dir(recipe, arch).join("lib")
    }

    /// Bundle output root for one architecture
    pub fn bundle_dir(&self, arch: &str) -> PathBuf {
        self.root.join("bundle").join(arch)
    }
}

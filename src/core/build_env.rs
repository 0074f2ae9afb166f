//! Cross-compilation environment construction
//!
//! Builds the [`BuildContext`] a recipe's build commands run under: toolchain
//! tool paths derived from the NDK layout, cross flags merged additively over
//! any pre-existing values, the host interpreter prepended to PATH, and
//! include/link injections for each activated optional dependency.
//!
//! A context is built fresh per (recipe, architecture) pair and is immutable
//! once constructed; build steps receive it as a value and never mutate a
//! shared environment.

use std::collections::HashMap;
use std::path::Path;

use crate::core::arch::Arch;
use crate::core::recipe::{Recipe, Registry};
use crate::core::resolver::BuildOrder;
use crate::error::EnvError;
use crate::infra::dirs::BuildDirs;
use crate::infra::ndk::NdkLayout;

/// Immutable environment for a single recipe build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    vars: HashMap<String, String>,
}

impl BuildContext {
    /// Value of an environment variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The full environment map for process execution
    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }

    /// Build the context for one (recipe, architecture) pair.
    ///
    /// The guardrails run before anything else: a platform API below the
    /// recipe's declared minimum or the architecture's floor fails without
    /// any filesystem or process side effect.
    #[allow(clippy::too_many_arguments)]
    pub fn for_recipe(
        recipe: &Recipe,
        arch: &Arch,
        api: u32,
        ndk: &NdkLayout,
        order: &BuildOrder,
        registry: &Registry,
        dirs: &BuildDirs,
        host_bin: &Path,
        base_env: &HashMap<String, String>,
    ) -> Result<Self, EnvError> {
        if let Some(min) = recipe.recipe.min_platform_api {
            if api < min {
                return Err(EnvError::PlatformTooOld {
                    recipe: recipe.name().to_string(),
                    required: min,
                    requested: api,
                });
            }
        }
        if !arch.supports_api(api) {
            return Err(EnvError::UnsupportedApi {
                arch: arch.name.to_string(),
                requested: api,
            });
        }

        let mut builder = ContextBuilder::from_base(base_env);

        // Toolchain tools from the NDK layout convention
        let toolchain_dir = ndk.toolchain_dir(arch);
        builder.set(
            "CC",
            &format!(
                "{} -target {} -gcc-toolchain {}",
                ndk.clang().display(),
                arch.clang_target,
                toolchain_dir.display()
            ),
        );
        builder.set("AR", &ndk.tool(arch, "ar").display().to_string());
        builder.set("LD", &ndk.tool(arch, "ld").display().to_string());
        builder.set("RANLIB", &ndk.tool(arch, "ranlib").display().to_string());
        builder.set("READELF", &ndk.tool(arch, "readelf").display().to_string());
        builder.set(
            "STRIP",
            &format!(
                "{} --strip-debug --strip-unneeded",
                ndk.tool(arch, "strip").display()
            ),
        );

        // Cross flags, additive over any pre-existing values
        let ndk_flags = format!(
            "--sysroot={} -D__ANDROID_API__={} -isystem {}",
            ndk.header_sysroot().display(),
            api,
            ndk.triple_include_dir(arch).display()
        );
        let platform_sysroot = ndk.platform_sysroot(api, arch);
        builder.append("CFLAGS", &ndk_flags);
        builder.append("CPPFLAGS", &ndk_flags);
        builder.append(
            "LDFLAGS",
            &format!(
                "--sysroot={} -L{}",
                platform_sysroot.display(),
                ndk.platform_lib_dir(api, arch).display()
            ),
        );
        builder.set("SYSROOT", &platform_sysroot.display().to_string());

        // A freshly built host interpreter must win over any system one
        builder.prepend_path(host_bin);

        // Activated optional dependencies inject their build outputs
        for opt_name in &recipe.recipe.opt_depends {
            if !order.contains(opt_name) {
                continue;
            }
            let opt_build_dir = dirs.recipe_build_dir(opt_name, arch.name);
            if !opt_build_dir.exists() {
                return Err(EnvError::MissingOptionalArtifact {
                    recipe: opt_name.clone(),
                    path: opt_build_dir,
                });
            }
            builder.append("CPPFLAGS", &format!("-I{}", opt_build_dir.display()));
            let mut ldflags = format!("-L{}", dirs.recipe_lib_dir(opt_name, arch.name).display());
            if let Ok(opt_recipe) = registry.get(opt_name) {
                for lib in opt_recipe.link_libs() {
                    ldflags.push_str(&format!(" -l{lib}"));
                }
                if let Some(var) = &opt_recipe.build.export_version_var {
                    builder.set(var, opt_recipe.version());
                }
            }
            builder.append("LDFLAGS", &ldflags);
        }

        Ok(builder.finish())
    }
}

/// Mutable accumulator for a [`BuildContext`]
#[derive(Debug, Default)]
pub struct ContextBuilder {
    vars: HashMap<String, String>,
}

impl ContextBuilder {
    /// Start from a base environment (typically the OS environ)
    pub fn from_base(base: &HashMap<String, String>) -> Self {
        Self { vars: base.clone() }
    }

    /// Set a variable, replacing any existing value
    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    /// Append a space-separated fragment to a variable, keeping what was
    /// already there
    pub fn append(&mut self, key: &str, fragment: &str) {
        match self.vars.get_mut(key) {
            Some(existing) if !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(fragment);
            }
            _ => {
                self.vars.insert(key.to_string(), fragment.to_string());
            }
        }
    }

    /// Prepend a directory to PATH
    pub fn prepend_path(&mut self, dir: &Path) {
        let path = match self.vars.get("PATH") {
            Some(old) if !old.is_empty() => format!("{}:{old}", dir.display()),
            _ => dir.display().to_string(),
        };
        self.vars.insert("PATH".to_string(), path);
    }

    /// Freeze into an immutable context
    pub fn finish(self) -> BuildContext {
        BuildContext { vars: self.vars }
    }
}

//! Bundle packaging
//!
//! Turns the build outputs of the runtime recipe into the distributable
//! bundle layout: collected extension modules, a byte-compiled and zipped
//! standard library, a byte-compiled site-packages tree, and per-architecture
//! shared libraries.
//!
//! Packaging is copy-then-transform: the original build tree is never
//! mutated. The one in-place step, the site-packages compile-then-delete, is
//! confined to the bundle's own copied output directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use zip::write::SimpleFileOptions;

use crate::config::defaults;
use crate::core::arch::Arch;
use crate::core::filter::{walk_valid_files, FilterRules};
use crate::error::{BundleError, DroidforgeError};
use crate::infra::filesystem;
use crate::infra::process::CommandRunner;

/// Locations of the build outputs consumed by packaging
#[derive(Debug, Clone)]
pub struct BuildOutputs {
    /// Directory holding compiled extension modules (`*.so`, `*.py`)
    pub modules_dir: PathBuf,
    /// The runtime's standard library source tree
    pub stdlib_dir: PathBuf,
    /// Installed third-party packages
    pub site_packages_dir: PathBuf,
    /// Directory holding the runtime's shared libraries
    pub runtime_lib_dir: PathBuf,
}

/// The final package tree, immutable once written
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Bundle root
    pub root: PathBuf,
    /// Collected extension modules
    pub modules_dir: PathBuf,
    /// Compressed standard library archive
    pub stdlib_zip: PathBuf,
    /// Byte-compiled third-party packages
    pub site_packages_dir: PathBuf,
    /// Per-architecture shared libraries
    pub libs_dir: PathBuf,
}

/// Packages build outputs into a [`Bundle`]
pub struct Bundler<'a> {
    runner: &'a dyn CommandRunner,
    host_interpreter: String,
    runtime_name: String,
    runtime_version: String,
    base_env: HashMap<String, String>,
    tag_pattern: Regex,
}

impl<'a> Bundler<'a> {
    /// Create a bundler compiling with `host_interpreter`
    pub fn new(
        runner: &'a dyn CommandRunner,
        host_interpreter: &str,
        base_env: HashMap<String, String>,
    ) -> Result<Self, BundleError> {
        // Host-build platform tags look like "mod.cpython-37m-x86_64-linux-gnu.so"
        let tag_pattern =
            Regex::new(r"^([^.]+)\..+\.so$").map_err(|e| BundleError::InvalidPattern {
                pattern: r"^([^.]+)\..+\.so$".to_string(),
                error: e.to_string(),
            })?;
        Ok(Self {
            runner,
            host_interpreter: host_interpreter.to_string(),
            runtime_name: defaults::RUNTIME_LIB_NAME.to_string(),
            runtime_version: defaults::RUNTIME_VERSION_TAG.to_string(),
            base_env,
            tag_pattern,
        })
    }

    /// Override the runtime library name and version tag
    #[must_use]
    pub fn with_runtime(mut self, name: &str, version: &str) -> Self {
        self.runtime_name = name.to_string();
        self.runtime_version = version.to_string();
        self
    }

    /// Package the build outputs for one architecture into `bundle_root`
    pub fn create_bundle(
        &self,
        outputs: &BuildOutputs,
        bundle_root: &Path,
        arch: &Arch,
    ) -> Result<Bundle, DroidforgeError> {
        let modules_dir = bundle_root.join(defaults::BUNDLE_MODULES_DIR);
        let stdlib_dir = bundle_root.join(defaults::BUNDLE_STDLIB_DIR);
        let stdlib_zip = bundle_root.join(defaults::BUNDLE_STDLIB_ZIP);
        let site_packages_dir = bundle_root.join(defaults::BUNDLE_SITE_PACKAGES_DIR);
        let libs_dir = bundle_root.join(defaults::BUNDLE_LIBS_DIR).join(arch.name);

        self.collect_modules(&outputs.modules_dir, &modules_dir)?;
        self.package_stdlib(&outputs.stdlib_dir, &stdlib_dir, &stdlib_zip)?;
        self.package_site_packages(&outputs.site_packages_dir, &site_packages_dir)?;
        self.collect_runtime_libs(&outputs.runtime_lib_dir, &libs_dir)?;

        Ok(Bundle {
            root: bundle_root.to_path_buf(),
            modules_dir,
            stdlib_zip,
            site_packages_dir,
            libs_dir,
        })
    }

    /// Copy extension modules into the bundle, stripping host platform tags
    fn collect_modules(&self, src: &Path, dst: &Path) -> Result<(), DroidforgeError> {
        if !src.is_dir() {
            return Err(BundleError::MissingOutput {
                path: src.to_path_buf(),
            }
            .into());
        }
        filesystem::create_dir_all(dst)?;

        let entries = std::fs::read_dir(src).map_err(|e| BundleError::Io {
            path: src.to_path_buf(),
            error: e.to_string(),
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if name.ends_with(".so") {
                filesystem::copy_file(&path, &dst.join(self.normalized_so_name(&name)))?;
            } else if name.ends_with(".py") {
                filesystem::copy_file(&path, &dst.join(&name))?;
            }
        }
        Ok(())
    }

    /// Stdlib pass: filtered copy, byte-compile, archive the bytecode
    fn package_stdlib(
        &self,
        src: &Path,
        stdlib_dir: &Path,
        stdlib_zip: &Path,
    ) -> Result<(), DroidforgeError> {
        filesystem::create_dir_all(stdlib_dir)?;

        let copy_rules = FilterRules::stdlib()?;
        for rel in walk_valid_files(src, &copy_rules)? {
            filesystem::copy_file(&src.join(&rel), &stdlib_dir.join(&rel))?;
        }

        self.byte_compile(stdlib_dir)?;

        // The archive keeps only what survives the stricter source-dropping
        // rules
        let zip_rules = FilterRules::stdlib_zip()?;
        let survivors = walk_valid_files(stdlib_dir, &zip_rules)?;
        write_zip(stdlib_zip, stdlib_dir, &survivors)?;
        Ok(())
    }

    /// Site-packages pass: filtered copy, byte-compile, drop the sources
    fn package_site_packages(&self, src: &Path, dst: &Path) -> Result<(), DroidforgeError> {
        filesystem::create_dir_all(dst)?;

        let rules = FilterRules::site_packages()?;
        for rel in walk_valid_files(src, &rules)? {
            filesystem::copy_file(&src.join(&rel), &dst.join(&rel))?;
        }

        self.byte_compile(dst)?;

        // Only bytecode stays on disk
        let mut sources = Vec::new();
        let mut caches = Vec::new();
        for entry in walkdir::WalkDir::new(dst).into_iter().filter_map(Result::ok) {
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "py") {
                sources.push(path.to_path_buf());
            } else if entry.file_type().is_dir()
                && path.file_name().is_some_and(|n| n == "__pycache__")
            {
                caches.push(path.to_path_buf());
            }
        }
        for path in sources {
            filesystem::remove_file(&path)?;
        }
        for path in caches {
            filesystem::remove_dir_all(&path)?;
        }

        self.normalize_so_names(dst)?;
        Ok(())
    }

    /// Copy the runtime's shared libraries into the per-arch lib directory
    fn collect_runtime_libs(&self, src: &Path, libs_dir: &Path) -> Result<(), DroidforgeError> {
        filesystem::create_dir_all(libs_dir)?;

        let base = format!(
            "lib{}{}m.so",
            self.runtime_name, self.runtime_version
        );
        for name in [base.clone(), format!("{base}.1.0")] {
            let lib = src.join(&name);
            if !lib.exists() {
                return Err(BundleError::MissingOutput { path: lib }.into());
            }
            filesystem::copy_file(&lib, &libs_dir.join(&name))?;
        }
        Ok(())
    }

    /// Byte-compile every source file under `dir` in place
    fn byte_compile(&self, dir: &Path) -> Result<(), DroidforgeError> {
        let args: Vec<String> = ["-m", "compileall", "-f", "-b", "."]
            .iter()
            .map(ToString::to_string)
            .collect();
        let output = self
            .runner
            .run(&self.host_interpreter, &args, dir, &self.base_env)
            .map_err(|e| BundleError::CompileFailed {
                dir: dir.to_path_buf(),
                output: e,
            })?;
        if !output.success {
            return Err(BundleError::CompileFailed {
                dir: dir.to_path_buf(),
                output: output.combined(),
            }
            .into());
        }
        Ok(())
    }

    /// Strip host-build platform tags from a shared-object file name
    fn normalized_so_name(&self, name: &str) -> String {
        match self.tag_pattern.captures(name) {
            Some(caps) => format!("{}.so", &caps[1]),
            None => name.to_string(),
        }
    }

    /// Rename every tagged `.so` under `dir` to its untagged name
    fn normalize_so_names(&self, dir: &Path) -> Result<(), DroidforgeError> {
        let mut renames = Vec::new();
        for entry in walkdir::WalkDir::new(dir).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.path().file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            let normalized = self.normalized_so_name(&name);
            if normalized != name {
                renames.push((entry.path().to_path_buf(), normalized));
            }
        }
        for (path, new_name) in renames {
            let target = path.with_file_name(&new_name);
            tracing::debug!("Renaming {} -> {new_name}", path.display());
            std::fs::rename(&path, &target).map_err(|e| BundleError::Io {
                path: path.clone(),
                error: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Write `files` (relative to `root`) into a deflate-compressed zip archive
fn write_zip(zip_path: &Path, root: &Path, files: &[PathBuf]) -> Result<(), BundleError> {
    let archive_err = |e: &dyn std::fmt::Display| BundleError::Archive {
        path: zip_path.to_path_buf(),
        error: e.to_string(),
    };

    let file = std::fs::File::create(zip_path).map_err(|e| archive_err(&e))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for rel in files {
        let name = rel.to_string_lossy().replace('\\', "/");
        writer
            .start_file(name, options)
            .map_err(|e| archive_err(&e))?;
        let mut src = std::fs::File::open(root.join(rel)).map_err(|e| archive_err(&e))?;
        std::io::copy(&mut src, &mut writer).map_err(|e| archive_err(&e))?;
    }

    writer.finish().map_err(|e| archive_err(&e))?;
    Ok(())
}

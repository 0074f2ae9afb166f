//! `droidforge bundle` - package build outputs into a distributable bundle

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use crate::config::defaults;
use crate::core::arch::Arch;
use crate::core::bundle::{BuildOutputs, Bundler};
use crate::error::BuildError;
use crate::infra::dirs::BuildDirs;
use crate::infra::process::SystemRunner;

/// Arguments for the bundle command
#[derive(Args, Debug)]
pub struct BundleArgs {
    /// Target architecture (ABI name)
    #[arg(long, default_value = "armeabi-v7a")]
    pub arch: String,

    /// Root directory for build trees and bundles
    #[arg(long, default_value = ".")]
    pub build_root: PathBuf,

    /// Directory holding compiled extension modules
    #[arg(long)]
    pub modules_dir: PathBuf,

    /// The runtime's standard library source tree
    #[arg(long)]
    pub stdlib_dir: PathBuf,

    /// Installed third-party packages
    #[arg(long)]
    pub site_packages_dir: PathBuf,

    /// Directory holding the runtime's shared libraries
    #[arg(long)]
    pub runtime_lib_dir: PathBuf,

    /// Host interpreter used for byte-compilation
    #[arg(long, default_value = defaults::DEFAULT_HOST_INTERPRETER)]
    pub host_interpreter: String,

    /// Runtime library base name
    #[arg(long, default_value = defaults::RUNTIME_LIB_NAME)]
    pub runtime_name: String,

    /// Runtime major.minor version tag
    #[arg(long, default_value = defaults::RUNTIME_VERSION_TAG)]
    pub runtime_version: String,
}

/// Run the bundle command
pub fn run(args: &BundleArgs) -> Result<()> {
    let Some(arch) = Arch::by_name(&args.arch) else {
        bail!("Unknown architecture '{}'", args.arch);
    };

    // A bare interpreter name must be resolvable before any packaging work
    let interpreter = if args.host_interpreter.contains(std::path::MAIN_SEPARATOR) {
        PathBuf::from(&args.host_interpreter)
    } else {
        which::which(&args.host_interpreter).map_err(|_| BuildError::HostInterpreterNotFound {
            interpreter: args.host_interpreter.clone(),
        })?
    };

    let outputs = BuildOutputs {
        modules_dir: args.modules_dir.clone(),
        stdlib_dir: args.stdlib_dir.clone(),
        site_packages_dir: args.site_packages_dir.clone(),
        runtime_lib_dir: args.runtime_lib_dir.clone(),
    };

    let runner = SystemRunner;
    let base_env: std::collections::HashMap<String, String> = std::env::vars().collect();
    let bundler = Bundler::new(&runner, &interpreter.to_string_lossy(), base_env)?
        .with_runtime(&args.runtime_name, &args.runtime_version);

    let dirs = BuildDirs::new(args.build_root.clone());
    let bundle_root = dirs.bundle_dir(arch.name);
    let bundle = bundler.create_bundle(&outputs, &bundle_root, &arch)?;

    println!("Bundle written to {}", bundle.root.display());
    Ok(())
}

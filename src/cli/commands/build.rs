//! `droidforge build` - resolve and build recipes for one architecture

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::config::defaults;
use crate::core::arch::Arch;
use crate::core::builder;
use crate::core::recipe::Registry;
use crate::core::resolver;
use crate::infra::dirs::BuildDirs;
use crate::infra::ndk::NdkLayout;
use crate::infra::process::SystemRunner;

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Directory containing recipe TOML files
    #[arg(long, default_value = "recipes")]
    pub recipe_dir: PathBuf,

    /// Target architecture (ABI name)
    #[arg(long, default_value = "armeabi-v7a")]
    pub arch: String,

    /// Android platform API level
    #[arg(long, default_value_t = defaults::DEFAULT_PLATFORM_API)]
    pub api: u32,

    /// Path to the Android NDK
    #[arg(long, env = "ANDROID_NDK_HOME")]
    pub ndk_dir: PathBuf,

    /// Root directory for build trees and bundles
    #[arg(long, default_value = ".")]
    pub build_root: PathBuf,

    /// Directory containing the freshly built host interpreter
    #[arg(long)]
    pub host_bin: PathBuf,

    /// Recipes to build
    #[arg(required = true)]
    pub recipes: Vec<String>,
}

/// Run the build command
pub fn run(args: &BuildArgs) -> Result<()> {
    let Some(arch) = Arch::by_name(&args.arch) else {
        bail!(
            "Unknown architecture '{}'. Supported: {}",
            args.arch,
            Arch::all()
                .iter()
                .map(|a| a.name)
                .collect::<Vec<_>>()
                .join(", ")
        );
    };

    let registry = Registry::load_dir(&args.recipe_dir)
        .with_context(|| format!("Failed to load recipes from {}", args.recipe_dir.display()))?;
    let order = resolver::resolve(&args.recipes, &registry)?;
    tracing::info!(
        "Build order for {}: {}",
        arch,
        order.as_slice().join(" -> ")
    );

    let ndk = NdkLayout::new(args.ndk_dir.clone(), defaults::DEFAULT_NDK_HOST_TAG);
    let dirs = BuildDirs::new(args.build_root.clone());
    let runner = SystemRunner;
    let base_env: std::collections::HashMap<String, String> = std::env::vars().collect();

    let results = builder::build_all(
        &order,
        &arch,
        args.api,
        &registry,
        &dirs,
        &ndk,
        &runner,
        &args.host_bin,
        &base_env,
    )?;

    for result in &results {
        let status = match (result.configure_skipped, result.build_skipped) {
            (true, true) => "up to date",
            (_, false) => "built",
            (false, true) => "reconfigured",
        };
        println!("{} ({}): {status}", result.recipe, result.arch);
    }
    Ok(())
}

//! CLI subcommands

pub mod build;
pub mod bundle;
pub mod resolve;

use anyhow::Result;
use clap::Subcommand;

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a recipe set into a build order without building
    Resolve(resolve::ResolveArgs),

    /// Resolve and build recipes for a target architecture
    Build(build::BuildArgs),

    /// Package existing build outputs into a bundle
    Bundle(bundle::BundleArgs),
}

impl Commands {
    /// Dispatch to the command implementation
    pub fn run(self) -> Result<()> {
        match self {
            Self::Resolve(args) => resolve::run(&args),
            Self::Build(args) => build::run(&args),
            Self::Bundle(args) => bundle::run(&args),
        }
    }
}

//! Command-line interface module
//!
//! Argument parsing and command dispatch. Business logic lives in
//! [`crate::core`].

pub mod commands;

use anyhow::Result;
use clap::Parser;

use commands::Commands;

/// Droidforge - recipe-driven cross-compilation and bundling for Android
///
/// Cross-compile a language runtime and its native extension modules
/// against the Android NDK and package the result into a bundle.
#[derive(Parser, Debug)]
#[command(name = "droidforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        if let Some(cmd) = self.command {
            cmd.run()
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}

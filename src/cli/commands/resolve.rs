//! `droidforge resolve` - print the build order for a recipe set

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::core::recipe::Registry;
use crate::core::resolver;

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Directory containing recipe TOML files
    #[arg(long, default_value = "recipes")]
    pub recipe_dir: PathBuf,

    /// Output the order as a JSON array
    #[arg(long)]
    pub json: bool,

    /// Recipes to resolve
    #[arg(required = true)]
    pub recipes: Vec<String>,
}

/// Run the resolve command
pub fn run(args: &ResolveArgs) -> Result<()> {
    let registry = Registry::load_dir(&args.recipe_dir)
        .with_context(|| format!("Failed to load recipes from {}", args.recipe_dir.display()))?;
    let order = resolver::resolve(&args.recipes, &registry)?;

    if args.json {
        println!("{}", serde_json::to_string(order.as_slice())?);
    } else {
        for name in order.iter() {
            println!("{name}");
        }
    }
    Ok(())
}

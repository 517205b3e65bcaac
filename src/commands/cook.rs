// src/commands/cook.rs

//! Cook command - build and package a recipe

use anyhow::{Context, Result};
use simmer::recipe::{Kitchen, KitchenConfig, ToolchainConfig, parse_recipe_file};
use std::path::{Path, PathBuf};
use tracing::info;

/// Flags for `simmer cook`
#[derive(Debug, Default)]
pub struct CookOptions {
    pub root: Option<PathBuf>,
    pub settings: Vec<(String, String)>,
    pub package_dir: Option<PathBuf>,
    pub deps_root: Option<PathBuf>,
    pub cmake: Option<PathBuf>,
    pub generator: Option<String>,
    pub jobs: Option<u32>,
    pub print_info: bool,
}

/// Cook a package from a recipe
pub fn cmd_cook(recipe_path: &Path, opts: CookOptions) -> Result<()> {
    println!("Reading recipe: {}", recipe_path.display());
    let recipe = parse_recipe_file(recipe_path)
        .with_context(|| format!("Failed to parse recipe: {}", recipe_path.display()))?;

    let recipe = recipe
        .with_settings(&opts.settings)
        .with_context(|| format!("Invalid settings for {}", recipe.reference()))?;

    println!("Recipe: {} version {}", recipe.package.name, recipe.package.version);

    let root = match opts.root {
        Some(root) => root,
        None => recipe_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let mut config = KitchenConfig {
        package_dir: opts.package_dir,
        cmake: opts.cmake,
        generator: opts.generator,
        toolchain: ToolchainConfig::from_env(),
        ..Default::default()
    };
    if let Some(deps_root) = opts.deps_root {
        config.deps_root = deps_root;
    }
    if let Some(j) = opts.jobs {
        config.jobs = j;
    }

    println!("Cooking with {} parallel jobs...", config.jobs);

    let kitchen = Kitchen::new(config);
    let result = kitchen.cook(&recipe, &root).map_err(|e| {
        let stage = e.stage().unwrap_or("cook");
        anyhow::Error::new(e).context(format!("Failed to cook {} ({} stage)", recipe.reference(), stage))
    })?;

    println!("\n[COMPLETE] Packaged: {}", result.package_dir.display());

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    if opts.print_info {
        let json = result
            .metadata
            .to_json()
            .context("Failed to serialize package metadata")?;
        println!("{}", json);
    }

    info!(
        "Successfully cooked {} into {}",
        recipe.reference(),
        result.package_dir.display()
    );

    Ok(())
}

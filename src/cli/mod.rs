// src/cli/mod.rs
//! CLI definitions for simmer
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simmer")]
#[command(author = "Simmer Contributors")]
#[command(version)]
#[command(about = "Cook CMake library recipes into installable packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cook a recipe: generate, configure, build, package and publish
    Cook {
        /// Path to the recipe file
        recipe: PathBuf,

        /// Recipe root (default: the folder containing the recipe)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Override a recipe setting, e.g. build_type=Debug
        #[arg(short, long = "setting", value_name = "KEY=VALUE", value_parser = parse_setting)]
        settings: Vec<(String, String)>,

        /// Install into this folder instead of <root>/package/<build_type>
        #[arg(long)]
        package_dir: Option<PathBuf>,

        /// Folder holding installed dependency packages
        #[arg(long)]
        deps_root: Option<PathBuf>,

        /// Path to the cmake executable
        #[arg(long)]
        cmake: Option<PathBuf>,

        /// CMake generator, e.g. Ninja
        #[arg(short = 'G', long)]
        generator: Option<String>,

        /// Number of parallel build jobs
        #[arg(short, long)]
        jobs: Option<u32>,

        /// Print the published package metadata as JSON
        #[arg(long)]
        print_info: bool,
    },
}

/// Parse a `KEY=VALUE` setting override
fn parse_setting(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", arg)),
    }
}

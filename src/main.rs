// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::CookOptions;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cook {
            recipe,
            root,
            settings,
            package_dir,
            deps_root,
            cmake,
            generator,
            jobs,
            print_info,
        } => commands::cmd_cook(
            &recipe,
            CookOptions {
                root,
                settings,
                package_dir,
                deps_root,
                cmake,
                generator,
                jobs,
                print_info,
            },
        ),
    }
}

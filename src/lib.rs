// src/lib.rs

//! Simmer: recipe-driven CMake packaging
//!
//! Cooks a library recipe through a fixed lifecycle: resolve the folder
//! layout, generate toolchain and dependency descriptors, configure, build,
//! install into a package tree, and publish the metadata consumers use to
//! find the package.
//!
//! # Architecture
//!
//! - Recipes: TOML declarations of name, version, requirements and settings
//! - Kitchen: configuration plus the resolver and build system a cook uses
//! - Cook: strict stage ordering; the first failure halts the cook
//! - Descriptors: written atomically, regenerated idempotently

mod error;
pub mod recipe;

pub use error::{BuildError, Error, GenerationError, PackageError, Result};
pub use recipe::{
    CookResult, DependencySpec, Kitchen, KitchenConfig, Layout, PackageMetadata, Recipe, Stage,
    compute_layout, parse_recipe, parse_recipe_file, publish,
};

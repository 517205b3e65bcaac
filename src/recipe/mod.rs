// src/recipe/mod.rs

//! Recipes for native library packages
//!
//! A recipe declares a library package: its name and version, the packages
//! it requires, and the build configuration it recognizes. Cooking a recipe
//! drives CMake through a fixed lifecycle and leaves an installed package
//! tree plus the metadata consumers need to find it.
//!
//! # Culinary Terminology
//!
//! - **Recipe**: The package declaration (like a recipe card)
//! - **Kitchen**: Holds configuration and the tools a cook needs
//! - **Cook**: One pass of a recipe through the lifecycle
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "forest"
//! version = "0.1"
//! requires = ["sqlite3/3.37.2", "sqlitecpp/3.1.1"]
//!
//! [settings]
//! build_type = "Release"
//!
//! [sources]
//! exports = ["CMakeLists.txt", "include/*", "test/*", "cmake/*"]
//! no_copy_source = true
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! layout -> generate -> configure -> build -> package -> publish
//! ```
//!
//! Build and generator folders are `build/<build_type>` under the recipe
//! root. The generate stage writes `simmer_toolchain.cmake` and one
//! `<name>-config.cmake` per requirement there.

mod format;
pub mod kitchen;
pub mod layout;
pub mod package_info;
pub mod parser;

pub use format::{
    DependencySpec, PackageInfoSection, PackageSection, Recipe, STANDARD_BUILD_TYPES, Settings,
    SourcesSection,
};
pub use kitchen::{
    BuildContext, BuildSystem, CMake, Cook, CookResult, DependencyResolver, GeneratedFiles,
    Kitchen, KitchenConfig, PrefixResolver, ResolvedDependency, Stage, StaticResolver,
    StepOutput, ToolchainConfig,
};
pub use layout::{Layout, ResolvedLayout, compute_layout};
pub use package_info::{FindMode, PackageMetadata, publish};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};

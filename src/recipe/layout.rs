// src/recipe/layout.rs

//! Folder layout derived from the build configuration
//!
//! Every build configuration gets its own folder under `build/`. Generated
//! descriptors live next to the build artifacts, so the generator folder is
//! always the build folder.

use std::path::{Path, PathBuf};

/// Build type used when none is configured
pub const DEFAULT_BUILD_TYPE: &str = "Release";

/// Parent folder of all per-configuration build folders
pub const BUILD_ROOT: &str = "build";

/// Parent folder of the default per-configuration package folders
pub const PACKAGE_ROOT: &str = "package";

/// Folder layout for one build configuration, relative to the recipe root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Where the build system runs and writes artifacts
    pub build_folder: PathBuf,
    /// Where toolchain and dependency descriptors are written
    pub generator_folder: PathBuf,
}

impl Layout {
    /// Resolve both folders against the recipe root
    pub fn resolve(&self, root: &Path) -> ResolvedLayout {
        ResolvedLayout {
            build_dir: root.join(&self.build_folder),
            generator_dir: root.join(&self.generator_folder),
        }
    }
}

/// A layout anchored at a concrete recipe root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    pub build_dir: PathBuf,
    pub generator_dir: PathBuf,
}

/// The build type in effect for a configuration value
///
/// Absent and empty both mean [`DEFAULT_BUILD_TYPE`].
pub fn effective_build_type(build_type: Option<&str>) -> &str {
    match build_type {
        Some(bt) if !bt.is_empty() => bt,
        _ => DEFAULT_BUILD_TYPE,
    }
}

/// Compute the folder layout for a build configuration
pub fn compute_layout(build_type: Option<&str>) -> Layout {
    let build_folder = Path::new(BUILD_ROOT).join(effective_build_type(build_type));

    Layout {
        generator_folder: build_folder.clone(),
        build_folder,
    }
}

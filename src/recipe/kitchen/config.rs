// src/recipe/kitchen/config.rs

//! Configuration types for the Kitchen

use crate::recipe::kitchen::toolchain::GeneratedFiles;
use crate::recipe::layout::Layout;
use crate::recipe::package_info::PackageMetadata;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Compiler and platform settings written into the toolchain descriptor
///
/// Only explicitly configured values end up in the descriptor; anything
/// left unset is for CMake to detect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// C compiler (`CMAKE_C_COMPILER`)
    pub c_compiler: Option<String>,
    /// C++ compiler (`CMAKE_CXX_COMPILER`)
    pub cxx_compiler: Option<String>,
    /// Target triple for cross-compilation
    pub target: Option<String>,
    /// Sysroot containing the target's headers and libraries
    pub sysroot: Option<PathBuf>,
    /// Extra cache variables, written in key order
    pub cache_variables: BTreeMap<String, String>,
}

impl ToolchainConfig {
    /// Toolchain settings from `CC`, `CXX`, `TARGET` and `SYSROOT`
    ///
    /// Only the binary calls this; the library never reads the environment.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        Self {
            c_compiler: var("CC"),
            cxx_compiler: var("CXX"),
            target: var("TARGET"),
            sysroot: var("SYSROOT").map(PathBuf::from),
            cache_variables: BTreeMap::new(),
        }
    }
}

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Installed dependency packages, laid out as `<name>/<version>/`
    pub deps_root: PathBuf,
    /// Package output folder; `<root>/package/<build_type>` when unset
    pub package_dir: Option<PathBuf>,
    /// Path to the cmake executable; searched on PATH when unset
    pub cmake: Option<PathBuf>,
    /// CMake generator (`-G`), CMake's default when unset
    pub generator: Option<String>,
    /// Number of parallel build jobs
    pub jobs: u32,
    /// Toolchain descriptor settings
    pub toolchain: ToolchainConfig,
    /// Hold an exclusive lock on the build folder while cooking
    pub lock_build_folder: bool,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        let deps_root = dirs::home_dir()
            .map(|home| home.join(".simmer").join("packages"))
            .unwrap_or_else(|| PathBuf::from(".simmer/packages"));

        Self {
            deps_root,
            package_dir: None,
            cmake: None,
            generator: None,
            jobs,
            toolchain: ToolchainConfig::default(),
            lock_build_folder: true,
        }
    }
}

/// Result of cooking a recipe
#[derive(Debug)]
pub struct CookResult {
    /// Folder layout used for this cook
    pub layout: Layout,
    /// Where the package was installed
    pub package_dir: PathBuf,
    /// Descriptors written by the generate stage
    pub generated: GeneratedFiles,
    /// Published consumption metadata
    pub metadata: PackageMetadata,
    /// Build log
    pub log: String,
    /// Warnings generated during the cook
    pub warnings: Vec<String>,
}

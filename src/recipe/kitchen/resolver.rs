// src/recipe/kitchen/resolver.rs

//! Dependency resolution for the generate stage
//!
//! The Kitchen does not pick dependency versions itself. It hands the
//! recipe's requirements to a [`DependencyResolver`] and turns whatever
//! include/link information comes back into CMake descriptors.

use crate::error::GenerationError;
use crate::recipe::format::DependencySpec;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result type for dependency resolution
pub type ResolveResult<T> = std::result::Result<T, GenerationError>;

/// Include and link information for one resolved dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    /// The requirement this resolves
    pub spec: DependencySpec,
    /// Installed package root
    pub root: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    /// Library names without platform prefix/suffix (`sqlite3`, not `libsqlite3.a`)
    pub libs: Vec<String>,
    /// Compile definitions consumers must use
    pub defines: Vec<String>,
}

impl ResolvedDependency {
    /// A dependency rooted at `root` with the conventional `include/` and `lib/` folders
    pub fn at_root(spec: DependencySpec, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            spec,
            include_dirs: vec![root.join("include")],
            lib_dirs: vec![root.join("lib")],
            root,
            libs: Vec::new(),
            defines: Vec::new(),
        }
    }

    /// Set the library names
    pub fn with_libs(mut self, libs: &[&str]) -> Self {
        self.libs = libs.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Trait for resolving a recipe's requirements into include/link information
///
/// Implementations must return exactly one entry per requirement. Any
/// failure aborts generation before a single descriptor is written.
pub trait DependencyResolver: Send + Sync {
    fn resolve(&self, deps: &[DependencySpec]) -> ResolveResult<Vec<ResolvedDependency>>;
}

/// Resolves requirements from an installed package prefix
///
/// Each requirement `name/version` is expected at `<root>/<name>/<version>`
/// with optional `include/` and `lib/` folders.
#[derive(Debug, Clone)]
pub struct PrefixResolver {
    root: PathBuf,
}

impl PrefixResolver {
    /// Create a resolver over a package prefix
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The prefix this resolver searches
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve_one(&self, spec: &DependencySpec) -> ResolveResult<ResolvedDependency> {
        let package_root = self.root.join(spec.name()).join(spec.version());
        if !package_root.is_dir() {
            return Err(GenerationError::Resolution {
                dependency: spec.to_string(),
                reason: format!("not installed under {}", self.root.display()),
            });
        }

        let include_dir = package_root.join("include");
        let lib_dir = package_root.join("lib");

        let mut resolved = ResolvedDependency {
            spec: spec.clone(),
            root: package_root.clone(),
            include_dirs: Vec::new(),
            lib_dirs: Vec::new(),
            libs: Vec::new(),
            defines: Vec::new(),
        };

        if include_dir.is_dir() {
            resolved.include_dirs.push(include_dir);
        }
        if lib_dir.is_dir() {
            resolved.libs = scan_libraries(&lib_dir).map_err(|e| GenerationError::Resolution {
                dependency: spec.to_string(),
                reason: format!("failed to read {}: {}", lib_dir.display(), e),
            })?;
            resolved.lib_dirs.push(lib_dir);
        }

        debug!(
            "Resolved {} at {} ({} libraries)",
            spec,
            package_root.display(),
            resolved.libs.len()
        );

        Ok(resolved)
    }
}

impl DependencyResolver for PrefixResolver {
    fn resolve(&self, deps: &[DependencySpec]) -> ResolveResult<Vec<ResolvedDependency>> {
        deps.iter().map(|spec| self.resolve_one(spec)).collect()
    }
}

/// Resolves requirements from a fixed table
///
/// Useful when another tool has already resolved the dependency graph.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: BTreeMap<DependencySpec, ResolvedDependency>,
}

impl StaticResolver {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resolved dependency
    pub fn with(mut self, resolved: ResolvedDependency) -> Self {
        self.entries.insert(resolved.spec.clone(), resolved);
        self
    }
}

impl DependencyResolver for StaticResolver {
    fn resolve(&self, deps: &[DependencySpec]) -> ResolveResult<Vec<ResolvedDependency>> {
        deps.iter()
            .map(|spec| {
                self.entries
                    .get(spec)
                    .cloned()
                    .ok_or_else(|| GenerationError::Resolution {
                        dependency: spec.to_string(),
                        reason: "no entry in resolver table".to_string(),
                    })
            })
            .collect()
    }
}

/// List library names in a folder, sorted and deduplicated
fn scan_libraries(lib_dir: &Path) -> std::io::Result<Vec<String>> {
    let mut libs = Vec::new();

    for entry in fs::read_dir(lib_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str().and_then(library_name) {
            libs.push(name);
        }
    }

    libs.sort();
    libs.dedup();
    Ok(libs)
}

/// Library name from a file name: `libfoo.a`, `libfoo.so.1`, `foo.lib` -> `foo`
fn library_name(file_name: &str) -> Option<String> {
    if let Some(stem) = file_name.strip_suffix(".lib") {
        return Some(stem.to_string());
    }

    let rest = file_name.strip_prefix("lib")?;
    for ext in [".a", ".so", ".dylib"] {
        if let Some(pos) = rest.find(ext) {
            let tail = &rest[pos + ext.len()..];
            if (tail.is_empty() || tail.starts_with('.')) && pos > 0 {
                return Some(rest[..pos].to_string());
            }
        }
    }
    None
}

// src/recipe/kitchen/toolchain.rs

//! Toolchain and dependency descriptor generation
//!
//! Writes the files CMake consumes before configure:
//! - `simmer_toolchain.cmake`, passed as `CMAKE_TOOLCHAIN_FILE`
//! - one `<name>-config.cmake` per requirement, found via `find_package`
//! - `simmer-generated.json`, the list of files written by the last run
//!
//! Generation is all-or-nothing: every requirement is resolved and every
//! descriptor rendered before the first byte hits the disk. Output depends
//! only on the recipe, the layout and the toolchain config, so a rerun with
//! the same inputs rewrites identical bytes. Descriptors left over from a
//! previous requirement set are removed using the manifest.

use crate::error::GenerationError;
use crate::recipe::format::Recipe;
use crate::recipe::kitchen::config::ToolchainConfig;
use crate::recipe::kitchen::resolver::{DependencyResolver, ResolvedDependency};
use crate::recipe::layout::{Layout, effective_build_type};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// File name of the generated toolchain descriptor
pub const TOOLCHAIN_FILE: &str = "simmer_toolchain.cmake";

/// File name of the generated-files manifest
pub const MANIFEST_FILE: &str = "simmer-generated.json";

type GenResult<T> = std::result::Result<T, GenerationError>;

/// Files written by a generate run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub toolchain: PathBuf,
    /// One descriptor per requirement, in declaration order
    pub dependencies: Vec<PathBuf>,
    /// Stale descriptors removed from a previous run
    pub removed: Vec<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GeneratedManifest {
    reference: String,
    files: Vec<String>,
}

/// Generate all descriptors for a recipe into the layout's generator folder
pub fn generate(
    recipe: &Recipe,
    layout: &Layout,
    root: &Path,
    toolchain: &ToolchainConfig,
    resolver: &dyn DependencyResolver,
) -> GenResult<GeneratedFiles> {
    let generator_dir = layout.resolve(root).generator_dir;

    let resolved = resolve_in_order(recipe, resolver)?;

    // Render everything up front
    let mut rendered: Vec<(String, String)> = Vec::with_capacity(resolved.len() + 1);
    rendered.push((
        TOOLCHAIN_FILE.to_string(),
        render_toolchain(recipe, toolchain),
    ));
    for dep in &resolved {
        rendered.push((descriptor_file_name(dep), render_dependency(recipe, dep)));
    }

    let manifest = GeneratedManifest {
        reference: recipe.reference(),
        files: rendered.iter().map(|(name, _)| name.clone()).collect(),
    };
    let manifest_json = serde_json::to_string_pretty(&manifest)?;

    fs::create_dir_all(&generator_dir).map_err(|source| GenerationError::Write {
        path: generator_dir.clone(),
        source,
    })?;

    let previous = read_manifest(&generator_dir)?;

    let mut written = Vec::with_capacity(rendered.len());
    for (name, content) in &rendered {
        written.push(write_atomic(&generator_dir, name, content.as_bytes())?);
    }

    let current: BTreeSet<&str> = manifest.files.iter().map(String::as_str).collect();
    let mut removed = Vec::new();
    for stale in previous.files.iter().filter(|f| !current.contains(f.as_str())) {
        // Only plain file names are ever recorded
        if stale.contains(['/', '\\']) {
            continue;
        }
        let path = generator_dir.join(stale);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed stale descriptor {}", path.display());
                removed.push(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(GenerationError::Write { path, source }),
        }
    }

    write_atomic(&generator_dir, MANIFEST_FILE, manifest_json.as_bytes())?;

    let mut written = written.into_iter();
    let toolchain_path = written.next().unwrap_or_else(|| generator_dir.join(TOOLCHAIN_FILE));

    info!(
        "Generated toolchain and {} dependency descriptor(s) in {}",
        resolved.len(),
        generator_dir.display()
    );

    Ok(GeneratedFiles {
        toolchain: toolchain_path,
        dependencies: written.collect(),
        removed,
    })
}

/// Resolve requirements and return them in declaration order
fn resolve_in_order(
    recipe: &Recipe,
    resolver: &dyn DependencyResolver,
) -> GenResult<Vec<ResolvedDependency>> {
    let requires = &recipe.package.requires;
    if requires.is_empty() {
        return Ok(Vec::new());
    }

    let mut resolved = resolver.resolve(requires)?;

    let mut ordered = Vec::with_capacity(requires.len());
    for spec in requires {
        let pos = resolved
            .iter()
            .position(|r| &r.spec == spec)
            .ok_or_else(|| GenerationError::Resolution {
                dependency: spec.to_string(),
                reason: "resolver returned no result".to_string(),
            })?;
        ordered.push(resolved.swap_remove(pos));
    }

    Ok(ordered)
}

fn read_manifest(generator_dir: &Path) -> GenResult<GeneratedManifest> {
    let path = generator_dir.join(MANIFEST_FILE);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(GeneratedManifest::default()),
        Err(source) => Err(GenerationError::Write { path, source }),
    }
}

/// Write a file via a temp file in the same folder
///
/// Unchanged content is left alone so CMake does not see a fresh mtime.
fn write_atomic(dir: &Path, name: &str, content: &[u8]) -> GenResult<PathBuf> {
    let path = dir.join(name);

    if fs::read(&path).is_ok_and(|existing| existing == content) {
        debug!("Unchanged: {}", path.display());
        return Ok(path);
    }

    let write_err = |source| GenerationError::Write {
        path: path.clone(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content).map_err(write_err)?;
    tmp.persist(&path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Descriptor file name for a dependency: `<name>-config.cmake`
pub fn descriptor_file_name(dep: &ResolvedDependency) -> String {
    format!("{}-config.cmake", dep.spec.name())
}

fn render_toolchain(recipe: &Recipe, toolchain: &ToolchainConfig) -> String {
    let mut out = format!(
        "# Toolchain for {}, generated by simmer. Do not edit.\n\n",
        recipe.reference()
    );

    out.push_str(&format!(
        "set(CMAKE_BUILD_TYPE {} CACHE STRING \"Build type\" FORCE)\n",
        quote(effective_build_type(recipe.build_type()))
    ));

    if let Some(cc) = &toolchain.c_compiler {
        out.push_str(&format!("set(CMAKE_C_COMPILER {})\n", quote(cc)));
    }
    if let Some(cxx) = &toolchain.cxx_compiler {
        out.push_str(&format!("set(CMAKE_CXX_COMPILER {})\n", quote(cxx)));
    }
    if let Some(target) = &toolchain.target {
        out.push_str(&format!("set(CMAKE_C_COMPILER_TARGET {})\n", quote(target)));
        out.push_str(&format!("set(CMAKE_CXX_COMPILER_TARGET {})\n", quote(target)));
    }
    if let Some(sysroot) = &toolchain.sysroot {
        out.push_str(&format!("set(CMAKE_SYSROOT {})\n", quote_path(sysroot)));
    }
    for (key, value) in &toolchain.cache_variables {
        out.push_str(&format!(
            "set({} {} CACHE STRING \"\" FORCE)\n",
            key,
            quote(value)
        ));
    }

    // Descriptors sit next to this file
    out.push('\n');
    out.push_str("list(PREPEND CMAKE_PREFIX_PATH \"${CMAKE_CURRENT_LIST_DIR}\")\n");
    out.push_str("list(PREPEND CMAKE_MODULE_PATH \"${CMAKE_CURRENT_LIST_DIR}\")\n");
    out.push_str("set(CMAKE_FIND_PACKAGE_PREFER_CONFIG ON)\n");

    out
}

fn render_dependency(recipe: &Recipe, dep: &ResolvedDependency) -> String {
    let name = dep.spec.name();
    let target = format!("{}::{}", name, name);

    let mut out = format!(
        "# {} for {}, generated by simmer. Do not edit.\n\n",
        dep.spec,
        recipe.reference()
    );

    out.push_str(&format!("set({}_FOUND TRUE)\n", name));
    out.push_str(&format!("set({}_VERSION {})\n", name, quote(dep.spec.version())));
    out.push_str(&format!("set({}_ROOT {})\n", name, quote_path(&dep.root)));
    out.push_str(&format!(
        "set({}_INCLUDE_DIRS{})\n",
        name,
        list(dep.include_dirs.iter().map(|p| quote_path(p)))
    ));
    out.push_str(&format!(
        "set({}_LIBRARY_DIRS{})\n",
        name,
        list(dep.lib_dirs.iter().map(|p| quote_path(p)))
    ));
    out.push_str(&format!(
        "set({}_LIBRARIES{})\n",
        name,
        list(dep.libs.iter().map(|l| quote(l)))
    ));
    out.push_str(&format!(
        "set({}_DEFINITIONS{})\n",
        name,
        list(dep.defines.iter().map(|d| quote(d)))
    ));

    out.push('\n');
    out.push_str(&format!("if(NOT TARGET {})\n", target));
    out.push_str(&format!("  add_library({} INTERFACE IMPORTED)\n", target));
    out.push_str(&format!("  set_target_properties({} PROPERTIES\n", target));
    out.push_str(&format!(
        "    INTERFACE_INCLUDE_DIRECTORIES \"${{{}_INCLUDE_DIRS}}\"\n",
        name
    ));
    out.push_str(&format!(
        "    INTERFACE_LINK_DIRECTORIES \"${{{}_LIBRARY_DIRS}}\"\n",
        name
    ));
    out.push_str(&format!(
        "    INTERFACE_LINK_LIBRARIES \"${{{}_LIBRARIES}}\"\n",
        name
    ));
    out.push_str(&format!(
        "    INTERFACE_COMPILE_DEFINITIONS \"${{{}_DEFINITIONS}}\")\n",
        name
    ));
    out.push_str("endif()\n");

    out
}

/// Space-prefixed argument list, empty when there are no items
fn list(items: impl Iterator<Item = String>) -> String {
    items.map(|item| format!(" {}", item)).collect()
}

/// Quote a string as a CMake bracket-free quoted argument
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' | ';' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Quote a path using forward slashes, which CMake accepts everywhere
fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::format::DependencySpec;
    use crate::recipe::kitchen::resolver::StaticResolver;
    use crate::recipe::layout::compute_layout;
    use tempfile::TempDir;

    fn spec(s: &str) -> DependencySpec {
        s.parse().unwrap()
    }

    fn forest(requires: &[&str]) -> Recipe {
        Recipe::new("forest", "0.1", requires.iter().map(|s| spec(s)).collect())
    }

    fn resolver() -> StaticResolver {
        StaticResolver::new()
            .with(
                ResolvedDependency::at_root(spec("sqlite3/3.37.2"), "/deps/sqlite3/3.37.2")
                    .with_libs(&["sqlite3"]),
            )
            .with(
                ResolvedDependency::at_root(spec("sqlitecpp/3.1.1"), "/deps/sqlitecpp/3.1.1")
                    .with_libs(&["SQLiteCpp"]),
            )
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote("${X};y"), "\"\\${X}\\;y\"");
        assert_eq!(quote_path(Path::new("/opt/sysroot")), "\"/opt/sysroot\"");
    }

    #[test]
    fn test_generate_writes_descriptors() {
        let temp = TempDir::new().unwrap();
        let recipe = forest(&["sqlite3/3.37.2", "sqlitecpp/3.1.1"]);
        let layout = compute_layout(recipe.build_type());

        let files = generate(
            &recipe,
            &layout,
            temp.path(),
            &ToolchainConfig::default(),
            &resolver(),
        )
        .unwrap();

        let gen_dir = temp.path().join("build/Release");
        assert_eq!(files.toolchain, gen_dir.join(TOOLCHAIN_FILE));
        assert_eq!(
            files.dependencies,
            vec![
                gen_dir.join("sqlite3-config.cmake"),
                gen_dir.join("sqlitecpp-config.cmake"),
            ]
        );
        assert!(gen_dir.join(MANIFEST_FILE).exists());

        let toolchain = fs::read_to_string(&files.toolchain).unwrap();
        assert!(toolchain.contains("set(CMAKE_BUILD_TYPE \"Release\""));
        assert!(toolchain.contains("CMAKE_PREFIX_PATH \"${CMAKE_CURRENT_LIST_DIR}\""));
        assert!(!toolchain.contains("CMAKE_C_COMPILER "));

        let sqlite = fs::read_to_string(&files.dependencies[0]).unwrap();
        assert!(sqlite.contains("set(sqlite3_VERSION \"3.37.2\")"));
        assert!(sqlite.contains("set(sqlite3_INCLUDE_DIRS \"/deps/sqlite3/3.37.2/include\")"));
        assert!(sqlite.contains("set(sqlite3_LIBRARIES \"sqlite3\")"));
        assert!(sqlite.contains("add_library(sqlite3::sqlite3 INTERFACE IMPORTED)"));
    }

    #[test]
    fn test_toolchain_settings() {
        let recipe = forest(&[]).with_settings(&[("build_type", "Debug")]).unwrap();
        let toolchain = ToolchainConfig {
            c_compiler: Some("clang".to_string()),
            cxx_compiler: Some("clang++".to_string()),
            target: Some("aarch64-linux-gnu".to_string()),
            sysroot: Some(PathBuf::from("/opt/sysroot")),
            cache_variables: [("BUILD_TESTING".to_string(), "OFF".to_string())]
                .into_iter()
                .collect(),
        };

        let rendered = render_toolchain(&recipe, &toolchain);
        assert!(rendered.contains("set(CMAKE_BUILD_TYPE \"Debug\""));
        assert!(rendered.contains("set(CMAKE_C_COMPILER \"clang\")"));
        assert!(rendered.contains("set(CMAKE_CXX_COMPILER \"clang++\")"));
        assert!(rendered.contains("set(CMAKE_CXX_COMPILER_TARGET \"aarch64-linux-gnu\")"));
        assert!(rendered.contains("set(CMAKE_SYSROOT \"/opt/sysroot\")"));
        assert!(rendered.contains("set(BUILD_TESTING \"OFF\" CACHE STRING \"\" FORCE)"));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let recipe = forest(&["sqlite3/3.37.2", "sqlitecpp/3.1.1"]);
        let layout = compute_layout(None);
        let toolchain = ToolchainConfig::default();

        let first = generate(&recipe, &layout, temp.path(), &toolchain, &resolver()).unwrap();
        let snapshot: Vec<Vec<u8>> = std::iter::once(&first.toolchain)
            .chain(first.dependencies.iter())
            .map(|p| fs::read(p).unwrap())
            .collect();

        let second = generate(&recipe, &layout, temp.path(), &toolchain, &resolver()).unwrap();
        assert_eq!(first, second);
        let again: Vec<Vec<u8>> = std::iter::once(&second.toolchain)
            .chain(second.dependencies.iter())
            .map(|p| fs::read(p).unwrap())
            .collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_generate_removes_stale_descriptors() {
        let temp = TempDir::new().unwrap();
        let layout = compute_layout(None);
        let toolchain = ToolchainConfig::default();

        let both = forest(&["sqlite3/3.37.2", "sqlitecpp/3.1.1"]);
        generate(&both, &layout, temp.path(), &toolchain, &resolver()).unwrap();

        let one = forest(&["sqlite3/3.37.2"]);
        let files = generate(&one, &layout, temp.path(), &toolchain, &resolver()).unwrap();

        let gen_dir = temp.path().join("build/Release");
        assert!(gen_dir.join("sqlite3-config.cmake").exists());
        assert!(!gen_dir.join("sqlitecpp-config.cmake").exists());
        assert_eq!(files.removed, vec![gen_dir.join("sqlitecpp-config.cmake")]);
    }

    #[test]
    fn test_resolution_failure_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let recipe = forest(&["sqlite3/3.37.2", "zlib/1.3"]);
        let layout = compute_layout(None);

        let err = generate(
            &recipe,
            &layout,
            temp.path(),
            &ToolchainConfig::default(),
            &resolver(),
        )
        .unwrap_err();

        assert!(matches!(err, GenerationError::Resolution { ref dependency, .. } if dependency == "zlib/1.3"));
        assert!(!temp.path().join("build").exists());
    }

    #[test]
    fn test_corrupt_manifest_is_fatal() {
        let temp = TempDir::new().unwrap();
        let gen_dir = temp.path().join("build/Release");
        fs::create_dir_all(&gen_dir).unwrap();
        fs::write(gen_dir.join(MANIFEST_FILE), "not json").unwrap();

        let result = generate(
            &forest(&[]),
            &compute_layout(None),
            temp.path(),
            &ToolchainConfig::default(),
            &resolver(),
        );
        assert!(matches!(result, Err(GenerationError::Manifest(_))));
    }
}

// src/recipe/kitchen/sources.rs

//! Exported source selection and staging
//!
//! A recipe lists which files make up its sources as globs relative to the
//! recipe root. With `no_copy_source` CMake reads them in place; otherwise
//! they are copied into `<build>/source` and configured from there, so the
//! build cannot see anything the recipe did not export.

use crate::error::BuildError;
use crate::recipe::format::Recipe;
use crate::recipe::layout::{BUILD_ROOT, PACKAGE_ROOT};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Folder under the build folder that receives staged sources
pub const STAGED_SOURCE_DIR: &str = "source";

/// Files matched by the recipe's export globs, relative to `root`, sorted
pub fn collect_exports(recipe: &Recipe, root: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let staging_err = |reason: String| BuildError::Staging {
        path: root.to_path_buf(),
        reason,
    };

    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    let mut files = BTreeSet::new();

    for pattern in &recipe.sources.exports {
        let full = format!("{}/{}", escaped_root, pattern);
        let matches = glob::glob(&full)
            .map_err(|e| staging_err(format!("invalid export pattern '{}': {}", pattern, e)))?;

        let mut matched = false;
        for entry in matches {
            let path = entry.map_err(|e| staging_err(e.to_string()))?;
            matched = true;

            if path.is_dir() {
                for item in WalkDir::new(&path).sort_by_file_name() {
                    let item = item.map_err(|e| staging_err(e.to_string()))?;
                    if item.file_type().is_file() {
                        insert_export(&mut files, relative_to(root, item.path())?);
                    }
                }
            } else if path.is_file() {
                insert_export(&mut files, relative_to(root, &path)?);
            }
        }

        if !matched {
            warn!("Export pattern '{}' matched nothing", pattern);
        }
    }

    Ok(files.into_iter().collect())
}

/// Copy the exported sources into `dest`, replacing its previous contents
///
/// Returns the number of files copied.
pub fn stage_sources(recipe: &Recipe, root: &Path, dest: &Path) -> Result<usize, BuildError> {
    let files = collect_exports(recipe, root)?;

    let staging_err = |path: &Path, e: std::io::Error| BuildError::Staging {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    if dest.exists() {
        fs::remove_dir_all(dest).map_err(|e| staging_err(dest, e))?;
    }
    fs::create_dir_all(dest).map_err(|e| staging_err(dest, e))?;

    for rel in &files {
        let target = dest.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| staging_err(parent, e))?;
        }
        fs::copy(root.join(rel), &target).map_err(|e| staging_err(&target, e))?;
    }

    debug!("Staged {} source file(s) into {}", files.len(), dest.display());
    Ok(files.len())
}

/// Record an export unless it lives in an output folder
fn insert_export(files: &mut BTreeSet<PathBuf>, rel: PathBuf) {
    if rel.starts_with(BUILD_ROOT) || rel.starts_with(PACKAGE_ROOT) {
        return;
    }
    files.insert(rel);
}

fn relative_to(root: &Path, path: &Path) -> Result<PathBuf, BuildError> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| BuildError::Staging {
            path: path.to_path_buf(),
            reason: format!("not under {}", root.display()),
        })
}

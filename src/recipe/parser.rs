// src/recipe/parser.rs

//! Recipe file parsing

use crate::error::{Error, Result};
use crate::recipe::format::{Recipe, STANDARD_BUILD_TYPES};
use std::collections::HashSet;
use std::path::Path;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    parse_recipe(&content)
}

/// Validate a recipe for completeness and correctness
///
/// Returns warnings for issues that do not stop a cook.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.is_empty() {
        return Err(Error::ValidationError("Recipe package name cannot be empty".to_string()));
    }
    if recipe.package.version.is_empty() {
        return Err(Error::ValidationError("Recipe package version cannot be empty".to_string()));
    }

    // The build type becomes a folder name under build/
    if let Some(build_type) = recipe.build_type()
        && !build_type.is_empty()
    {
        if build_type == "." || build_type == ".." || build_type.contains(['/', '\\']) {
            return Err(Error::ValidationError(format!(
                "Build type '{}' is not a valid folder name",
                build_type
            )));
        }
        if !STANDARD_BUILD_TYPES.contains(&build_type) {
            warnings.push(format!(
                "Non-standard build type '{}' (standard: {})",
                build_type,
                STANDARD_BUILD_TYPES.join(", ")
            ));
        }
    }

    // Names become folder, file and CMake identifiers
    check_identifier("package name", &recipe.package.name)?;
    check_identifier("package version", &recipe.package.version)?;

    let mut seen = HashSet::new();
    for dep in &recipe.package.requires {
        check_identifier("requirement name", dep.name())?;
        check_identifier("requirement version", dep.version())?;
        if !seen.insert(dep.name()) {
            return Err(Error::ValidationError(format!(
                "Package '{}' is required more than once",
                dep.name()
            )));
        }
    }

    if recipe.package.summary.is_none() {
        warnings.push("Missing package summary".to_string());
    }
    if recipe.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }
    if recipe.sources.exports.is_empty() {
        warnings.push("No exported sources declared".to_string());
    }

    Ok(warnings)
}

/// Accept `[A-Za-z0-9_.+-]+`, except `.` and `..`
fn check_identifier(kind: &str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-'));

    if valid {
        Ok(())
    } else {
        Err(Error::ValidationError(format!(
            "Invalid {} '{}': use letters, digits, '_', '.', '+' or '-'",
            kind, value
        )))
    }
}

// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files that describe a native library package: its
//! identity, the packages it requires, the settings it recognizes, which
//! source files belong to it, and how consumers should find it.

use crate::error::{Error, Result};
use crate::recipe::package_info::FindMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Build types CMake understands out of the box
pub const STANDARD_BUILD_TYPES: &[&str] = &["Debug", "Release", "RelWithDebInfo", "MinSizeRel"];

/// A complete recipe for packaging a library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata and requirements
    pub package: PackageSection,

    /// Values for the settings this recipe recognizes
    #[serde(default)]
    pub settings: Settings,

    /// Files that make up the package sources
    #[serde(default)]
    pub sources: SourcesSection,

    /// Overrides for the published consumption metadata (optional)
    #[serde(default)]
    pub package_info: Option<PackageInfoSection>,
}

impl Recipe {
    /// Create a recipe with no settings, default sources and no overrides
    pub fn new(name: &str, version: &str, requires: Vec<DependencySpec>) -> Self {
        Self {
            package: PackageSection {
                name: name.to_string(),
                version: version.to_string(),
                requires,
                summary: None,
                license: None,
                homepage: None,
            },
            settings: Settings::default(),
            sources: SourcesSection::default(),
            package_info: None,
        }
    }

    /// Return a copy of this recipe with settings overridden
    ///
    /// Overrides are `(key, value)` pairs; keys must be recognized settings.
    pub fn with_settings<K, V>(&self, overrides: &[(K, V)]) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut recipe = self.clone();
        for (key, value) in overrides {
            recipe.settings.set(key.as_ref(), value.as_ref())?;
        }
        Ok(recipe)
    }

    /// The package reference, e.g. `forest/0.1`
    pub fn reference(&self) -> String {
        format!("{}/{}", self.package.name, self.package.version)
    }

    /// The configured build type, if any
    pub fn build_type(&self) -> Option<&str> {
        self.settings.build_type.as_deref()
    }
}

/// Package metadata section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Required packages, as `name/version`
    #[serde(default)]
    pub requires: Vec<DependencySpec>,

    /// Short description
    #[serde(default)]
    pub summary: Option<String>,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    /// Homepage URL
    #[serde(default)]
    pub homepage: Option<String>,
}

/// A required package: name and exact version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DependencySpec {
    name: String,
    version: String,
}

impl DependencySpec {
    /// Create a dependency spec
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package version
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl FromStr for DependencySpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, version) = s
            .split_once('/')
            .ok_or_else(|| Error::ParseError(format!("Invalid requirement '{}': expected name/version", s)))?;

        let name = name.trim();
        let version = version.trim();
        if name.is_empty() || version.is_empty() || version.contains('/') {
            return Err(Error::ParseError(format!(
                "Invalid requirement '{}': expected name/version",
                s
            )));
        }

        Ok(Self::new(name, version))
    }
}

impl TryFrom<String> for DependencySpec {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DependencySpec> for String {
    fn from(spec: DependencySpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Settings recognized by a recipe
///
/// Only the build type is recognized; any other key is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// CMake build type (`Release` when unset)
    #[serde(default)]
    pub build_type: Option<String>,
}

impl Settings {
    /// Setting keys a recipe accepts
    pub const KEYS: &'static [&'static str] = &["build_type"];

    /// Set a setting by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "build_type" => {
                self.build_type = Some(value.to_string());
                Ok(())
            }
            other => Err(Error::ValidationError(format!(
                "Unknown setting '{}' (recognized: {})",
                other,
                Self::KEYS.join(", ")
            ))),
        }
    }
}

/// Which files belong to the package sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesSection {
    /// Glob patterns relative to the recipe root
    #[serde(default = "default_exports")]
    pub exports: Vec<String>,

    /// Build straight from the source root instead of a staged copy
    #[serde(default = "default_no_copy_source")]
    pub no_copy_source: bool,
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            exports: default_exports(),
            no_copy_source: default_no_copy_source(),
        }
    }
}

fn default_exports() -> Vec<String> {
    vec![
        "CMakeLists.txt".to_string(),
        "include/*".to_string(),
        "test/*".to_string(),
        "cmake/*".to_string(),
    ]
}

fn default_no_copy_source() -> bool {
    true
}

/// Overrides for the published package metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageInfoSection {
    /// Name of the `<file_name>-config.cmake` consumers load
    #[serde(default)]
    pub file_name: Option<String>,

    /// Name of the imported target consumers link
    #[serde(default)]
    pub target_name: Option<String>,

    /// How `find_package` may locate the package
    #[serde(default)]
    pub find_mode: Option<FindMode>,

    /// Extra CMake modules shipped in the package, relative to its root
    #[serde(default)]
    pub build_modules: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RECIPE: &str = r#"
[package]
name = "forest"
version = "0.1"
license = "MIT"
requires = ["sqlite3/3.37.2", "sqlitecpp/3.1.1"]

[settings]
build_type = "Debug"

[sources]
exports = ["CMakeLists.txt", "include/*"]
no_copy_source = false

[package_info]
find_mode = "config"
"#;

    #[test]
    fn test_parse_recipe() {
        let recipe: Recipe = toml::from_str(SAMPLE_RECIPE).unwrap();

        assert_eq!(recipe.package.name, "forest");
        assert_eq!(recipe.package.version, "0.1");
        assert_eq!(recipe.package.license.as_deref(), Some("MIT"));
        assert_eq!(
            recipe.package.requires,
            vec![
                DependencySpec::new("sqlite3", "3.37.2"),
                DependencySpec::new("sqlitecpp", "3.1.1"),
            ]
        );
        assert_eq!(recipe.build_type(), Some("Debug"));
        assert!(!recipe.sources.no_copy_source);
        assert_eq!(
            recipe.package_info.as_ref().and_then(|p| p.find_mode),
            Some(FindMode::Config)
        );
    }

    #[test]
    fn test_minimal_recipe_defaults() {
        let recipe: Recipe = toml::from_str(
            r#"
[package]
name = "hello"
version = "1.0"
"#,
        )
        .unwrap();

        assert!(recipe.package.requires.is_empty());
        assert_eq!(recipe.build_type(), None);
        assert!(recipe.sources.no_copy_source);
        assert!(recipe.sources.exports.contains(&"CMakeLists.txt".to_string()));
        assert!(recipe.package_info.is_none());
    }

    #[test]
    fn test_unknown_setting_rejected() {
        let result: std::result::Result<Recipe, _> = toml::from_str(
            r#"
[package]
name = "hello"
version = "1.0"

[settings]
compiler = "gcc"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_dependency_spec_parse() {
        let spec: DependencySpec = "sqlite3/3.37.2".parse().unwrap();
        assert_eq!(spec.name(), "sqlite3");
        assert_eq!(spec.version(), "3.37.2");
        assert_eq!(spec.to_string(), "sqlite3/3.37.2");

        assert!("sqlite3".parse::<DependencySpec>().is_err());
        assert!("/3.37.2".parse::<DependencySpec>().is_err());
        assert!("sqlite3/".parse::<DependencySpec>().is_err());
        assert!("a/b/c".parse::<DependencySpec>().is_err());
    }

    #[test]
    fn test_bad_requirement_fails_parse() {
        let result: std::result::Result<Recipe, _> = toml::from_str(
            r#"
[package]
name = "hello"
version = "1.0"
requires = ["zlib"]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_with_settings_leaves_original_untouched() {
        let recipe = Recipe::new("forest", "0.1", Vec::new());
        let debug = recipe.with_settings(&[("build_type", "Debug")]).unwrap();

        assert_eq!(recipe.build_type(), None);
        assert_eq!(debug.build_type(), Some("Debug"));
        assert!(recipe.with_settings(&[("arch", "x86_64")]).is_err());
    }

    #[test]
    fn test_reference() {
        let recipe = Recipe::new("forest", "0.1", Vec::new());
        assert_eq!(recipe.reference(), "forest/0.1");
    }
}

// src/recipe/package_info.rs

//! Consumption metadata published for downstream build systems
//!
//! The metadata tells a consumer's CMake how to find the package: which
//! config file name to look for, which imported target to link, whether
//! `find_package` may use module mode, config mode or both, and which extra
//! CMake modules the package ships. It is derived from the recipe alone.

use crate::recipe::format::Recipe;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How `find_package` may locate the package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FindMode {
    /// Both `Find<name>.cmake` and `<name>-config.cmake`
    #[default]
    Both,
    /// Only `Find<name>.cmake`
    Module,
    /// Only `<name>-config.cmake`
    Config,
}

impl FindMode {
    /// Get the mode name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FindMode::Both => "both",
            FindMode::Module => "module",
            FindMode::Config => "config",
        }
    }
}

/// Static record consumers use to locate and link the package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub target_name: String,
    pub file_name: String,
    pub find_mode: FindMode,
    /// Paths relative to the package root, in load order
    pub build_modules: Vec<PathBuf>,
}

impl PackageMetadata {
    /// Render the metadata as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Publish consumption metadata for a recipe
pub fn publish(recipe: &Recipe) -> PackageMetadata {
    let name = &recipe.package.name;
    let overrides = recipe.package_info.clone().unwrap_or_default();

    let build_modules = match overrides.build_modules {
        Some(modules) => modules.into_iter().map(PathBuf::from).collect(),
        None => vec![
            Path::new("lib")
                .join("cmake")
                .join(name)
                .join(format!("{}Targets.cmake", name)),
        ],
    };

    PackageMetadata {
        target_name: overrides.target_name.unwrap_or_else(|| name.clone()),
        file_name: overrides.file_name.unwrap_or_else(|| name.clone()),
        find_mode: overrides.find_mode.unwrap_or_default(),
        build_modules,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::format::{DependencySpec, PackageInfoSection};

    fn forest() -> Recipe {
        Recipe::new(
            "forest",
            "0.1",
            vec![
                DependencySpec::new("sqlite3", "3.37.2"),
                DependencySpec::new("sqlitecpp", "3.1.1"),
            ],
        )
    }

    #[test]
    fn test_publish_defaults() {
        let info = publish(&forest());
        assert_eq!(info.target_name, "forest");
        assert_eq!(info.file_name, "forest");
        assert_eq!(info.find_mode, FindMode::Both);
        assert_eq!(
            info.build_modules,
            vec![PathBuf::from("lib/cmake/forest/forestTargets.cmake")]
        );
    }

    #[test]
    fn test_publish_ignores_settings() {
        let recipe = forest();
        let debug = recipe.with_settings(&[("build_type", "Debug")]).unwrap();
        assert_eq!(publish(&recipe), publish(&debug));
    }

    #[test]
    fn test_publish_overrides() {
        let mut recipe = forest();
        recipe.package_info = Some(PackageInfoSection {
            file_name: Some("Forest".to_string()),
            target_name: Some("forest::forest".to_string()),
            find_mode: Some(FindMode::Config),
            build_modules: Some(vec![
                "lib/cmake/forest/a.cmake".to_string(),
                "lib/cmake/forest/b.cmake".to_string(),
            ]),
        });

        let info = publish(&recipe);
        assert_eq!(info.file_name, "Forest");
        assert_eq!(info.target_name, "forest::forest");
        assert_eq!(info.find_mode, FindMode::Config);
        assert_eq!(
            info.build_modules,
            vec![
                PathBuf::from("lib/cmake/forest/a.cmake"),
                PathBuf::from("lib/cmake/forest/b.cmake"),
            ]
        );
    }

    #[test]
    fn test_metadata_json_shape() {
        let json = publish(&forest()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["target_name"], "forest");
        assert_eq!(value["find_mode"], "both");
        assert_eq!(value["build_modules"][0], "lib/cmake/forest/forestTargets.cmake");
    }
}

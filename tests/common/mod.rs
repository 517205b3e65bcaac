// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use simmer::recipe::{BuildContext, BuildSystem, Kitchen, KitchenConfig, StepOutput};
use simmer::{BuildError, Recipe, parse_recipe};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const FOREST_RECIPE: &str = r#"
[package]
name = "forest"
version = "0.1"
summary = "Trees on top of sqlite"
license = "MIT"
requires = ["sqlite3/3.37.2", "sqlitecpp/3.1.1"]
"#;

/// A recipe root with a CMake project, plus an installed dependency prefix.
///
/// Returns (TempDir, recipe) - keep the TempDir alive to prevent cleanup.
pub fn forest_project() -> (TempDir, Recipe) {
    forest_project_in(tempfile::tempdir().unwrap())
}

/// Same as [`forest_project`], laid out inside an existing folder
pub fn forest_project_in(temp: TempDir) -> (TempDir, Recipe) {
    let root = temp.path().join("forest");

    fs::create_dir_all(root.join("include/forest")).unwrap();
    fs::write(
        root.join("CMakeLists.txt"),
        "cmake_minimum_required(VERSION 3.15)\nproject(forest CXX)\n",
    )
    .unwrap();
    fs::write(root.join("include/forest/forest.hpp"), "#pragma once\n").unwrap();
    fs::write(root.join("recipe.toml"), FOREST_RECIPE).unwrap();

    install_dependency(temp.path(), "sqlite3", "3.37.2", &["libsqlite3.a"]);
    install_dependency(temp.path(), "sqlitecpp", "3.1.1", &["libSQLiteCpp.a"]);

    (temp, parse_recipe(FOREST_RECIPE).unwrap())
}

/// Recipe root inside a project made by [`forest_project`]
pub fn root(temp: &TempDir) -> std::path::PathBuf {
    temp.path().join("forest")
}

/// Dependency prefix inside a project made by [`forest_project`]
pub fn deps_root(temp: &TempDir) -> std::path::PathBuf {
    temp.path().join("deps")
}

fn install_dependency(base: &Path, name: &str, version: &str, libs: &[&str]) {
    let prefix = base.join("deps").join(name).join(version);
    fs::create_dir_all(prefix.join("include")).unwrap();
    fs::create_dir_all(prefix.join("lib")).unwrap();
    for lib in libs {
        fs::write(prefix.join("lib").join(lib), b"!<arch>\n").unwrap();
    }
}

/// Stand-in for CMake: records each step and installs the exported headers.
#[derive(Default)]
pub struct FakeCMake {
    pub steps: Mutex<Vec<String>>,
    /// Step that exits non-zero
    pub fail_on: Option<&'static str>,
}

impl FakeCMake {
    pub fn failing(stage: &'static str) -> Self {
        Self {
            fail_on: Some(stage),
            ..Default::default()
        }
    }

    pub fn steps(&self) -> Vec<String> {
        self.steps.lock().unwrap().clone()
    }

    fn step(&self, stage: &'static str, ctx: &BuildContext) -> Result<StepOutput, BuildError> {
        self.steps.lock().unwrap().push(stage.to_string());
        if self.fail_on == Some(stage) {
            return Err(BuildError::Failed {
                stage,
                code: Some(1),
                stderr: format!("CMake Error in {}", ctx.build_dir.display()),
            });
        }
        Ok(StepOutput {
            stdout: format!("-- {} done", stage),
            stderr: String::new(),
        })
    }
}

impl BuildSystem for FakeCMake {
    fn configure(&self, ctx: &BuildContext) -> Result<StepOutput, BuildError> {
        assert!(ctx.toolchain_file().exists(), "configure ran before generate");
        let output = self.step("configure", ctx)?;
        fs::write(ctx.build_dir.join("CMakeCache.txt"), &ctx.build_type).unwrap();
        Ok(output)
    }

    fn build(&self, ctx: &BuildContext) -> Result<StepOutput, BuildError> {
        let output = self.step("build", ctx)?;
        fs::write(ctx.build_dir.join("libforest.a"), b"!<arch>\n").unwrap();
        Ok(output)
    }

    fn install(&self, ctx: &BuildContext) -> Result<StepOutput, BuildError> {
        let output = self.step("install", ctx)?;
        let include = ctx.package_dir.join("include/forest");
        let lib = ctx.package_dir.join("lib");
        fs::create_dir_all(&include).unwrap();
        fs::create_dir_all(&lib).unwrap();
        fs::copy(
            ctx.source_dir.join("include/forest/forest.hpp"),
            include.join("forest.hpp"),
        )
        .unwrap();
        fs::copy(ctx.build_dir.join("libforest.a"), lib.join("libforest.a")).unwrap();
        Ok(output)
    }
}

/// Kitchen wired to the project's dependency prefix and a fake CMake
pub fn kitchen(temp: &TempDir, cmake: Arc<FakeCMake>) -> Kitchen {
    let config = KitchenConfig {
        deps_root: deps_root(temp),
        jobs: 2,
        ..Default::default()
    };
    let mut kitchen = Kitchen::new(config);
    kitchen.set_build_system(cmake);
    kitchen
}

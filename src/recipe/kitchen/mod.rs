// src/recipe/kitchen/mod.rs

//! Kitchen: where recipes are cooked
//!
//! The Kitchen owns the configuration and the two external collaborators a
//! cook needs:
//! - a [`DependencyResolver`] that turns requirements into include/link info
//! - a [`BuildSystem`] that configures, builds and installs (CMake by default)
//!
//! and drives a [`Cook`] through every lifecycle stage in order.

pub mod build_system;
mod config;
mod cook;
pub mod lock;
pub mod resolver;
pub mod sources;
pub mod toolchain;

pub use build_system::{BuildContext, BuildSystem, CMake, StepOutput};
pub use config::{CookResult, KitchenConfig, ToolchainConfig};
pub use cook::{Cook, Stage};
pub use lock::BuildFolderLock;
pub use resolver::{DependencyResolver, PrefixResolver, ResolvedDependency, StaticResolver};
pub use toolchain::GeneratedFiles;

use crate::error::{BuildError, Result};
use crate::recipe::format::Recipe;
use crate::recipe::parser::validate_recipe;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    /// Resolver for requirements; a prefix resolver over `deps_root` when unset
    resolver: Option<Arc<dyn DependencyResolver>>,
    /// Build system; CMake located from the config when unset
    build_system: Option<Arc<dyn BuildSystem>>,
}

impl Kitchen {
    /// Create a new Kitchen with the given configuration
    pub fn new(config: KitchenConfig) -> Self {
        Self {
            config,
            resolver: None,
            build_system: None,
        }
    }

    /// Create a Kitchen with default configuration
    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    /// Set the dependency resolver
    pub fn set_resolver(&mut self, resolver: Arc<dyn DependencyResolver>) {
        self.resolver = Some(resolver);
    }

    /// Set the build system
    pub fn set_build_system(&mut self, build_system: Arc<dyn BuildSystem>) {
        self.build_system = Some(build_system);
    }

    /// The Kitchen's configuration
    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    pub(crate) fn resolver(&self) -> Arc<dyn DependencyResolver> {
        match &self.resolver {
            Some(resolver) => Arc::clone(resolver),
            None => {
                // Resolved paths end up in descriptors read from the build folder
                let deps_root = &self.config.deps_root;
                let deps_root = std::path::absolute(deps_root).unwrap_or_else(|_| deps_root.clone());
                Arc::new(PrefixResolver::new(deps_root))
            }
        }
    }

    pub(crate) fn build_system(&self) -> std::result::Result<Arc<dyn BuildSystem>, BuildError> {
        if let Some(build_system) = &self.build_system {
            return Ok(Arc::clone(build_system));
        }

        let cmake = CMake::locate(self.config.cmake.as_deref())?
            .with_generator(self.config.generator.clone());
        info!("Using cmake at {}", cmake.program().display());
        Ok(Arc::new(cmake))
    }

    /// Start a cook without running any stage
    ///
    /// Callers driving stages one at a time use this; [`Kitchen::cook`] runs
    /// them all.
    pub fn prepare<'a>(&'a self, recipe: &'a Recipe, root: &Path) -> Cook<'a> {
        Cook::new(self, recipe, root)
    }

    /// Cook a recipe through every stage and publish its metadata
    ///
    /// ## Stages
    /// 1. **Layout**: derive build and generator folders from the build type
    /// 2. **Generate**: write toolchain and dependency descriptors
    /// 3. **Configure**: run the build system's configure step
    /// 4. **Build**: compile
    /// 5. **Package**: install into the package folder
    /// 6. **Publish**: derive consumption metadata
    ///
    /// The build folder is locked from generate through package.
    pub fn cook(&self, recipe: &Recipe, root: &Path) -> Result<CookResult> {
        info!("Cooking {}", recipe.reference());

        let warnings = validate_recipe(recipe)?;
        for warning in &warnings {
            warn!("{}: {}", recipe.reference(), warning);
        }

        let mut cook = self.prepare(recipe, root);
        cook.warnings.extend(warnings);

        let layout = cook.resolve_layout()?;

        let lock = if self.config.lock_build_folder {
            Some(BuildFolderLock::acquire(&layout.resolve(cook.root()).build_dir)?)
        } else {
            None
        };

        info!("Generating descriptors...");
        cook.generate()?;

        info!("Configuring...");
        cook.configure()?;

        info!("Building...");
        cook.build()?;

        info!("Packaging...");
        cook.package()?;

        drop(lock);

        cook.publish()?;

        let result = cook.finish()?;
        info!(
            "Cooked {} into {}",
            recipe.reference(),
            result.package_dir.display()
        );
        Ok(result)
    }
}

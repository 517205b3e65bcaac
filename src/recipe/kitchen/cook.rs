// src/recipe/kitchen/cook.rs

//! Cook: the lifecycle of a single recipe invocation
//!
//! A cook moves through a fixed sequence of stages:
//!
//! ```text
//! Declared -> LayoutResolved -> Generated -> Configured -> Built -> Packaged -> Published
//! ```
//!
//! Each stage runs once and only after the one before it succeeded. The
//! first failure halts the cook where it stands: nothing is rolled back or
//! retried, and every later call returns [`Error::Halted`].

use crate::error::{BuildError, Error, PackageError, Result};
use crate::recipe::format::Recipe;
use crate::recipe::kitchen::build_system::{BuildContext, BuildSystem, StepOutput};
use crate::recipe::kitchen::config::CookResult;
use crate::recipe::kitchen::sources::{STAGED_SOURCE_DIR, stage_sources};
use crate::recipe::kitchen::toolchain::{self, GeneratedFiles};
use crate::recipe::layout::{Layout, PACKAGE_ROOT, compute_layout, effective_build_type};
use crate::recipe::package_info::{self, PackageMetadata};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::Kitchen;

/// Lifecycle stage of a cook
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Declared,
    LayoutResolved,
    Generated,
    Configured,
    Built,
    Packaged,
    Published,
}

impl Stage {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Declared => "declared",
            Stage::LayoutResolved => "layout",
            Stage::Generated => "generate",
            Stage::Configured => "configure",
            Stage::Built => "build",
            Stage::Packaged => "package",
            Stage::Published => "publish",
        }
    }

    /// The stage that follows this one, `None` once published
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Declared => Some(Stage::LayoutResolved),
            Stage::LayoutResolved => Some(Stage::Generated),
            Stage::Generated => Some(Stage::Configured),
            Stage::Configured => Some(Stage::Built),
            Stage::Built => Some(Stage::Packaged),
            Stage::Packaged => Some(Stage::Published),
            Stage::Published => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cook operation
pub struct Cook<'a> {
    kitchen: &'a Kitchen,
    recipe: &'a Recipe,
    /// Recipe root; all layout paths are relative to it
    root: PathBuf,
    stage: Stage,
    /// Stage whose attempt failed, if any
    halted_at: Option<Stage>,
    layout: Option<Layout>,
    generated: Option<GeneratedFiles>,
    build_system: Option<Arc<dyn BuildSystem>>,
    context: Option<BuildContext>,
    metadata: Option<PackageMetadata>,
    /// Build log accumulator
    pub(super) log: String,
    /// Warnings
    pub(super) warnings: Vec<String>,
}

impl<'a> Cook<'a> {
    pub(super) fn new(kitchen: &'a Kitchen, recipe: &'a Recipe, root: &Path) -> Self {
        // Build steps run inside the build folder, so relative paths would
        // resolve against the wrong directory
        let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());

        Self {
            kitchen,
            recipe,
            root,
            stage: Stage::Declared,
            halted_at: None,
            layout: None,
            generated: None,
            build_system: None,
            context: None,
            metadata: None,
            log: String::new(),
            warnings: Vec::new(),
        }
    }

    /// Absolute recipe root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current stage
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Stage that failed, if the cook has halted
    pub fn halted_at(&self) -> Option<Stage> {
        self.halted_at
    }

    /// Layout, once resolved
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Resolve the folder layout from the recipe's build type
    pub fn resolve_layout(&mut self) -> Result<Layout> {
        self.advance(Stage::LayoutResolved, |cook| {
            let layout = compute_layout(cook.recipe.build_type());
            debug!(
                "Layout: build={} generators={}",
                layout.build_folder.display(),
                layout.generator_folder.display()
            );
            cook.layout = Some(layout.clone());
            Ok(layout)
        })
    }

    /// Write the toolchain and dependency descriptors
    pub fn generate(&mut self) -> Result<GeneratedFiles> {
        self.advance(Stage::Generated, |cook| {
            let layout = cook.require_layout()?;
            let resolver = cook.kitchen.resolver();
            let generated = toolchain::generate(
                cook.recipe,
                &layout,
                &cook.root,
                &cook.kitchen.config.toolchain,
                resolver.as_ref(),
            )?;

            cook.log_line(&format!(
                "Generated {} and {} dependency descriptor(s)",
                generated.toolchain.display(),
                generated.dependencies.len()
            ));
            for stale in &generated.removed {
                cook.log_line(&format!("Removed stale descriptor {}", stale.display()));
            }

            cook.generated = Some(generated.clone());
            Ok(generated)
        })
    }

    /// Configure the native build tree
    pub fn configure(&mut self) -> Result<()> {
        self.advance(Stage::Configured, |cook| {
            let layout = cook.require_layout()?;
            let resolved = layout.resolve(&cook.root);

            let source_dir = if cook.recipe.sources.no_copy_source {
                cook.root.clone()
            } else {
                let staged = resolved.build_dir.join(STAGED_SOURCE_DIR);
                let count = stage_sources(cook.recipe, &cook.root, &staged)?;
                cook.log_line(&format!("Staged {} source file(s) into {}", count, staged.display()));
                staged
            };

            let build_type = effective_build_type(cook.recipe.build_type()).to_string();
            let package_dir = match &cook.kitchen.config.package_dir {
                Some(dir) => std::path::absolute(dir)?,
                None => cook.root.join(PACKAGE_ROOT).join(&build_type),
            };

            let context = BuildContext {
                source_dir,
                build_dir: resolved.build_dir,
                generator_dir: resolved.generator_dir,
                package_dir,
                build_type,
                jobs: cook.kitchen.config.jobs,
            };

            let build_system = cook.kitchen.build_system()?;
            let output = build_system.configure(&context)?;
            cook.log_build_output("configure", &output);

            cook.build_system = Some(build_system);
            cook.context = Some(context);
            Ok(())
        })
    }

    /// Compile the configured build tree
    pub fn build(&mut self) -> Result<()> {
        self.advance(Stage::Built, |cook| {
            let (build_system, context) = cook.require_configured()?;
            let output = build_system.build(&context)?;
            cook.log_build_output("build", &output);
            Ok(())
        })
    }

    /// Install build outputs into the package folder
    ///
    /// The package folder is emptied first, so a re-install leaves exactly
    /// what this build installed.
    pub fn package(&mut self) -> Result<PathBuf> {
        self.advance(Stage::Packaged, |cook| {
            let (build_system, context) = cook.require_configured()?;
            let package_dir = context.package_dir.clone();

            // The package folder is wiped below
            let overlap = if cook.root.starts_with(&package_dir) {
                Some("package folder contains the recipe root")
            } else if context.build_dir.starts_with(&package_dir)
                || context.generator_dir.starts_with(&package_dir)
            {
                Some("package folder contains the build folder")
            } else if package_dir.starts_with(&context.build_dir) {
                Some("package folder is inside the build folder")
            } else {
                None
            };
            if let Some(reason) = overlap {
                return Err(PackageError::Io {
                    path: package_dir,
                    source: std::io::Error::other(reason),
                }
                .into());
            }

            if package_dir.exists() {
                debug!("Clearing previous package tree {}", package_dir.display());
                fs::remove_dir_all(&package_dir).map_err(|source| PackageError::Io {
                    path: package_dir.clone(),
                    source,
                })?;
            }
            fs::create_dir_all(&package_dir).map_err(|source| PackageError::Io {
                path: package_dir.clone(),
                source,
            })?;

            let output = build_system.install(&context).map_err(PackageError::Install)?;
            cook.log_build_output("install", &output);

            if fs::read_dir(&package_dir).map(|mut d| d.next().is_none()).unwrap_or(true) {
                warn!("Install produced no files in {}", package_dir.display());
                cook.warnings
                    .push(format!("Install produced no files in {}", package_dir.display()));
            }

            info!("Packaged {} into {}", cook.recipe.reference(), package_dir.display());
            Ok(package_dir)
        })
    }

    /// Publish consumption metadata
    pub fn publish(&mut self) -> Result<PackageMetadata> {
        self.advance(Stage::Published, |cook| {
            let metadata = package_info::publish(cook.recipe);
            cook.log_line(&format!(
                "Published {} (target {}, find mode {})",
                metadata.file_name,
                metadata.target_name,
                metadata.find_mode.as_str()
            ));
            cook.metadata = Some(metadata.clone());
            Ok(metadata)
        })
    }

    /// Collect the outcome of a published cook
    pub fn finish(self) -> Result<CookResult> {
        if let Some(stage) = self.halted_at {
            return Err(Error::Halted { stage });
        }

        match (self.layout, self.generated, self.context, self.metadata) {
            (Some(layout), Some(generated), Some(context), Some(metadata))
                if self.stage == Stage::Published =>
            {
                Ok(CookResult {
                    layout,
                    package_dir: context.package_dir,
                    generated,
                    metadata,
                    log: self.log,
                    warnings: self.warnings,
                })
            }
            _ => Err(Error::OutOfOrder {
                stage: Stage::Published,
                current: self.stage,
            }),
        }
    }

    /// Run one transition, enforcing order and halting on failure
    fn advance<T>(
        &mut self,
        target: Stage,
        run: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if let Some(stage) = self.halted_at {
            return Err(Error::Halted { stage });
        }

        if self.stage.next() != Some(target) {
            let err = match target {
                Stage::Built if self.stage < Stage::Configured => BuildError::NotConfigured.into(),
                Stage::Packaged if self.stage < Stage::Built => {
                    PackageError::BuildNotCompleted.into()
                }
                _ => Error::OutOfOrder {
                    stage: target,
                    current: self.stage,
                },
            };
            warn!("{}", err);
            self.halted_at = Some(target);
            return Err(err);
        }

        match run(self) {
            Ok(value) => {
                self.stage = target;
                Ok(value)
            }
            Err(err) => {
                warn!("{} failed for {}: {}", target, self.recipe.reference(), err);
                self.halted_at = Some(target);
                Err(err)
            }
        }
    }

    fn require_layout(&self) -> Result<Layout> {
        self.layout.clone().ok_or(Error::OutOfOrder {
            stage: Stage::LayoutResolved,
            current: self.stage,
        })
    }

    fn require_configured(&self) -> Result<(Arc<dyn BuildSystem>, BuildContext)> {
        match (&self.build_system, &self.context) {
            (Some(build_system), Some(context)) => Ok((Arc::clone(build_system), context.clone())),
            _ => Err(BuildError::NotConfigured.into()),
        }
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    /// Log build step output (stdout/stderr) with a phase header
    fn log_build_output(&mut self, phase: &str, output: &StepOutput) {
        self.log_line(&format!("=== {} ===", phase));
        if !output.stdout.is_empty() {
            self.log.push_str(&output.stdout);
            self.log.push('\n');
        }
        if !output.stderr.is_empty() {
            self.log.push_str(&output.stderr);
            self.log.push('\n');
        }
    }
}

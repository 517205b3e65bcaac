// src/recipe/kitchen/build_system.rs

//! The external native build system
//!
//! The Kitchen never compiles anything itself. Configure, build and install
//! are delegated to a [`BuildSystem`]; [`CMake`] drives the `cmake`
//! executable, and tests substitute their own implementation.

use crate::error::BuildError;
use crate::recipe::kitchen::toolchain::TOOLCHAIN_FILE;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Result type for build system steps
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Everything a build system needs to know about one cook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Folder containing the top-level CMakeLists.txt
    pub source_dir: PathBuf,
    /// Working directory for every step
    pub build_dir: PathBuf,
    /// Folder holding the generated descriptors
    pub generator_dir: PathBuf,
    /// Install prefix for the package stage
    pub package_dir: PathBuf,
    pub build_type: String,
    pub jobs: u32,
}

impl BuildContext {
    /// Path of the generated toolchain descriptor
    pub fn toolchain_file(&self) -> PathBuf {
        self.generator_dir.join(TOOLCHAIN_FILE)
    }
}

/// Captured output of one build system step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Trait for the native build system driven by the Kitchen
///
/// Each step runs once; implementations must not retry.
pub trait BuildSystem: Send + Sync {
    /// Generate the native build tree in `ctx.build_dir`
    fn configure(&self, ctx: &BuildContext) -> BuildResult<StepOutput>;

    /// Compile the configured build tree
    fn build(&self, ctx: &BuildContext) -> BuildResult<StepOutput>;

    /// Install build outputs into `ctx.package_dir`
    fn install(&self, ctx: &BuildContext) -> BuildResult<StepOutput>;
}

/// CMake, invoked as an external process
#[derive(Debug, Clone)]
pub struct CMake {
    program: PathBuf,
    generator: Option<String>,
}

impl CMake {
    /// Use a specific cmake executable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            generator: None,
        }
    }

    /// Use the given executable, or find `cmake` on PATH
    ///
    /// A bare program name is searched on PATH too. Steps run inside the
    /// build folder, so a relative path is made absolute first.
    pub fn locate(program: Option<&Path>) -> BuildResult<Self> {
        match program {
            Some(path) if path.components().count() > 1 => std::path::absolute(path)
                .map(Self::new)
                .map_err(|e| BuildError::ToolNotFound(format!("{}: {}", path.display(), e))),
            Some(name) => which::which(name)
                .map(Self::new)
                .map_err(|e| BuildError::ToolNotFound(format!("{}: {}", name.display(), e))),
            None => which::which("cmake")
                .map(Self::new)
                .map_err(|e| BuildError::ToolNotFound(format!("cmake: {}", e))),
        }
    }

    /// Select a CMake generator (`-G`)
    pub fn with_generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    /// The cmake executable in use
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for the configure step
    pub fn configure_args(&self, ctx: &BuildContext) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-S".into(),
            ctx.source_dir.clone().into(),
            "-B".into(),
            ctx.build_dir.clone().into(),
        ];

        if let Some(generator) = &self.generator {
            args.push("-G".into());
            args.push(generator.into());
        }

        let mut toolchain = OsString::from("-DCMAKE_TOOLCHAIN_FILE=");
        toolchain.push(ctx.toolchain_file());
        args.push(toolchain);
        args.push(format!("-DCMAKE_BUILD_TYPE={}", ctx.build_type).into());

        args
    }

    /// Arguments for the build step
    pub fn build_args(&self, ctx: &BuildContext) -> Vec<OsString> {
        vec![
            "--build".into(),
            ctx.build_dir.clone().into(),
            "--config".into(),
            ctx.build_type.clone().into(),
            "--parallel".into(),
            ctx.jobs.max(1).to_string().into(),
        ]
    }

    /// Arguments for the install step
    pub fn install_args(&self, ctx: &BuildContext) -> Vec<OsString> {
        vec![
            "--install".into(),
            ctx.build_dir.clone().into(),
            "--config".into(),
            ctx.build_type.clone().into(),
            "--prefix".into(),
            ctx.package_dir.clone().into(),
        ]
    }

    fn run(&self, stage: &'static str, args: &[OsString], workdir: &Path) -> BuildResult<StepOutput> {
        info!("Running {} phase", stage);
        debug!("Command: {} {:?}", self.program.display(), args);

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(workdir)
            .output()
            .map_err(|source| BuildError::Spawn { stage, source })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(BuildError::Failed {
                stage,
                code: output.status.code(),
                stderr,
            });
        }

        Ok(StepOutput { stdout, stderr })
    }
}

impl BuildSystem for CMake {
    fn configure(&self, ctx: &BuildContext) -> BuildResult<StepOutput> {
        self.run("configure", &self.configure_args(ctx), &ctx.build_dir)
    }

    fn build(&self, ctx: &BuildContext) -> BuildResult<StepOutput> {
        self.run("build", &self.build_args(ctx), &ctx.build_dir)
    }

    fn install(&self, ctx: &BuildContext) -> BuildResult<StepOutput> {
        self.run("install", &self.install_args(ctx), &ctx.build_dir)
    }
}

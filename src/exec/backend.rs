// src/exec/backend.rs

//! Pluggable stylesheet tool abstraction.
//!
//! The stylesheet engine talks to a [`StylesheetCompiler`] and a chain of
//! [`CssTransform`]s instead of spawning processes itself. Production uses the
//! command-backed implementations in [`super::command`]; tests plug in fakes
//! that never leave the process.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use crate::config::ConfigFile;
use crate::errors::Result;

use super::command::{CommandCompiler, CommandTransform};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Turns one stylesheet source into CSS.
pub trait StylesheetCompiler: Send + Sync {
    /// Compile `input`, resolving imports against `include_paths` in order.
    ///
    /// Failures should be reported as `PipelineError::Compile`.
    fn compile<'a>(
        &'a self,
        input: &'a Path,
        include_paths: &'a [PathBuf],
    ) -> BoxFuture<'a, Result<String>>;
}

/// One post-processing step over compiled CSS.
pub trait CssTransform: Send + Sync {
    /// Short name used in logs and `PipelineError::Transform`.
    fn name(&self) -> &str;

    /// Transform `css`, which currently lives at `output` in the build tree.
    fn apply<'a>(&'a self, css: String, output: &'a Path) -> BoxFuture<'a, Result<String>>;
}

/// The compiler plus its transform chain, shared by every stylesheet pass.
#[derive(Clone)]
pub struct Toolchain {
    pub compiler: Arc<dyn StylesheetCompiler>,
    pub transforms: Vec<Arc<dyn CssTransform>>,
}

impl std::fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.transforms.iter().map(|t| t.name()).collect();
        f.debug_struct("Toolchain")
            .field("transforms", &names)
            .finish_non_exhaustive()
    }
}

impl Toolchain {
    pub fn new(
        compiler: Arc<dyn StylesheetCompiler>,
        transforms: Vec<Arc<dyn CssTransform>>,
    ) -> Self {
        Self {
            compiler,
            transforms,
        }
    }

    /// External commands as configured in `[stylesheets]`.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let compiler: Arc<dyn StylesheetCompiler> =
            Arc::new(CommandCompiler::new(cfg.stylesheets.compiler.clone()));
        let transforms = cfg
            .stylesheets
            .transforms
            .iter()
            .map(|argv| Arc::new(CommandTransform::new(argv.clone())) as Arc<dyn CssTransform>)
            .collect();
        Self::new(compiler, transforms)
    }
}

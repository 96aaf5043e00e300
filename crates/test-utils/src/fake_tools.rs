use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assetpipe::engine::TaskRunner;
use assetpipe::errors::{PipelineError, Result};
use assetpipe::exec::{BoxFuture, CssTransform, StylesheetCompiler, Toolchain};
use assetpipe::types::TaskName;

/// Marker that makes [`FakeCompiler`] fail on a source file.
pub const COMPILE_FAIL_MARKER: &str = "@fail-compile";

/// Marker that makes [`MarkerTransform`] fail on compiled CSS.
pub const TRANSFORM_FAIL_MARKER: &str = "@fail-transform";

/// A compiler that:
/// - records every input and the include paths it was given
/// - fails when the source contains [`COMPILE_FAIL_MARKER`]
/// - otherwise returns `/* compiled */` followed by the source text.
#[derive(Debug, Clone, Default)]
pub struct FakeCompiler {
    pub calls: Arc<Mutex<Vec<(PathBuf, Vec<PathBuf>)>>>,
}

impl FakeCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compiled_inputs(&self) -> Vec<PathBuf> {
        let mut inputs: Vec<PathBuf> = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(input, _)| input.clone())
            .collect();
        inputs.sort();
        inputs
    }
}

impl StylesheetCompiler for FakeCompiler {
    fn compile<'a>(
        &'a self,
        input: &'a Path,
        include_paths: &'a [PathBuf],
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((input.to_path_buf(), include_paths.to_vec()));

            let source = tokio::fs::read_to_string(input).await?;
            if source.contains(COMPILE_FAIL_MARKER) {
                return Err(PipelineError::Compile {
                    path: input.to_path_buf(),
                    message: "syntax error".to_string(),
                });
            }
            Ok(format!("/* compiled */\n{source}"))
        })
    }
}

/// A transform that appends `/* <name> */` and fails on
/// [`TRANSFORM_FAIL_MARKER`].
///
/// It also checks that the CSS it is handed is exactly what is on disk at
/// `output`, i.e. that it runs on the raw output already written.
#[derive(Debug, Clone)]
pub struct MarkerTransform {
    name: String,
}

impl MarkerTransform {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl CssTransform for MarkerTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply<'a>(&'a self, css: String, output: &'a Path) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            if css.contains(TRANSFORM_FAIL_MARKER) {
                return Err(PipelineError::Transform {
                    path: output.to_path_buf(),
                    step: self.name.clone(),
                    message: "plugin error".to_string(),
                });
            }
            if !output.is_file() {
                return Err(PipelineError::Transform {
                    path: output.to_path_buf(),
                    step: self.name.clone(),
                    message: "raw output was not written before transforming".to_string(),
                });
            }
            Ok(format!("{css}/* {} */\n", self.name))
        })
    }
}

/// Fake compiler + the given transform names.
pub fn fake_toolchain(transforms: &[&str]) -> (Toolchain, FakeCompiler) {
    let compiler = FakeCompiler::new();
    let transforms = transforms
        .iter()
        .map(|name| Arc::new(MarkerTransform::new(name)) as Arc<dyn CssTransform>)
        .collect();
    (Toolchain::new(Arc::new(compiler.clone()), transforms), compiler)
}

/// A task runner that counts runs per task and can simulate slow tasks.
#[derive(Debug, Clone, Default)]
pub struct CountingRunner {
    runs: Arc<Mutex<HashMap<TaskName, usize>>>,
    delay: Duration,
}

impl CountingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn runs(&self, task: TaskName) -> usize {
        self.runs.lock().unwrap().get(&task).copied().unwrap_or(0)
    }
}

impl TaskRunner for CountingRunner {
    fn run_task(&self, task: TaskName) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            *self.runs.lock().unwrap().entry(task).or_default() += 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        })
    }
}

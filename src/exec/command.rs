// src/exec/command.rs

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::{PipelineError, Result};
use crate::exec::backend::{BoxFuture, CssTransform, StylesheetCompiler};

const INPUT: &str = "{input}";
const INCLUDE_PATH: &str = "{include_path}";
const OUTPUT: &str = "{output}";

/// Compiler that runs an external program and reads CSS from its stdout.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    argv: Vec<String>,
}

impl CommandCompiler {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// Expand `{input}` and `{include_path}` placeholders.
    pub fn expand_args(&self, input: &Path, include_paths: &[PathBuf]) -> Vec<String> {
        let input = input.to_string_lossy();
        let mut args = Vec::with_capacity(self.argv.len() + include_paths.len());
        for arg in &self.argv {
            if arg.contains(INCLUDE_PATH) {
                for inc in include_paths {
                    args.push(
                        arg.replace(INCLUDE_PATH, &inc.to_string_lossy())
                            .replace(INPUT, &input),
                    );
                }
            } else {
                args.push(arg.replace(INPUT, &input));
            }
        }
        args
    }
}

impl StylesheetCompiler for CommandCompiler {
    fn compile<'a>(
        &'a self,
        input: &'a Path,
        include_paths: &'a [PathBuf],
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let args = self.expand_args(input, include_paths);
            run_filter(&args, None).await.map_err(|message| PipelineError::Compile {
                path: input.to_path_buf(),
                message,
            })
        })
    }
}

/// Transform step that pipes CSS through an external program.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    argv: Vec<String>,
}

impl CommandTransform {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl CssTransform for CommandTransform {
    fn name(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("transform")
    }

    fn apply<'a>(&'a self, css: String, output: &'a Path) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let out = output.to_string_lossy();
            let args: Vec<String> = self.argv.iter().map(|a| a.replace(OUTPUT, &out)).collect();
            run_filter(&args, Some(css))
                .await
                .map_err(|message| PipelineError::Transform {
                    path: output.to_path_buf(),
                    step: self.name().to_string(),
                    message,
                })
        })
    }
}

/// Run `args[0] args[1..]`, optionally feeding `stdin`, and return stdout.
///
/// Any failure (spawn, non-zero exit, non UTF-8 output) is flattened into a
/// message; callers wrap it into the error variant for their stage.
async fn run_filter(args: &[String], stdin: Option<String>) -> std::result::Result<String, String> {
    let Some((program, rest)) = args.split_first() else {
        return Err("empty command".to_string());
    };

    debug!(program = %program, args = ?rest, "running external tool");

    let mut cmd = Command::new(program);
    cmd.args(rest)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| format!("spawning '{program}': {e}"))?;

    // Feed stdin from its own task so a tool that writes before it finishes
    // reading cannot deadlock against us.
    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        let program = program.clone();
        tokio::spawn(async move {
            if let Err(err) = pipe.write_all(input.as_bytes()).await {
                warn!(program = %program, error = %err, "failed to write stdin");
            }
        });
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| format!("waiting for '{program}': {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let code = output.status.code().unwrap_or(-1);
        return Err(if stderr.is_empty() {
            format!("'{program}' exited with code {code}")
        } else {
            format!("'{program}' exited with code {code}: {stderr}")
        });
    }

    String::from_utf8(output.stdout).map_err(|_| format!("'{program}' produced non UTF-8 output"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_path_argument_is_repeated_per_path() {
        let compiler = CommandCompiler::new(vec![
            "sass".into(),
            "--no-source-map".into(),
            "--load-path={include_path}".into(),
            "{input}".into(),
        ]);

        let args = compiler.expand_args(
            Path::new("src/css/site.scss"),
            &[PathBuf::from("src"), PathBuf::from("vendor")],
        );

        assert_eq!(
            args,
            vec![
                "sass",
                "--no-source-map",
                "--load-path=src",
                "--load-path=vendor",
                "src/css/site.scss",
            ]
        );
    }

    #[test]
    fn transform_name_is_program() {
        let t = CommandTransform::new(vec!["postcss".into(), "--no-map".into()]);
        assert_eq!(t.name(), "postcss");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn transform_pipes_stdin_to_stdout() {
        let t = CommandTransform::new(vec!["cat".into()]);
        let css = t
            .apply("a { color: red; }".to_string(), Path::new("build/a.css"))
            .await
            .unwrap();
        assert_eq!(css, "a { color: red; }");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_compiler_reports_compile_error() {
        let compiler = CommandCompiler::new(vec!["false".into(), "{input}".into()]);
        let err = compiler
            .compile(Path::new("src/a.scss"), &[])
            .await
            .unwrap_err();
        match err {
            PipelineError::Compile { path, message } => {
                assert_eq!(path, PathBuf::from("src/a.scss"));
                assert!(message.contains("exited with code"));
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_compile_error() {
        let compiler =
            CommandCompiler::new(vec!["assetpipe-no-such-compiler".into(), "{input}".into()]);
        let err = compiler.compile(Path::new("a.scss"), &[]).await.unwrap_err();
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("spawning"));
    }
}

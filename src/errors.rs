// src/errors.rs

//! Crate-wide error type.
//!
//! Two families live here:
//! - fatal errors (config, IO, copy, clean) abort the current task and the
//!   `all` pipeline;
//! - per-file stylesheet errors (`Compile`, `Transform`) are recorded in the
//!   compile report and logged, never propagated with `?` out of a batch.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        source: globset::Error,
    },

    #[error("failed to copy {from:?} -> {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove build tree {path:?}: {source}")]
    Clean {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to compile {path:?}: {message}")]
    Compile { path: PathBuf, message: String },

    #[error("transform '{step}' failed on {path:?}: {message}")]
    Transform {
        path: PathBuf,
        step: String,
        message: String,
    },

    #[error("file watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Per-file stylesheet errors are isolated; everything else stops the
    /// current task.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PipelineError::Compile { .. } | PipelineError::Transform { .. }
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_errors_are_not_fatal() {
        let compile = PipelineError::Compile {
            path: PathBuf::from("a.scss"),
            message: "boom".into(),
        };
        let transform = PipelineError::Transform {
            path: PathBuf::from("a.css"),
            step: "postcss".into(),
            message: "boom".into(),
        };
        assert!(!compile.is_fatal());
        assert!(!transform.is_fatal());
    }

    #[test]
    fn io_and_copy_errors_are_fatal() {
        let copy = PipelineError::Copy {
            from: PathBuf::from("src/a"),
            to: PathBuf::from("build/a"),
            source: std::io::Error::other("disk full"),
        };
        assert!(copy.is_fatal());
        assert!(PipelineError::ConfigError("bad".into()).is_fatal());
    }
}

// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PipelineError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PipelineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_roots(&cfg.paths.src, &cfg.paths.build)?;
    validate_patterns(cfg)?;
    validate_tools(cfg)?;
    validate_limits(cfg)?;
    Ok(())
}

/// The build tree is wiped by `clean`, so it must never overlap the sources.
fn validate_roots(src: &Path, build: &Path) -> Result<()> {
    if src.as_os_str().is_empty() || build.as_os_str().is_empty() {
        return Err(PipelineError::ConfigError(
            "[paths].src and [paths].build must not be empty".to_string(),
        ));
    }

    let src_norm = normalize(src);
    let build_norm = normalize(build);

    if src_norm == build_norm {
        return Err(PipelineError::ConfigError(format!(
            "[paths].build ({}) must differ from [paths].src",
            build.display()
        )));
    }
    if build_norm.starts_with(&src_norm) {
        return Err(PipelineError::ConfigError(format!(
            "[paths].build ({}) must not live inside [paths].src ({})",
            build.display(),
            src.display()
        )));
    }
    if src_norm.starts_with(&build_norm) {
        return Err(PipelineError::ConfigError(format!(
            "[paths].src ({}) must not live inside [paths].build ({})",
            src.display(),
            build.display()
        )));
    }
    Ok(())
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    let all = cfg
        .files
        .include
        .iter()
        .chain(cfg.files.exclude.iter())
        .chain(cfg.stylesheets.include.iter())
        .chain(cfg.stylesheets.exclude.iter())
        .chain(cfg.stylesheets.prerequisites.iter());

    for pattern in all {
        Glob::new(pattern).map_err(|source| PipelineError::Glob {
            pattern: pattern.clone(),
            source,
        })?;
    }

    if cfg.files.include.is_empty() {
        return Err(PipelineError::ConfigError(
            "[files].include must contain at least one pattern".to_string(),
        ));
    }
    if cfg.stylesheets.include.is_empty() {
        return Err(PipelineError::ConfigError(
            "[stylesheets].include must contain at least one pattern".to_string(),
        ));
    }
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    let sheets = &cfg.stylesheets;

    if sheets.compiler.first().is_none_or(|prog| prog.trim().is_empty()) {
        return Err(PipelineError::ConfigError(
            "[stylesheets].compiler must name a program".to_string(),
        ));
    }
    if !sheets.compiler.iter().any(|arg| arg.contains("{input}")) {
        return Err(PipelineError::ConfigError(
            "[stylesheets].compiler must pass {input} to the compiler".to_string(),
        ));
    }

    for (idx, step) in sheets.transforms.iter().enumerate() {
        if step.first().is_none_or(|prog| prog.trim().is_empty()) {
            return Err(PipelineError::ConfigError(format!(
                "[stylesheets].transforms[{idx}] must name a program"
            )));
        }
    }

    let ext = sheets.output_extension.trim();
    if ext.is_empty() || ext.starts_with('.') || ext.contains('/') {
        return Err(PipelineError::ConfigError(format!(
            "[stylesheets].output_extension must be a bare extension like \"css\" (got {:?})",
            sheets.output_extension
        )));
    }
    Ok(())
}

const MAX_MTIME_RESOLUTION_MS: u64 = 60_000;

fn validate_limits(cfg: &RawConfigFile) -> Result<()> {
    if cfg.files.max_parallel_copies == 0 {
        return Err(PipelineError::ConfigError(
            "[files].max_parallel_copies must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.files.mtime_resolution_ms > MAX_MTIME_RESOLUTION_MS {
        return Err(PipelineError::ConfigError(format!(
            "[files].mtime_resolution_ms must be <= {MAX_MTIME_RESOLUTION_MS} (got {})",
            cfg.files.mtime_resolution_ms
        )));
    }
    if cfg.stylesheets.max_parallel_compiles == 0 {
        return Err(PipelineError::ConfigError(
            "[stylesheets].max_parallel_compiles must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Absolute, lexically normalized path. The build tree usually does not
/// exist yet, so `canonicalize` is not an option.
fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

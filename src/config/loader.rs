// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Command-line overrides applied on top of the file (or default) config.
///
/// Override paths are taken as given, i.e. relative to the working directory.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub src: Option<PathBuf>,
    pub build: Option<PathBuf>,
}

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** resolve relative
/// paths or validate anything. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file, resolve `[paths]` against the file's directory,
/// and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let mut raw = load_from_path(path)?;
    rebase_paths(&mut raw, &config_base_dir(path));
    ConfigFile::try_from(raw)
}

/// Entry point used by the CLI.
///
/// - explicit `--config` path: the file must exist;
/// - no `--config`: [`default_config_path`] is used when present, otherwise
///   the built-in defaults;
/// - `overrides` win over whatever the file says.
pub fn load_with_overrides(
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<ConfigFile> {
    let mut raw = match explicit {
        Some(path) => {
            let mut raw = load_from_path(path)?;
            rebase_paths(&mut raw, &config_base_dir(path));
            raw
        }
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = ?default_path, "using default config file");
                load_from_path(&default_path)?
            } else {
                debug!("no config file found, using built-in defaults");
                RawConfigFile::default()
            }
        }
    };

    if let Some(src) = &overrides.src {
        raw.paths.src = src.clone();
    }
    if let Some(build) = &overrides.build {
        raw.paths.build = build.clone();
    }

    ConfigFile::try_from(raw)
}

/// Helper to resolve a default config path.
///
/// `Assetpipe.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Assetpipe.toml")
}

/// Directory that relative paths inside a config file are resolved against.
///
/// A bare filename like `Assetpipe.toml` has an empty parent; that means the
/// working directory, so paths stay relative.
fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::new(),
    }
}

fn rebase_paths(raw: &mut RawConfigFile, base: &Path) {
    if base.as_os_str().is_empty() {
        return;
    }
    if raw.paths.src.is_relative() {
        raw.paths.src = base.join(&raw.paths.src);
    }
    if raw.paths.build.is_relative() {
        raw.paths.build = base.join(&raw.paths.build);
    }
    for include in raw.stylesheets.include_paths.iter_mut() {
        if include.is_relative() {
            *include = base.join(&*include);
        }
    }
}

// tests/config_loading.rs

use std::error::Error;
use std::path::PathBuf;

use assetpipe::config::{ConfigOverrides, load_and_validate, load_with_overrides};
use assetpipe::errors::PipelineError;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn relative_paths_resolve_against_the_config_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Assetpipe.toml");
    std::fs::write(
        &path,
        r#"
[paths]
src = "assets"
build = "public"

[files]
mtime_resolution_ms = 1000

[stylesheets]
include_paths = ["node_modules", "/opt/shared"]
transforms = []

[watch]
debounce_ms = 50
"#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.paths.src, dir.path().join("assets"));
    assert_eq!(cfg.paths.build, dir.path().join("public"));
    assert_eq!(
        cfg.stylesheets.include_paths,
        vec![dir.path().join("node_modules"), PathBuf::from("/opt/shared")]
    );
    assert!(cfg.stylesheets.transforms.is_empty());
    assert_eq!(cfg.watch.debounce_ms, 50);
    assert_eq!(cfg.files.mtime_resolution_ms, 1000);

    // Untouched sections keep their defaults.
    assert_eq!(cfg.stylesheets.output_extension, "css");
    assert!(cfg.files.exclude.iter().any(|p| p == "**/*.pyc"));
    Ok(())
}

#[test]
fn overrides_win_over_the_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pipeline.toml");
    std::fs::write(&path, "[paths]\nsrc = \"assets\"\nbuild = \"public\"\n")?;

    let overrides = ConfigOverrides {
        src: None,
        build: Some(dir.path().join("dist")),
    };
    let cfg = load_with_overrides(Some(&path), &overrides)?;

    assert_eq!(cfg.paths.src, dir.path().join("assets"));
    assert_eq!(cfg.paths.build, dir.path().join("dist"));
    Ok(())
}

#[test]
fn explicit_missing_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_with_overrides(
        Some(&dir.path().join("nope.toml")),
        &ConfigOverrides::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::IoError(_)));
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Assetpipe.toml");
    std::fs::write(&path, "[paths]\nsrcdir = \"assets\"\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, PipelineError::TomlError(_)));
    Ok(())
}

#[test]
fn nested_roots_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Assetpipe.toml");
    std::fs::write(&path, "[paths]\nsrc = \"site\"\nbuild = \"site/build\"\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, PipelineError::ConfigError(_)));
    Ok(())
}

#[test]
fn bad_glob_is_reported_with_its_pattern() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Assetpipe.toml");
    std::fs::write(&path, "[files]\ninclude = [\"**/[\"]\n")?;

    match load_and_validate(&path).unwrap_err() {
        PipelineError::Glob { pattern, .. } => assert_eq!(pattern, "**/["),
        other => panic!("expected glob error, got {other:?}"),
    }
    Ok(())
}

// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [paths]
/// src = "src"
/// build = "build"
///
/// [files]
/// include = ["**/*", "**/.env"]
/// exclude = ["**/*.pyc"]
///
/// [stylesheets]
/// include = ["**/*.scss"]
/// compiler = ["sass", "--no-source-map", "--load-path={include_path}", "{input}"]
/// transforms = [["postcss", "--no-map"]]
///
/// [watch]
/// debounce_ms = 200
/// ```
///
/// Every section is optional; a missing file yields `RawConfigFile::default()`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub files: FilesSection,

    #[serde(default)]
    pub stylesheets: StylesheetsSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`
/// (see `config::validate`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: PathsSection,
    pub files: FilesSection,
    pub stylesheets: StylesheetsSection,
    pub watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            paths: raw.paths,
            files: raw.files,
            stylesheets: raw.stylesheets,
            watch: raw.watch,
        }
    }
}

/// `[paths]` section: the two tree roots.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsSection {
    /// Source tree root. Relative paths are resolved against the config
    /// file's directory.
    #[serde(default = "default_src")]
    pub src: PathBuf,

    /// Build tree root. Everything under it is disposable.
    #[serde(default = "default_build")]
    pub build: PathBuf,
}

fn default_src() -> PathBuf {
    PathBuf::from("src")
}

fn default_build() -> PathBuf {
    PathBuf::from("build")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            build: default_build(),
        }
    }
}

/// `[files]` section: which files are copied verbatim.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesSection {
    #[serde(default = "default_files_include")]
    pub include: Vec<String>,

    /// Stylesheet patterns are appended to this list when the classifier is
    /// built, so there is no need to repeat them here.
    #[serde(default = "default_files_exclude")]
    pub exclude: Vec<String>,

    /// When false, dot-prefixed paths are only matched by include patterns
    /// that spell out a dot-prefixed segment (e.g. `**/.env`).
    #[serde(default)]
    pub dotfiles: bool,

    #[serde(default = "default_max_parallel_copies")]
    pub max_parallel_copies: usize,

    /// Timestamp granularity of the source filesystem, in milliseconds.
    ///
    /// `0` trusts mtimes to be exact. Set it to `1000` (or `2000` for FAT) on
    /// filesystems that store whole seconds; the boundary step is then
    /// re-examined on the next pass instead of being skipped.
    #[serde(default)]
    pub mtime_resolution_ms: u64,
}

fn default_files_include() -> Vec<String> {
    vec!["**/*".to_string(), "**/.env".to_string()]
}

fn default_files_exclude() -> Vec<String> {
    vec!["**/*.pyc".to_string()]
}

fn default_max_parallel_copies() -> usize {
    8
}

impl Default for FilesSection {
    fn default() -> Self {
        Self {
            include: default_files_include(),
            exclude: default_files_exclude(),
            dotfiles: false,
            max_parallel_copies: default_max_parallel_copies(),
            mtime_resolution_ms: 0,
        }
    }
}

/// `[stylesheets]` section: what gets compiled, and with which tools.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StylesheetsSection {
    #[serde(default = "default_stylesheets_include")]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Extra patterns that re-trigger compilation in watch mode (templates
    /// that may influence compiled output).
    #[serde(default = "default_prerequisites")]
    pub prerequisites: Vec<String>,

    /// Extension given to compiled output, without the leading dot.
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Additional import roots. The source root is always searched first.
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    /// Compiler argv. `{input}` is the stylesheet path, an argument containing
    /// `{include_path}` is repeated once per include path. CSS is read from
    /// the compiler's stdout.
    #[serde(default = "default_compiler")]
    pub compiler: Vec<String>,

    /// Post-processing chain. Each entry is an argv that reads CSS on stdin
    /// and writes CSS on stdout; `{output}` expands to the output path.
    #[serde(default = "default_transforms")]
    pub transforms: Vec<Vec<String>>,

    #[serde(default = "default_max_parallel_compiles")]
    pub max_parallel_compiles: usize,
}

fn default_stylesheets_include() -> Vec<String> {
    vec!["**/*.scss".to_string()]
}

fn default_prerequisites() -> Vec<String> {
    vec!["**/*.html".to_string(), "**/*.html-src".to_string()]
}

fn default_output_extension() -> String {
    "css".to_string()
}

fn default_compiler() -> Vec<String> {
    vec![
        "sass".to_string(),
        "--no-source-map".to_string(),
        "--load-path={include_path}".to_string(),
        "{input}".to_string(),
    ]
}

fn default_transforms() -> Vec<Vec<String>> {
    vec![vec!["postcss".to_string(), "--no-map".to_string()]]
}

fn default_max_parallel_compiles() -> usize {
    4
}

impl Default for StylesheetsSection {
    fn default() -> Self {
        Self {
            include: default_stylesheets_include(),
            exclude: Vec::new(),
            prerequisites: default_prerequisites(),
            output_extension: default_output_extension(),
            include_paths: Vec::new(),
            compiler: default_compiler(),
            transforms: default_transforms(),
            max_parallel_compiles: default_max_parallel_compiles(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Quiet period after the last matching event before a task is run.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    200
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

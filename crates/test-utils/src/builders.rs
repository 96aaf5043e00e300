#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use assetpipe::config::{ConfigFile, RawConfigFile};
use tempfile::TempDir;

/// A temporary project with `src/` and `build/` side by side.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(dir.path().join("src")).expect("create src dir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn src(&self) -> PathBuf {
        self.root().join("src")
    }

    pub fn build(&self) -> PathBuf {
        self.root().join("build")
    }

    /// Write `contents` to `src/<rel>`, creating parents.
    pub fn write_src(&self, rel: &str, contents: &str) -> PathBuf {
        write(&self.src().join(rel), contents)
    }

    /// Write `contents` to `build/<rel>`, creating parents.
    pub fn write_build(&self, rel: &str, contents: &str) -> PathBuf {
        write(&self.build().join(rel), contents)
    }

    /// Rewrite `src/<rel>` and push its mtime into the future so it is
    /// newer than any installer timestamp taken so far, regardless of the
    /// filesystem's timestamp granularity.
    pub fn touch_src(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.write_src(rel, contents);
        let future = SystemTime::now() + Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(&path)
            .and_then(|f| f.set_modified(future))
            .expect("set mtime");
        path
    }

    pub fn read_build(&self, rel: &str) -> String {
        fs::read_to_string(self.build().join(rel)).expect("read build file")
    }

    /// Every file under `build/`, relative, sorted.
    pub fn build_files(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect(&self.build(), &self.build(), &mut out);
        out.sort();
        out
    }

    /// Default config pointed at this project's trees.
    pub fn config(&self) -> ConfigFile {
        self.config_with(|_| {})
    }

    /// Default config, adjusted by `edit` before validation.
    pub fn config_with(&self, edit: impl FnOnce(&mut RawConfigFile)) -> ConfigFile {
        let mut raw = RawConfigFile::default();
        raw.paths.src = self.src();
        raw.paths.build = self.build();
        edit(&mut raw);
        ConfigFile::try_from(raw).expect("valid test config")
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

fn write(path: &Path, contents: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
    path.to_path_buf()
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, out);
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}

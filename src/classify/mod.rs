// src/classify/mod.rs

//! File classification.
//!
//! Splits the source tree into the two sets the pipeline works on:
//! - stylesheets, compiled by [`crate::engine::stylesheets`];
//! - static files, copied verbatim by [`crate::engine::installer`].
//!
//! Everything else is excluded. Classification is a pure function of the
//! relative path and the configured patterns.

pub mod globs;
pub mod walker;

use std::path::Path;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::types::Classification;

pub use globs::{GlobFilter, GlobSpec};
pub use walker::{SourceFile, relative_slash_path, walk_files};

/// Compiled static + stylesheet filters.
#[derive(Debug, Clone)]
pub struct Classifier {
    stylesheets: GlobFilter,
    statics: GlobFilter,
}

impl Classifier {
    /// Build a classifier from the two specs.
    ///
    /// Stylesheet include patterns are appended to the static excludes, so a
    /// path can never be in both sets even if `classify` is bypassed and
    /// [`Classifier::static_filter`] is used on its own (as the watcher does).
    pub fn new(statics: &GlobSpec, stylesheets: &GlobSpec) -> Result<Self> {
        let mut statics = statics.clone();
        statics
            .exclude
            .extend(stylesheets.include.iter().cloned());

        Ok(Self {
            stylesheets: GlobFilter::new(stylesheets)?,
            statics: GlobFilter::new(&statics)?,
        })
    }

    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Self::new(&static_spec(cfg), &stylesheet_spec(cfg))
    }

    pub fn classify(&self, rel_path: &str) -> Classification {
        if self.stylesheets.matches(rel_path) {
            Classification::Stylesheet
        } else if self.statics.matches(rel_path) {
            Classification::Static
        } else {
            Classification::Excluded
        }
    }

    pub fn static_filter(&self) -> &GlobFilter {
        &self.statics
    }

    pub fn stylesheet_filter(&self) -> &GlobFilter {
        &self.stylesheets
    }

    /// Walk `root` and bucket every file.
    pub fn scan(&self, root: &Path) -> Result<ClassifiedTree> {
        let mut tree = ClassifiedTree::default();
        for file in walk_files(root)? {
            match self.classify(&file.rel) {
                Classification::Stylesheet => tree.stylesheets.push(file),
                Classification::Static => tree.statics.push(file),
                Classification::Excluded => tree.excluded.push(file),
            }
        }
        Ok(tree)
    }
}

/// Result of [`Classifier::scan`]; each list is sorted by relative path.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedTree {
    pub statics: Vec<SourceFile>,
    pub stylesheets: Vec<SourceFile>,
    pub excluded: Vec<SourceFile>,
}

pub fn static_spec(cfg: &ConfigFile) -> GlobSpec {
    GlobSpec {
        include: cfg.files.include.clone(),
        exclude: cfg.files.exclude.clone(),
        dotfiles: cfg.files.dotfiles,
    }
}

pub fn stylesheet_spec(cfg: &ConfigFile) -> GlobSpec {
    GlobSpec {
        include: cfg.stylesheets.include.clone(),
        exclude: cfg.stylesheets.exclude.clone(),
        dotfiles: cfg.files.dotfiles,
    }
}

/// Patterns that re-trigger stylesheet compilation in watch mode: the
/// stylesheet set plus markup templates.
pub fn stylesheet_prerequisite_spec(cfg: &ConfigFile) -> GlobSpec {
    let mut include = cfg.stylesheets.prerequisites.clone();
    include.extend(cfg.stylesheets.include.iter().cloned());
    GlobSpec {
        include,
        exclude: cfg.stylesheets.exclude.clone(),
        dotfiles: cfg.files.dotfiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;

    fn default_classifier() -> Classifier {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        Classifier::from_config(&cfg).unwrap()
    }

    #[test]
    fn default_patterns_partition_the_tree() {
        let c = default_classifier();

        assert_eq!(c.classify("css/site.scss"), Classification::Stylesheet);
        assert_eq!(c.classify("css/_mixins.scss"), Classification::Stylesheet);
        assert_eq!(c.classify("site.scss"), Classification::Stylesheet);

        assert_eq!(c.classify("templates/index.html"), Classification::Static);
        assert_eq!(c.classify("app/views.py"), Classification::Static);
        assert_eq!(c.classify(".env"), Classification::Static);
        assert_eq!(c.classify("deploy/.env"), Classification::Static);

        assert_eq!(c.classify("app/views.pyc"), Classification::Excluded);
        assert_eq!(c.classify(".gitignore"), Classification::Excluded);
    }

    #[test]
    fn static_filter_alone_never_matches_stylesheets() {
        let c = default_classifier();
        assert!(!c.static_filter().matches("css/site.scss"));
        assert!(c.stylesheet_filter().matches("css/site.scss"));
    }

    #[test]
    fn prerequisites_cover_templates_and_stylesheets() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        let prereqs = GlobFilter::new(&stylesheet_prerequisite_spec(&cfg)).unwrap();
        assert!(prereqs.matches("templates/base.html"));
        assert!(prereqs.matches("templates/base.html-src"));
        assert!(prereqs.matches("css/_vars.scss"));
        assert!(!prereqs.matches("app/views.py"));
    }

    #[test]
    fn scan_buckets_every_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("css")).unwrap();
        std::fs::write(root.join("css/site.scss"), "a{}").unwrap();
        std::fs::write(root.join("index.html"), "<p>").unwrap();
        std::fs::write(root.join("cache.pyc"), "x").unwrap();

        let tree = default_classifier().scan(root).unwrap();

        assert_eq!(tree.stylesheets.len(), 1);
        assert_eq!(tree.statics.len(), 1);
        assert_eq!(tree.statics[0].rel, "index.html");
        assert_eq!(tree.excluded.len(), 1);
    }
}

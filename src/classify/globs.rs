// src/classify/globs.rs

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::{PipelineError, Result};

/// Include/exclude pattern pair, evaluated as include-minus-exclude.
///
/// Patterns are relative to the source root and use forward slashes, e.g.
/// `**/*.scss`. An exclude always wins over an include, whatever order the
/// patterns were written in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobSpec {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Let wildcards match dot-prefixed path components.
    pub dotfiles: bool,
}

impl GlobSpec {
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
            dotfiles: false,
        }
    }

    pub fn with_dotfiles(mut self, dotfiles: bool) -> Self {
        self.dotfiles = dotfiles;
        self
    }
}

/// Compiled form of a [`GlobSpec`].
///
/// With `dotfiles = false`, a path that has a dot-prefixed component (such as
/// `.env` or `.cache/x.js`) only counts as included when an include pattern
/// spells out a dot-prefixed segment itself (`**/.env`). Excludes are applied
/// to every path.
#[derive(Clone)]
pub struct GlobFilter {
    include: GlobSet,
    dot_include: Option<GlobSet>,
    exclude: Option<GlobSet>,
    dotfiles: bool,
}

impl fmt::Debug for GlobFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobFilter")
            .field("dotfiles", &self.dotfiles)
            .finish_non_exhaustive()
    }
}

impl GlobFilter {
    pub fn new(spec: &GlobSpec) -> Result<Self> {
        let include = build_globset(spec.include.iter())?;

        let dot_patterns: Vec<&String> = spec
            .include
            .iter()
            .filter(|p| names_dot_segment(p))
            .collect();
        let dot_include = if dot_patterns.is_empty() {
            None
        } else {
            Some(build_globset(dot_patterns.into_iter())?)
        };

        let exclude = if spec.exclude.is_empty() {
            None
        } else {
            Some(build_globset(spec.exclude.iter())?)
        };

        Ok(Self {
            include,
            dot_include,
            exclude,
            dotfiles: spec.dotfiles,
        })
    }

    /// Returns true if `rel_path` (relative to the source root, forward
    /// slashes) is included and not excluded.
    pub fn matches(&self, rel_path: &str) -> bool {
        let included = if !self.dotfiles && has_dot_component(rel_path) {
            self.dot_include
                .as_ref()
                .is_some_and(|set| set.is_match(rel_path))
        } else {
            self.include.is_match(rel_path)
        };

        if !included {
            return false;
        }

        !self
            .exclude
            .as_ref()
            .is_some_and(|set| set.is_match(rel_path))
    }
}

fn names_dot_segment(pattern: &str) -> bool {
    pattern.split('/').any(|seg| seg.starts_with('.'))
}

fn has_dot_component(rel_path: &str) -> bool {
    rel_path
        .split('/')
        .any(|seg| seg.starts_with('.') && seg != "." && seg != "..")
}

fn build_globset<'a>(patterns: impl Iterator<Item = &'a String>) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|source| PipelineError::Glob {
            pattern: pat.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| PipelineError::Glob {
        pattern: "<set>".to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(include: &[&str], exclude: &[&str]) -> GlobFilter {
        GlobFilter::new(&GlobSpec::new(include.iter().copied(), exclude.iter().copied()))
            .unwrap()
    }

    #[test]
    fn exclude_wins_over_include() {
        let f = filter(&["**/*"], &["**/*.pyc"]);
        assert!(f.matches("app/views.py"));
        assert!(!f.matches("app/views.pyc"));
        assert!(!f.matches("views.pyc"));
    }

    #[test]
    fn exclude_declared_for_same_pattern_still_excludes() {
        let f = filter(&["**/*.scss"], &["**/*.scss"]);
        assert!(!f.matches("style.scss"));
    }

    #[test]
    fn dotfiles_need_explicit_pattern() {
        let f = filter(&["**/*", "**/.env"], &[]);
        assert!(f.matches(".env"));
        assert!(f.matches("conf/.env"));
        assert!(!f.matches(".gitignore"));
        assert!(!f.matches(".cache/bundle.js"));
    }

    #[test]
    fn dotfiles_flag_opens_wildcards() {
        let spec = GlobSpec::new(["**/*"], Vec::<String>::new()).with_dotfiles(true);
        let f = GlobFilter::new(&spec).unwrap();
        assert!(f.matches(".gitignore"));
        assert!(f.matches(".cache/bundle.js"));
    }

    #[test]
    fn excludes_apply_to_dotfiles() {
        let f = filter(&["**/.env"], &["secrets/**"]);
        assert!(f.matches("app/.env"));
        assert!(!f.matches("secrets/.env"));
    }

    #[test]
    fn invalid_pattern_reports_pattern() {
        let err = GlobFilter::new(&GlobSpec::new(["a/[b"], Vec::<String>::new())).unwrap_err();
        match err {
            PipelineError::Glob { pattern, .. } => assert_eq!(pattern, "a/[b"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

// src/types.rs

use std::fmt;

use clap::ValueEnum;

/// Named build tasks exposed on the command line.
///
/// - `Files`: copy static files once (incremental).
/// - `Stylesheets`: compile every stylesheet once.
/// - `Watch`: stay resident and re-run `files` / `stylesheets` on changes.
/// - `Clean`: remove the build tree.
/// - `All`: `clean`, then `files`, then `stylesheets`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum TaskName {
    Files,
    Stylesheets,
    Watch,
    Clean,
    All,
}

impl TaskName {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskName::Files => "files",
            TaskName::Stylesheets => "stylesheets",
            TaskName::Watch => "watch",
            TaskName::Clean => "clean",
            TaskName::All => "all",
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership of a source path, as decided by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Compiled through the stylesheet compiler.
    Stylesheet,
    /// Copied verbatim into the build tree.
    Static,
    /// Neither copied nor compiled.
    Excluded,
}

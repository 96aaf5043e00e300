// src/engine/mod.rs

//! Build engine for assetpipe.
//!
//! This module ties together:
//! - the cleaner (remove the build tree)
//! - the incremental static installer and its per-task state
//! - the stylesheet compile + transform pass
//! - the pipeline that sequences them for the `all` task and serves
//!   watch-triggered runs

pub mod cleaner;
pub mod installer;
pub mod pipeline;
pub mod state;
pub mod stylesheets;

pub use cleaner::Cleaner;
pub use installer::{InstallReport, Installer};
pub use pipeline::{Pipeline, PipelineReport, TaskRunner};
pub use state::{InstallState, InstallStates};
pub use stylesheets::{CompileReport, StylesheetEngine, StylesheetFailure, StylesheetStage};

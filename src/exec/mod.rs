// src/exec/mod.rs

//! External tool execution layer.
//!
//! - [`backend`] defines the traits the stylesheet engine depends on and the
//!   [`Toolchain`] bundle passed around at runtime.
//! - [`command`] implements them by spawning processes with
//!   `tokio::process::Command` (`sass`, `postcss`, ...).

pub mod backend;
pub mod command;

pub use backend::{BoxFuture, CssTransform, StylesheetCompiler, Toolchain};
pub use command::{CommandCompiler, CommandTransform};

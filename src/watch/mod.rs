// src/watch/mod.rs

//! File watching and change-driven rebuilds.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Routing changed paths to the task registrations interested in them.
//! - Debouncing bursts and serializing runs of the same task.
//!
//! It never triggers `clean`; the build tree is only wiped on request.

pub mod coordinator;
pub mod debounce;
pub mod path_utils;
pub mod watcher;

pub use coordinator::{Registration, WatchCoordinator, spawn_registration_worker};
pub use debounce::{DebounceState, Debouncer};
pub use watcher::{WatcherHandle, spawn_watcher};

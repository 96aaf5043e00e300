// src/engine/state.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use tokio::sync::Mutex as AsyncMutex;

use crate::types::TaskName;

/// Incremental state of the static installer.
///
/// `last_run` is `None` until a copy pass succeeds; files modified strictly
/// after it are copied by the next pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallState {
    last_run: Option<SystemTime>,
}

impl InstallState {
    /// "Copy everything" state.
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn completed_at(at: SystemTime) -> Self {
        Self { last_run: Some(at) }
    }

    pub fn last_run(&self) -> Option<SystemTime> {
        self.last_run
    }
}

/// One async mutex per task identity, each owning that task's state.
///
/// Holding the slot's guard for the whole pass is what serializes a manual
/// install against a watch-triggered one.
#[derive(Debug, Clone, Default)]
pub struct InstallStates {
    slots: Arc<Mutex<HashMap<TaskName, Arc<AsyncMutex<InstallState>>>>>,
}

impl InstallStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, task: TaskName) -> Arc<AsyncMutex<InstallState>> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.entry(task).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_timestamp() {
        assert_eq!(InstallState::fresh().last_run(), None);
    }

    #[tokio::test]
    async fn same_task_shares_one_slot() {
        let states = InstallStates::new();
        let a = states.slot(TaskName::Files);
        let b = states.slot(TaskName::Files);
        assert!(Arc::ptr_eq(&a, &b));

        let now = SystemTime::now();
        *a.lock().await = InstallState::completed_at(now);
        assert_eq!(b.lock().await.last_run(), Some(now));
    }

    #[test]
    fn different_tasks_get_different_slots() {
        let states = InstallStates::new();
        assert!(!Arc::ptr_eq(
            &states.slot(TaskName::Files),
            &states.slot(TaskName::All)
        ));
    }
}

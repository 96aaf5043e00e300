// src/watch/debounce.rs

use std::time::{Duration, Instant};

/// Per-registration debounce state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    /// At least one matching event arrived; fire once `deadline` passes
    /// without another one.
    Pending { deadline: Instant },
}

/// `Idle` → `Pending` on an event; each further event pushes the deadline
/// out; `poll` past the deadline fires once and returns to `Idle`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            state: DebounceState::Idle,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn on_event(&mut self, now: Instant) {
        self.state = DebounceState::Pending {
            deadline: now + self.quiet,
        };
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Idle => None,
            DebounceState::Pending { deadline } => Some(deadline),
        }
    }

    /// Returns true exactly once per burst, when the quiet period is over.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            DebounceState::Pending { deadline } if now >= deadline => {
                self.state = DebounceState::Idle;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_fires_once_after_quiet_period() {
        let start = Instant::now();
        let quiet = Duration::from_millis(100);
        let mut d = Debouncer::new(quiet);

        assert!(!d.poll(start));

        d.on_event(start);
        d.on_event(start + Duration::from_millis(50));
        d.on_event(start + Duration::from_millis(90));

        // Deadline moved with the last event.
        assert!(!d.poll(start + Duration::from_millis(150)));
        assert!(d.poll(start + Duration::from_millis(190)));
        assert_eq!(d.state(), DebounceState::Idle);
        assert!(!d.poll(start + Duration::from_millis(400)));
    }

    #[test]
    fn idle_has_no_deadline() {
        let d = Debouncer::new(Duration::from_millis(10));
        assert_eq!(d.deadline(), None);
    }
}

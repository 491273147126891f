//! Input debouncing.
//!
//! Every input event bumps the debouncer's tag and schedules a tick carrying
//! that tag. Only the tick whose tag is still current is accepted, so a
//! burst of input collapses into one search after the quiet interval. The
//! query is read from the input when the tick fires, not when it was
//! scheduled.

use std::time::Duration;

use domtea::{Cmd, Message, tick};

use crate::instance::InstanceId;

/// Tick fired when an instance's quiet interval elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceMsg {
    /// The instance that scheduled the tick.
    pub instance: InstanceId,
    tag: u64,
}

/// Per-instance debounce timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    tag: u64,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet interval.
    pub fn new(delay: Duration) -> Self {
        Self { delay, tag: 0 }
    }

    /// The quiet interval.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restarts the quiet interval, superseding any pending tick.
    pub fn trigger(&mut self, instance: InstanceId) -> Cmd {
        self.tag = self.tag.wrapping_add(1);
        let tag = self.tag;
        tick(self.delay, move || Message::new(DebounceMsg { instance, tag }))
    }

    /// Supersedes any pending tick without scheduling a new one.
    pub fn cancel(&mut self) {
        self.tag = self.tag.wrapping_add(1);
    }

    /// Returns true if `msg` is the latest tick of this debouncer.
    pub fn accept(&self, msg: &DebounceMsg) -> bool {
        msg.tag == self.tag
    }
}

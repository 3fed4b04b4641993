//! Console re-arm trigger.
//!
//! Polled once per tick by the triggered runner.  A received line arms one
//! breath cycle; its content is ignored beyond being non-empty.  While the
//! console stays quiet, a "waiting" notice goes out every
//! `idle_notice_ms`.

use crate::app::events::AppEvent;
use crate::app::ports::{ConsolePort, EventSink};
use crate::signals::BreathArm;

/// Result of one trigger poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPoll {
    /// A line arrived and breathing was armed.
    Armed,
    /// A line arrived but was empty.
    IgnoredEmpty,
    /// No input; the idle notice was emitted.
    IdleNotice,
    /// No input, notice not yet due.
    Quiet,
}

#[derive(Debug, Clone)]
pub struct LineTrigger {
    idle_notice_ms: u32,
    last_notice_ms: u32,
}

impl LineTrigger {
    pub fn new(idle_notice_ms: u32, now_ms: u32) -> Self {
        Self {
            idle_notice_ms,
            last_notice_ms: now_ms,
        }
    }

    pub fn poll(
        &mut self,
        console: &mut impl ConsolePort,
        now_ms: u32,
        arm: &BreathArm,
        sink: &mut impl EventSink,
    ) -> TriggerPoll {
        if console.line_available() {
            return match console.read_line() {
                Some(line) if !line.is_empty() => {
                    arm.arm();
                    sink.emit(&AppEvent::BreathArmed);
                    TriggerPoll::Armed
                }
                _ => TriggerPoll::IgnoredEmpty,
            };
        }

        if now_ms.wrapping_sub(self.last_notice_ms) > self.idle_notice_ms {
            self.last_notice_ms = now_ms;
            sink.emit(&AppEvent::AwaitingTrigger);
            return TriggerPoll::IdleNotice;
        }
        TriggerPoll::Quiet
    }
}

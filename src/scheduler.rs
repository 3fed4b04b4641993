//! Fixed-tick task scheduler for the triggered program.
//!
//! The triggered loop runs three independent tasks, each with its own
//! period.  The scheduler notifies a [`SchedulerDelegate`] when a task falls
//! due; the runner implements the delegate and owns the hardware.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Task table                            │
//! │                                                              │
//! │   ┌──────────────┐    ┌──────────────┐    ┌──────────────┐   │
//! │   │ TriggerPoll  │    │ Breath       │    │ Heartbeat    │   │
//! │   │ (console)    │    │ (servo)      │    │ (motor pin)  │   │
//! │   └──────┬───────┘    └──────┬───────┘    └──────┬───────┘   │
//! │          │ slot 0            │ slot 1            │ slot 2    │
//! │          ▼                   ▼                   ▼           │
//! │   ┌────────────────────────────────────────────────────────┐ │
//! │   │                 SchedulerDelegate                      │ │
//! │   │         (TriggeredRunner dispatches to tasks)          │ │
//! │   └────────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tasks run in slot order within a tick.  A task that blocks (the breath
//! cycle under `BreathScheduling::Blocking`) delays every task behind it;
//! the next tick then sees a large delta and fires each overdue task once,
//! with no catch-up bursts.

use crate::app::ports::{SchedulerDelegate, TaskKind};
use log::info;

/// Maximum number of tasks (stack-allocated).
const MAX_TASKS: usize = 4;

/// A task registration.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Human-readable label for logs.
    pub label: &'static str,
    pub kind: TaskKind,
    /// Fire every `period_ms`.
    pub period_ms: u32,
    pub enabled: bool,
}

/// Internal bookkeeping for a registered task.
#[derive(Debug, Clone)]
struct TaskEntry {
    spec: TaskSpec,
    /// Milliseconds accumulated since the task last fired.
    elapsed_ms: u32,
    runs: u64,
}

pub struct Scheduler {
    tasks: [Option<TaskEntry>; MAX_TASKS],
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: [None, None, None, None],
        }
    }

    /// Register a task.  Returns the slot index, or `None` if full.
    ///
    /// A new task is due on the first tick.
    pub fn add(&mut self, spec: TaskSpec) -> Option<usize> {
        for (i, slot) in self.tasks.iter_mut().enumerate() {
            if slot.is_none() {
                info!(
                    "Scheduler: added '{}' at slot {} (every {} ms)",
                    spec.label, i, spec.period_ms
                );
                let elapsed_ms = spec.period_ms;
                *slot = Some(TaskEntry {
                    spec,
                    elapsed_ms,
                    runs: 0,
                });
                return Some(i);
            }
        }
        None // All slots full.
    }

    /// Advance every task by `delta_ms` and fire the ones that are due.
    ///
    /// `now_ms` is passed through to the delegate.
    pub fn tick(&mut self, delta_ms: u32, now_ms: u32, delegate: &mut dyn SchedulerDelegate) {
        for slot in self.tasks.iter_mut() {
            let entry = match slot {
                Some(e) if e.spec.enabled => e,
                _ => continue,
            };

            entry.elapsed_ms = entry.elapsed_ms.saturating_add(delta_ms);
            if entry.elapsed_ms >= entry.spec.period_ms {
                entry.elapsed_ms = 0;
                entry.runs += 1;
                delegate.on_task_due(entry.spec.kind, now_ms);
            }
        }
    }

    /// How many times tasks of `kind` have fired.
    pub fn runs(&self, kind: TaskKind) -> u64 {
        self.tasks
            .iter()
            .flatten()
            .filter(|e| e.spec.kind == kind)
            .map(|e| e.runs)
            .sum()
    }

    /// Number of enabled tasks.
    pub fn active_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|s| s.as_ref().is_some_and(|e| e.spec.enabled))
            .count()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

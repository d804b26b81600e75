use std::time::Duration;

use super::phase::Phase;

/// Transition produced by [`Timeline::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Entered(Phase),
    Finished,
}

/// Pure phase state machine: `{current phase, remaining dwell}`.
///
/// Knows nothing about clocks; callers feed it elapsed time. The async
/// [`Sequencer`](super::Sequencer) sleeps for [`remaining`](Self::remaining)
/// and then advances by exactly that much, and tests can fast-forward
/// through the whole intro in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    current: Option<Phase>,
    remaining: Duration,
}

impl Timeline {
    pub fn new() -> Self {
        let first = Phase::first();
        Self {
            current: Some(first),
            remaining: first.dwell(),
        }
    }

    /// Active phase, `None` once the last dwell has run out.
    pub fn current(&self) -> Option<Phase> {
        self.current
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    /// Time left until `Finished`, across the current and all later phases.
    pub fn time_to_finish(&self) -> Duration {
        match self.current {
            None => Duration::ZERO,
            Some(phase) => {
                let later: Duration = Phase::ALL[phase.index() + 1..]
                    .iter()
                    .map(|p| p.dwell())
                    .sum();
                self.remaining + later
            }
        }
    }

    /// Consume `elapsed` time. Returns every phase entered along the way and
    /// a single trailing `Finished` if the last dwell ran out. Calls after
    /// the timeline finished return nothing.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Step> {
        let mut steps = Vec::new();
        let mut budget = elapsed;

        while let Some(phase) = self.current {
            if budget < self.remaining {
                self.remaining -= budget;
                break;
            }
            budget -= self.remaining;
            match phase.next() {
                Some(next) => {
                    self.current = Some(next);
                    self.remaining = next.dwell();
                    steps.push(Step::Entered(next));
                }
                None => {
                    self.current = None;
                    self.remaining = Duration::ZERO;
                    steps.push(Step::Finished);
                }
            }
        }
        steps
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

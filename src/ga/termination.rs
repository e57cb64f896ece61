//! Budget-driven termination.
//!
//! The controller is consulted once on entry to every generation. It
//! checks, in order:
//!
//! 1. Completed generations against `max_generations`
//! 2. Elapsed time since the call started against `time_limit`
//! 3. Generations without improvement against the optional stale limit
//!
//! The first limit hit wins, so a generation limit and a time limit
//! reached at the same check report [`TerminationState::GenerationLimitReached`].
//! Once terminal, the state never changes.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Per-call resource budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    /// Maximum completed generations.
    pub max_generations: u64,
    /// Wall-clock limit measured from call entry.
    pub time_limit: Duration,
}

impl Budget {
    pub fn new(max_generations: u64, time_limit_ms: u64) -> Self {
        Self {
            max_generations,
            time_limit: Duration::from_millis(time_limit_ms),
        }
    }
}

/// Termination controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationState {
    Running,
    GenerationLimitReached,
    TimeLimitReached,
    StagnationReached,
}

impl TerminationState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != Self::Running
    }
}

/// Decides when the generational loop stops.
#[derive(Debug, Clone)]
pub struct TerminationController {
    budget: Budget,
    max_stale_generations: Option<u64>,
    started: Instant,
    state: TerminationState,
}

impl TerminationController {
    /// Starts the clock now.
    pub fn start(budget: Budget) -> Self {
        Self::started_at(budget, Instant::now())
    }

    /// Uses an earlier start instant, e.g. the moment a call entered.
    pub fn started_at(budget: Budget, started: Instant) -> Self {
        Self {
            budget,
            max_stale_generations: None,
            started,
            state: TerminationState::Running,
        }
    }

    /// Also stop after this many generations without improvement.
    pub fn with_max_stale_generations(mut self, limit: Option<u64>) -> Self {
        self.max_stale_generations = limit;
        self
    }

    /// Checks the budget on generation entry.
    pub fn check(&mut self, generations_completed: u64, stale_generations: u64) -> TerminationState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.state = self.check_at(generations_completed, stale_generations, self.started.elapsed());
        self.state
    }

    /// Pure decision for a given progress and elapsed time.
    pub fn check_at(
        &self,
        generations_completed: u64,
        stale_generations: u64,
        elapsed: Duration,
    ) -> TerminationState {
        if generations_completed >= self.budget.max_generations {
            TerminationState::GenerationLimitReached
        } else if elapsed >= self.budget.time_limit {
            TerminationState::TimeLimitReached
        } else if self
            .max_stale_generations
            .is_some_and(|limit| stale_generations >= limit)
        {
            TerminationState::StagnationReached
        } else {
            TerminationState::Running
        }
    }

    pub fn state(&self) -> TerminationState {
        self.state
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Time since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

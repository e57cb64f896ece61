//! The solve call contract.
//!
//! `problem bytes + budget → result bytes`. Everything a call needs lives
//! in a [`SolveSession`] created at entry and dropped at return; only the
//! encoded result outlives it.
//!
//! # Outcomes
//!
//! | Input | Result |
//! |-------|--------|
//! | empty | empty (nothing decoded, nothing allocated) |
//! | malformed or invalid | empty |
//! | decodable | best schedule, `feasible` flag set accordingly |
//! | internal failure or panic | empty |

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use tracing::{debug, error, instrument, warn};

use super::memory::{BoundaryBuffers, SlotBuffer};
use crate::codec::{MessagePackDecoder, ProblemDecoder, encode_schedule};
use crate::error::SolveError;
use crate::ga::{Budget, GaRunner, SlotGaProblem, SolverConfig, TerminationController};
use crate::models::{Problem, Schedule};

/// Per-call solver state.
///
/// Owns the decoded problem and the configuration; the GA population,
/// tracker, RNG and evaluator tables are built inside [`run`](Self::run)
/// and dropped with it.
#[derive(Debug)]
pub struct SolveSession {
    problem: Problem,
    config: SolverConfig,
    started: Instant,
}

impl SolveSession {
    /// Decodes `bytes` with the default MessagePack decoder.
    pub fn open(bytes: &[u8], config: SolverConfig, started: Instant) -> Result<Self, SolveError> {
        Self::open_with(&MessagePackDecoder, bytes, config, started)
    }

    /// Decodes `bytes` with a custom decoder.
    pub fn open_with<D: ProblemDecoder>(
        decoder: &D,
        bytes: &[u8],
        config: SolverConfig,
        started: Instant,
    ) -> Result<Self, SolveError> {
        let problem = decoder.decode(bytes)?;
        Ok(Self::from_problem(problem, config, started))
    }

    /// Wraps an already decoded problem.
    pub fn from_problem(problem: Problem, config: SolverConfig, started: Instant) -> Self {
        Self {
            problem,
            config,
            started,
        }
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Runs the generational search within `budget`.
    ///
    /// A fully blocked horizon still yields a schedule: the empty
    /// placement set, flagged with whatever the fixed activities break.
    pub fn run(&self, budget: Budget) -> Result<Option<Schedule>, SolveError> {
        let ga = SlotGaProblem::new(&self.problem, self.config.operators.clone())?;
        if ga.layout().gene_count() == 0 {
            debug!("no candidate start slot; only the empty placement set is searched");
        }

        let termination = TerminationController::started_at(budget, self.started)
            .with_max_stale_generations(self.config.max_stale_generations);
        let result = GaRunner::run(&ga, &self.config, termination)?;

        let schedule = result.best.map(|best| ga.to_schedule(&best));
        if let Some(s) = &schedule {
            debug!(
                generations = result.generations,
                termination = ?result.termination,
                feasible = s.feasible,
                score = s.score,
                placements = s.placement_count(),
                "solve finished"
            );
        }
        Ok(schedule)
    }
}

fn budget_of(max_generations: usize, time_limit_ms: u64) -> Budget {
    Budget::new(u64::try_from(max_generations).unwrap_or(u64::MAX), time_limit_ms)
}

/// Decodes, solves and returns the best schedule.
///
/// Empty input returns `Ok(None)` without decoding.
#[instrument(
    level = "debug",
    skip_all,
    fields(
        input_len = problem_bytes.len(),
        max_generations = max_generations,
        time_limit_ms = time_limit_ms
    )
)]
pub fn solve_schedule(
    problem_bytes: &[u8],
    max_generations: usize,
    time_limit_ms: u64,
    config: &SolverConfig,
) -> Result<Option<Schedule>, SolveError> {
    let started = Instant::now();
    if problem_bytes.is_empty() {
        return Ok(None);
    }
    let session = SolveSession::open(problem_bytes, config.clone(), started)?;
    session.run(budget_of(max_generations, time_limit_ms))
}

/// Solves with the default configuration.
///
/// # Example
/// ```
/// use u_slot_evolve::boundary::solve;
/// use u_slot_evolve::codec::decode_schedule;
/// use u_slot_evolve::models::{Activity, Problem};
///
/// let problem = Problem::new(96).with_activity(Activity::floating(0, 4));
/// let bytes = rmp_serde::to_vec_named(&problem).unwrap();
/// let result = solve(&bytes, 20, 1_000);
/// let schedule = decode_schedule(&result).unwrap();
/// assert!(schedule.feasible);
///
/// assert!(solve(&[], 20, 1_000).is_empty());
/// ```
pub fn solve(problem_bytes: &[u8], max_generations: usize, time_limit_ms: u64) -> Vec<u8> {
    solve_with_config(
        problem_bytes,
        max_generations,
        time_limit_ms,
        &SolverConfig::default(),
    )
}

/// Solves with an explicit configuration.
///
/// Failures never cross the boundary: they are logged and collapse to an
/// empty result.
pub fn solve_with_config(
    problem_bytes: &[u8],
    max_generations: usize,
    time_limit_ms: u64,
    config: &SolverConfig,
) -> Vec<u8> {
    let outcome = solve_schedule(problem_bytes, max_generations, time_limit_ms, config)
        .and_then(|schedule| encode_schedule(schedule.as_ref()).map_err(SolveError::from));
    match outcome {
        Ok(bytes) => bytes,
        Err(SolveError::Decode(e)) => {
            warn!(error = %e, "rejected problem buffer");
            Vec::new()
        }
        Err(e) => {
            error!(error = %e, "solve failed");
            Vec::new()
        }
    }
}

/// Solves and publishes the result through `buffers`.
///
/// A panic inside the solver is contained and yields the empty buffer.
pub fn solve_into(
    buffers: &BoundaryBuffers,
    problem_bytes: &[u8],
    max_generations: usize,
    time_limit_ms: u64,
    config: &SolverConfig,
) -> SlotBuffer {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        solve_with_config(problem_bytes, max_generations, time_limit_ms, config)
    }));
    match outcome {
        Ok(bytes) => buffers.publish(bytes),
        Err(_) => {
            error!("solver panicked; returning empty result");
            SlotBuffer::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_schedule;
    use crate::models::{Activity, GlobalConstraint};

    fn encoded(problem: &Problem) -> Vec<u8> {
        rmp_serde::to_vec_named(problem).unwrap()
    }

    fn small_config() -> SolverConfig {
        SolverConfig::default().with_population_size(24)
    }

    #[test]
    fn test_empty_input() {
        assert!(solve(&[], 10, 1_000).is_empty());
        assert!(solve_schedule(&[], 10, 1_000, &small_config()).unwrap().is_none());
    }

    #[test]
    fn test_malformed_input() {
        assert!(solve(&[0xc1, 0xff, 0x00], 10, 1_000).is_empty());
        assert!(matches!(
            solve_schedule(&[0xc1], 10, 1_000, &small_config()),
            Err(SolveError::Decode(_))
        ));
    }

    #[test]
    fn test_fully_blocked_horizon_returns_schedule() {
        let problem = Problem::new(8)
            .with_activity(Activity::floating(0, 1))
            .with_constraint(GlobalConstraint::forbidden(0, 8));
        let bytes = solve_with_config(&encoded(&problem), 10, 1_000, &small_config());
        let schedule = decode_schedule(&bytes).unwrap();
        assert!(schedule.feasible);
        assert_eq!(schedule.placement_count(), 0);
    }

    #[test]
    fn test_fixed_only_problem_returns_schedule() {
        let problem = Problem::new(4).with_activity(Activity::fixed(0, 4, 0));
        let bytes = solve_with_config(&encoded(&problem), 5, 1_000, &small_config());
        assert!(!bytes.is_empty());
        assert!(decode_schedule(&bytes).unwrap().feasible);
    }

    #[test]
    fn test_solves_simple_problem() {
        let problem = Problem::new(96)
            .with_activity(Activity::floating(0, 4).with_priority(3.0))
            .with_heat(0, 40, 1.0);
        let bytes = solve_with_config(&encoded(&problem), 30, 10_000, &small_config());
        let schedule = decode_schedule(&bytes).unwrap();
        assert!(schedule.feasible);
        assert!(schedule.placement_count() > 0);
        assert!(schedule
            .placements
            .windows(2)
            .all(|w| w[0].start_slot <= w[1].start_slot));
    }

    #[test]
    fn test_invalid_config_collapses_to_empty() {
        let problem = Problem::new(96).with_activity(Activity::floating(0, 4));
        let config = small_config().with_crossover_rate(3.0);
        assert!(solve_with_config(&encoded(&problem), 5, 1_000, &config).is_empty());
    }

    #[test]
    fn test_solve_into_publishes_one_buffer() {
        let buffers = BoundaryBuffers::new();
        let problem = Problem::new(96).with_activity(Activity::floating(0, 4));
        let buf = solve_into(&buffers, &encoded(&problem), 5, 10_000, &small_config());
        assert!(!buf.is_empty());
        assert_eq!(buffers.stats().allocations, 1);
        let bytes = buffers.copy_out(&buf).unwrap();
        assert!(decode_schedule(&bytes).is_ok());
        buffers.release_buffer(buf).unwrap();
        assert_eq!(buffers.stats().live, 0);
    }

    #[test]
    fn test_solve_into_empty_allocates_nothing() {
        let buffers = BoundaryBuffers::new();
        let buf = solve_into(&buffers, &[], 5, 1_000, &small_config());
        assert!(buf.is_empty());
        let buf = solve_into(&buffers, b"junk", 5, 1_000, &small_config());
        assert!(buf.is_empty());
        assert_eq!(buffers.stats().allocations, 0);
    }

    #[test]
    fn test_session_reuses_problem() {
        let problem = Problem::new(96).with_activity(Activity::floating(0, 2));
        let session = SolveSession::from_problem(problem, small_config(), Instant::now());
        let a = session.run(Budget::new(3, 10_000)).unwrap().unwrap();
        let b = session.run(Budget::new(3, 10_000)).unwrap().unwrap();
        assert_eq!(a, b);
    }
}

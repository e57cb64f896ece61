//! Fitness value and schedule evaluation.
//!
//! # Ordering
//!
//! [`Fitness`] is totally ordered, higher is better:
//!
//! 1. Any feasible value beats any infeasible one.
//! 2. Feasible values compare by soft score.
//! 3. Infeasible values compare by weighted violation (lower wins), then
//!    breach count (lower wins), then soft score.
//!
//! Floats compare with `total_cmp`, so NaN never breaks the order.
//!
//! # Evaluation
//!
//! [`SlotFitnessEvaluator`] scores a set of floating placements together
//! with the problem's fixed activities.
//!
//! Hard constraints (each breach adds weighted violation):
//! - Overlap between any two occurrences
//! - Intersection with a forbidden zone
//! - Occurrence ending past the horizon
//! - Cumulative category time outside its per-period bounds
//! - User frequency bounds per day/week/horizon bucket
//!
//! Soft objective (added to score):
//! - Priority per occurrence
//! - Heatmap preference of the start slot
//! - Markov transition between back-to-back occurrences
//! - Frequency target rewards
//! - Minus the weight of each unmet input/output binding
//!
//! The result depends only on the placements: occurrences are visited in
//! `(start, end, id)` order and lookups never iterate a hash map.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    ActivityId, Binding, CumulativeRule, Problem, SlotWindow, TimeScope, TimeSlot, Violation,
    ViolationKind, SLOTS_PER_DAY, SLOTS_PER_WEEK, day_of, days_in, week_of, weekday_of, weeks_in,
};

/// Violation weight per overlapping occurrence.
pub const PENALTY_OVERLAP: f64 = 1.0e6;
/// Violation weight per forbidden-zone intersection.
pub const PENALTY_FORBIDDEN: f64 = 1.0e6;
/// Violation weight per occurrence ending past the horizon.
pub const PENALTY_HORIZON: f64 = 1.0e6;
/// Violation weight per slot of cumulative-time deviation.
pub const PENALTY_CUMULATIVE: f64 = 1.0e4;
/// Score weight of activity priority.
pub const WEIGHT_PRIORITY: f64 = 10.0;
/// Score weight of heatmap preference.
pub const WEIGHT_HEATMAP: f64 = 5.0;
/// Score weight of Markov transitions.
pub const WEIGHT_MARKOV: f64 = 5.0;
/// Largest gap (slots) between two occurrences that still counts as a transition.
pub const MARKOV_GAP_TOLERANCE: u32 = 2;

/// Two-tier fitness: feasibility first, then soft quality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fitness {
    /// No hard constraint is broken.
    pub feasible: bool,
    /// Soft objective, higher is better.
    pub score: f64,
    /// Weighted hard-constraint violation, 0 when feasible.
    pub violation: f64,
    /// Number of hard-constraint breaches.
    pub breaches: u32,
}

impl Fitness {
    /// A feasible fitness.
    pub fn feasible(score: f64) -> Self {
        Self {
            feasible: true,
            score,
            violation: 0.0,
            breaches: 0,
        }
    }

    /// An infeasible fitness.
    pub fn infeasible(score: f64, violation: f64, breaches: u32) -> Self {
        Self {
            feasible: false,
            score,
            violation,
            breaches,
        }
    }

    /// A value every evaluated fitness beats or ties.
    pub fn worst() -> Self {
        Self::infeasible(f64::NEG_INFINITY, f64::INFINITY, u32::MAX)
    }

    /// Strict improvement.
    #[inline]
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Greater
    }
}

impl Ord for Fitness {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.feasible, other.feasible) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (true, true) => self.score.total_cmp(&other.score),
            (false, false) => other
                .violation
                .total_cmp(&self.violation)
                .then_with(|| other.breaches.cmp(&self.breaches))
                .then_with(|| self.score.total_cmp(&other.score)),
        }
    }
}

impl PartialOrd for Fitness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Fitness {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fitness {}

/// One placed occurrence, floating or fixed.
#[derive(Debug, Clone, Copy)]
struct Occurrence {
    id: ActivityId,
    window: SlotWindow,
    day: usize,
    week: usize,
    weekday: usize,
}

/// Accumulates score and hard-constraint breaches.
struct Tally<'a> {
    score: f64,
    violation: f64,
    breaches: u32,
    sink: Option<&'a mut Vec<Violation>>,
}

impl<'a> Tally<'a> {
    fn new(sink: Option<&'a mut Vec<Violation>>) -> Self {
        Self {
            score: 0.0,
            violation: 0.0,
            breaches: 0,
            sink,
        }
    }

    fn breach(&mut self, kind: ViolationKind, activity_id: Option<ActivityId>, slot: u32, amount: f64) {
        self.violation += amount;
        self.breaches = self.breaches.saturating_add(1);
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.push(Violation {
                kind,
                activity_id,
                slot: Some(slot),
                amount,
            });
        }
    }

    fn finish(self) -> Fitness {
        if self.breaches == 0 {
            Fitness::feasible(self.score)
        } else {
            Fitness::infeasible(self.score, self.violation, self.breaches)
        }
    }
}

/// Per-activity occurrence counts by day, week and horizon.
struct Counts {
    day: Vec<Vec<u32>>,
    week: Vec<Vec<u32>>,
    month: Vec<u32>,
}

impl Counts {
    fn new(activities: usize, days: usize, weeks: usize) -> Self {
        Self {
            day: vec![vec![0; activities]; days],
            week: vec![vec![0; activities]; weeks],
            month: vec![0; activities],
        }
    }

    fn add(&mut self, occ: &Occurrence) {
        self.day[occ.day][occ.id] += 1;
        self.week[occ.week][occ.id] += 1;
        self.month[occ.id] += 1;
    }

    fn scoped(&self, scope: TimeScope, occ: &Occurrence) -> &[u32] {
        match scope {
            TimeScope::SameDay => &self.day[occ.day],
            TimeScope::SameWeek => &self.week[occ.week],
            TimeScope::SameMonth => &self.month,
        }
    }
}

/// Evaluates placements of one problem.
///
/// Built once per solve; holds the lookup tables derived from the problem.
#[derive(Debug, Clone)]
pub struct SlotFitnessEvaluator<'p> {
    problem: &'p Problem,
    heat: HashMap<(ActivityId, TimeSlot), f64>,
    markov: HashMap<(ActivityId, ActivityId), f64>,
    forbidden: Vec<SlotWindow>,
    cumulative: Vec<CumulativeRule>,
    fixed: Vec<(usize, TimeSlot)>,
    num_days: usize,
    num_weeks: usize,
}

impl<'p> SlotFitnessEvaluator<'p> {
    /// Prepares lookup tables for `problem`.
    pub fn new(problem: &'p Problem) -> Self {
        let (heat, markov) = problem.build_lookup_maps();
        let forbidden = problem
            .global_constraints
            .iter()
            .filter_map(|c| c.forbidden_window())
            .filter(|w| !w.is_empty())
            .collect();
        let cumulative = problem
            .global_constraints
            .iter()
            .filter_map(|c| CumulativeRule::from_constraint(c, problem.total_slots))
            .collect();
        let fixed = problem
            .fixed_indices
            .iter()
            .filter_map(|&idx| {
                problem
                    .activities
                    .get(idx)
                    .and_then(|a| a.assigned_start)
                    .map(|start| (idx, start))
            })
            .collect();
        let horizon = u32::from(problem.total_slots);

        Self {
            problem,
            heat,
            markov,
            forbidden,
            cumulative,
            fixed,
            num_days: days_in(horizon),
            num_weeks: weeks_in(horizon),
        }
    }

    /// The problem being evaluated.
    pub fn problem(&self) -> &'p Problem {
        self.problem
    }

    /// Scores floating placements given as `(activity index, start slot)`.
    pub fn evaluate(&self, floating: &[(usize, TimeSlot)]) -> Fitness {
        self.assess(floating, None)
    }

    /// Scores placements and lists every hard-constraint breach.
    pub fn explain(&self, floating: &[(usize, TimeSlot)]) -> (Fitness, Vec<Violation>) {
        let mut violations = Vec::new();
        let fitness = self.assess(floating, Some(&mut violations));
        (fitness, violations)
    }

    fn occurrence(&self, act_idx: usize, start: TimeSlot) -> Option<Occurrence> {
        let act = self.problem.activities.get(act_idx)?;
        let start = u32::from(start);
        Some(Occurrence {
            id: act.id,
            window: SlotWindow::starting_at(start, u32::from(act.duration_slots)),
            day: day_of(start).min(self.num_days - 1),
            week: week_of(start).min(self.num_weeks - 1),
            weekday: weekday_of(start),
        })
    }

    fn assess(&self, floating: &[(usize, TimeSlot)], sink: Option<&mut Vec<Violation>>) -> Fitness {
        let activities = &self.problem.activities;
        let horizon = u32::from(self.problem.total_slots);
        let mut tally = Tally::new(sink);

        let mut occs: Vec<Occurrence> = floating
            .iter()
            .chain(self.fixed.iter())
            .filter_map(|&(idx, start)| self.occurrence(idx, start))
            .collect();
        occs.sort_unstable_by_key(|o| (o.window.start, o.window.end, o.id));

        let mut totals = Counts::new(activities.len(), self.num_days, self.num_weeks);
        for occ in &occs {
            totals.add(occ);
        }

        let mut running = Counts::new(activities.len(), self.num_days, self.num_weeks);
        let mut cumulative: Vec<Vec<u32>> = self
            .cumulative
            .iter()
            .map(|r| vec![0; r.bucket_count])
            .collect();
        let mut max_end = 0u32;

        for (i, occ) in occs.iter().enumerate() {
            let act = &activities[occ.id];
            let start = occ.window.start;

            tally.score += f64::from(act.priority) * WEIGHT_PRIORITY;
            if let Ok(slot) = TimeSlot::try_from(start) {
                if let Some(p) = self.heat.get(&(occ.id, slot)) {
                    tally.score += p * WEIGHT_HEATMAP;
                }
            }

            if occ.window.end > horizon {
                tally.breach(ViolationKind::HorizonOverrun, Some(occ.id), start, PENALTY_HORIZON);
            }
            for zone in &self.forbidden {
                if zone.overlaps(&occ.window) {
                    tally.breach(ViolationKind::ForbiddenZone, Some(occ.id), start, PENALTY_FORBIDDEN);
                }
            }
            if i > 0 {
                let prev = &occs[i - 1];
                if start < max_end {
                    tally.breach(ViolationKind::Overlap, Some(occ.id), start, PENALTY_OVERLAP);
                } else if start - prev.window.end <= MARKOV_GAP_TOLERANCE {
                    if let Some(p) = self.markov.get(&(prev.id, occ.id)) {
                        tally.score += p * WEIGHT_MARKOV;
                    }
                }
            }
            max_end = max_end.max(occ.window.end);

            for (rule, buckets) in self.cumulative.iter().zip(cumulative.iter_mut()) {
                if rule.tracks(act.category_id) {
                    buckets[rule.bucket_of(start)] += occ.window.len();
                }
            }

            for binding in &act.input_bindings {
                if !binding.applies_on(occ.weekday) {
                    continue;
                }
                let before = running.scoped(binding.time_scope, occ);
                if !binding_met(binding, |id| before.get(id).is_some_and(|&n| n > 0)) {
                    tally.score -= f64::from(binding.weight);
                }
            }
            for binding in &act.output_bindings {
                if !binding.applies_on(occ.weekday) {
                    continue;
                }
                let all = totals.scoped(binding.time_scope, occ);
                let before = running.scoped(binding.time_scope, occ);
                let after = |id: ActivityId| {
                    let total = all.get(id).copied().unwrap_or(0);
                    let seen = before.get(id).copied().unwrap_or(0) + u32::from(id == occ.id);
                    total > seen
                };
                if !binding_met(binding, after) {
                    tally.score -= f64::from(binding.weight);
                }
            }

            running.add(occ);
        }

        for (rule, buckets) in self.cumulative.iter().zip(&cumulative) {
            for (b, &total) in buckets.iter().enumerate() {
                let deviation = rule.deviation(total);
                if deviation > 0 {
                    let slot = b as u32 * rule.period_slots;
                    tally.breach(
                        ViolationKind::CumulativeTime,
                        None,
                        slot,
                        PENALTY_CUMULATIVE * f64::from(deviation),
                    );
                }
            }
        }

        self.frequency_terms(&occs, &totals, horizon, &mut tally);
        tally.finish()
    }

    /// Frequency target rewards and user frequency bounds.
    fn frequency_terms(&self, occs: &[Occurrence], totals: &Counts, horizon: u32, tally: &mut Tally<'_>) {
        for act in &self.problem.activities {
            for target in &act.frequency_targets {
                let target_count = u32::from(target.target_count);
                let weight = f64::from(target.weight);
                let actuals: Vec<u32> = match target.scope {
                    TimeScope::SameDay => totals.day.iter().map(|d| d[act.id]).collect(),
                    TimeScope::SameWeek => totals.week.iter().map(|w| w[act.id]).collect(),
                    TimeScope::SameMonth => vec![totals.month[act.id]],
                };
                for actual in actuals {
                    if actual <= target_count {
                        tally.score += f64::from(actual) * weight;
                    }
                }
            }

            for constraint in &act.user_frequency_constraints {
                let bucket_len = match constraint.scope {
                    TimeScope::SameDay => SLOTS_PER_DAY,
                    TimeScope::SameWeek => SLOTS_PER_WEEK,
                    TimeScope::SameMonth => horizon.max(1),
                };
                let bucket_count = (horizon.div_ceil(bucket_len) as usize).max(1);
                let deadline = constraint.deadline_end.map(u32::from);

                let mut counts = vec![0u32; bucket_count];
                for occ in occs.iter().filter(|o| o.id == act.id) {
                    if deadline.is_some_and(|d| occ.window.start >= d) {
                        continue;
                    }
                    let b = ((occ.window.start / bucket_len) as usize).min(bucket_count - 1);
                    counts[b] += 1;
                }

                for (b, &count) in counts.iter().enumerate() {
                    let bucket_start = b as u32 * bucket_len;
                    if deadline.is_some_and(|d| bucket_start >= d) {
                        continue;
                    }
                    let deviation = constraint.deviation(count);
                    if deviation > 0 {
                        tally.breach(
                            ViolationKind::FrequencyBounds,
                            Some(act.id),
                            bucket_start,
                            f64::from(constraint.penalty_weight) * f64::from(deviation),
                        );
                    }
                }
            }
        }
    }
}

/// DNF check: any required set whose members all satisfy `present`.
fn binding_met(binding: &Binding, present: impl Fn(ActivityId) -> bool) -> bool {
    binding
        .required_sets
        .iter()
        .any(|set| set.iter().all(|&id| present(id)))
}

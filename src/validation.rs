//! Input validation for decoded problems.
//!
//! The wire decoder only guarantees that the bytes had the right shape.
//! This module checks that the fields can be trusted by the evaluator,
//! which indexes dense per-activity arrays without bounds surprises:
//! - Activity IDs form a permutation of `0..N`
//! - Floating/fixed index lists partition the activities consistently
//! - Every referenced activity exists
//! - Slots, durations and weights are within range
//!
//! All issues are collected rather than stopping at the first one.

use std::collections::HashSet;

use crate::models::{Activity, GlobalConstraint, Problem};

/// Floating activities are alleles `0..F` with `F` itself meaning idle.
pub const MAX_FLOATING_ACTIVITIES: usize = u16::MAX as usize - 1;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two activities share the same ID.
    DuplicateId,
    /// An ID or index points outside the activity list.
    UnknownReference,
    /// Floating/fixed index lists disagree with activity kinds.
    InconsistentIndex,
    /// A fixed activity has no usable start slot.
    MissingStart,
    /// A count, slot or duration is out of range.
    OutOfRange,
    /// A weight or probability is NaN, infinite, or negative where it must not be.
    InvalidWeight,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a decoded problem.
///
/// Checks:
/// 1. Horizon is non-empty
/// 2. Activity IDs are unique and dense
/// 3. Index lists are in range, duplicate-free, and match activity kinds
/// 4. Fixed activities start inside the horizon; durations are non-zero
/// 5. Binding, heatmap and Markov references point to existing activities
/// 6. Weights are finite; penalty weights are non-negative
/// 7. Global constraints are well-formed
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_problem(problem: &Problem) -> ValidationResult {
    let mut errors = Vec::new();
    let n = problem.activities.len();

    if problem.total_slots == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::OutOfRange,
            "Horizon has zero slots",
        ));
    }

    let mut ids = HashSet::new();
    for (idx, act) in problem.activities.iter().enumerate() {
        if act.id >= n {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("Activity at index {idx} has ID {} outside 0..{n}", act.id),
            ));
        } else if act.id != idx {
            errors.push(ValidationError::new(
                ValidationErrorKind::InconsistentIndex,
                format!("Activity at index {idx} has ID {}", act.id),
            ));
        }
        if !ids.insert(act.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate activity ID: {}", act.id),
            ));
        }
        validate_activity(act, problem, &mut errors);
    }

    validate_indices(problem, &mut errors);

    if problem.floating_indices.len() > MAX_FLOATING_ACTIVITIES {
        errors.push(ValidationError::new(
            ValidationErrorKind::OutOfRange,
            format!(
                "{} floating activities exceed the maximum of {MAX_FLOATING_ACTIVITIES}",
                problem.floating_indices.len()
            ),
        ));
    }

    for &(a, slot, p) in &problem.heatmap {
        if a >= n {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("Heatmap entry references unknown activity {a}"),
            ));
        }
        if slot >= problem.total_slots {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!("Heatmap entry for activity {a} has slot {slot} past the horizon"),
            ));
        }
        if !p.is_finite() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWeight,
                format!("Heatmap entry for activity {a} has non-finite probability"),
            ));
        }
    }

    for &(from, to, p) in &problem.markov_matrix {
        if from >= n || to >= n {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("Markov entry {from} -> {to} references an unknown activity"),
            ));
        }
        if !p.is_finite() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWeight,
                format!("Markov entry {from} -> {to} has non-finite probability"),
            ));
        }
    }

    for constraint in &problem.global_constraints {
        validate_constraint(constraint, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_activity(act: &Activity, problem: &Problem, errors: &mut Vec<ValidationError>) {
    let n = problem.activities.len();

    if act.duration_slots == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::OutOfRange,
            format!("Activity {} has zero duration", act.id),
        ));
    }
    if !act.priority.is_finite() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidWeight,
            format!("Activity {} has non-finite priority", act.id),
        ));
    }
    if act.is_fixed() {
        match act.assigned_start {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::MissingStart,
                format!("Fixed activity {} has no assigned start", act.id),
            )),
            Some(start) if start >= problem.total_slots => errors.push(ValidationError::new(
                ValidationErrorKind::MissingStart,
                format!("Fixed activity {} starts at {start}, past the horizon", act.id),
            )),
            Some(_) => {}
        }
    }

    for referenced in act.referenced_ids() {
        if referenced >= n {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("Activity {} binds to unknown activity {referenced}", act.id),
            ));
        }
    }
    for binding in act.input_bindings.iter().chain(&act.output_bindings) {
        if !binding.weight.is_finite() || binding.weight < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWeight,
                format!("Activity {} has a binding with invalid weight", act.id),
            ));
        }
    }
    for target in &act.frequency_targets {
        if !target.weight.is_finite() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWeight,
                format!("Activity {} has a frequency target with invalid weight", act.id),
            ));
        }
    }
    for c in &act.user_frequency_constraints {
        if !c.penalty_weight.is_finite() || c.penalty_weight < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWeight,
                format!("Activity {} has a frequency bound with invalid weight", act.id),
            ));
        }
        if let (Some(min), Some(max)) = (c.min_count, c.max_count) {
            if min > max {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OutOfRange,
                    format!("Activity {} has frequency bounds {min} > {max}", act.id),
                ));
            }
        }
    }
}

fn validate_indices(problem: &Problem, errors: &mut Vec<ValidationError>) {
    let n = problem.activities.len();
    let mut seen = HashSet::new();

    let lists = [
        (&problem.floating_indices, false, "floating"),
        (&problem.fixed_indices, true, "fixed"),
    ];
    for (indices, fixed, label) in lists {
        for &idx in indices {
            if !seen.insert(idx) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InconsistentIndex,
                    format!("Activity index {idx} listed more than once"),
                ));
            }
            match problem.activities.get(idx) {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("{label} index {idx} outside 0..{n}"),
                )),
                Some(act) if act.is_fixed() != fixed => errors.push(ValidationError::new(
                    ValidationErrorKind::InconsistentIndex,
                    format!("Activity {idx} listed as {label} but declared {:?}", act.kind),
                )),
                Some(_) => {}
            }
        }
    }

    for idx in 0..n {
        if !seen.contains(&idx) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InconsistentIndex,
                format!("Activity {idx} is neither floating nor fixed"),
            ));
        }
    }
}

fn validate_constraint(constraint: &GlobalConstraint, errors: &mut Vec<ValidationError>) {
    match *constraint {
        GlobalConstraint::ForbiddenZone { start, end } => {
            if start > end {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OutOfRange,
                    format!("Forbidden zone [{start}, {end}) is inverted"),
                ));
            }
        }
        GlobalConstraint::CumulativeTime {
            period_slots,
            min_duration,
            max_duration,
            ..
        } => {
            if period_slots == 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OutOfRange,
                    "Cumulative time rule has a zero-slot period",
                ));
            }
            if min_duration > max_duration {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OutOfRange,
                    format!("Cumulative time bounds {min_duration} > {max_duration}"),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Binding, TimeScope, UserFrequencyConstraint};

    fn sample_problem() -> Problem {
        Problem::new(96)
            .with_activity(Activity::floating(0, 2))
            .with_activity(
                Activity::floating(0, 4)
                    .with_input_binding(Binding::requiring(vec![0], TimeScope::SameDay, 5.0)),
            )
            .with_activity(Activity::fixed(0, 3, 40))
            .with_constraint(GlobalConstraint::forbidden(0, 8))
            .with_heat(0, 12, 0.5)
            .with_transition(0, 1, 0.25)
    }

    fn kinds(problem: &Problem) -> Vec<ValidationErrorKind> {
        validate_problem(problem)
            .unwrap_err()
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_valid_problem() {
        assert!(validate_problem(&sample_problem()).is_ok());
    }

    #[test]
    fn test_zero_horizon() {
        let mut p = sample_problem();
        p.total_slots = 0;
        assert!(kinds(&p).contains(&ValidationErrorKind::OutOfRange));
    }

    #[test]
    fn test_duplicate_id() {
        let mut p = sample_problem();
        p.activities[1].id = 0;
        let k = kinds(&p);
        assert!(k.contains(&ValidationErrorKind::DuplicateId));
        assert!(k.contains(&ValidationErrorKind::InconsistentIndex));
    }

    #[test]
    fn test_id_out_of_range() {
        let mut p = sample_problem();
        p.activities[2].id = 17;
        assert!(kinds(&p).contains(&ValidationErrorKind::UnknownReference));
    }

    #[test]
    fn test_index_lists_must_partition() {
        let mut p = sample_problem();
        p.floating_indices.push(2);
        assert!(kinds(&p).contains(&ValidationErrorKind::InconsistentIndex));

        let mut p = sample_problem();
        p.floating_indices.retain(|&i| i != 1);
        let errors = validate_problem(&p).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.message.contains("neither floating nor fixed")));

        let mut p = sample_problem();
        p.fixed_indices.push(9);
        assert!(kinds(&p).contains(&ValidationErrorKind::UnknownReference));
    }

    #[test]
    fn test_fixed_requires_start_inside_horizon() {
        let mut p = sample_problem();
        p.activities[2].assigned_start = None;
        assert!(kinds(&p).contains(&ValidationErrorKind::MissingStart));

        let mut p = sample_problem();
        p.activities[2].assigned_start = Some(96);
        assert!(kinds(&p).contains(&ValidationErrorKind::MissingStart));
    }

    #[test]
    fn test_unknown_binding_reference() {
        let mut p = sample_problem();
        p.activities[1].input_bindings[0].required_sets[0].push(42);
        assert!(kinds(&p).contains(&ValidationErrorKind::UnknownReference));
    }

    #[test]
    fn test_heatmap_and_markov_references() {
        let p = sample_problem().with_heat(5, 0, 0.1);
        assert!(kinds(&p).contains(&ValidationErrorKind::UnknownReference));

        let p = sample_problem().with_heat(0, 500, 0.1);
        assert!(kinds(&p).contains(&ValidationErrorKind::OutOfRange));

        let p = sample_problem().with_transition(0, 9, 0.1);
        assert!(kinds(&p).contains(&ValidationErrorKind::UnknownReference));

        let p = sample_problem().with_transition(0, 1, f32::NAN);
        assert!(kinds(&p).contains(&ValidationErrorKind::InvalidWeight));
    }

    #[test]
    fn test_invalid_weights() {
        let mut p = sample_problem();
        p.activities[0].priority = f32::INFINITY;
        assert!(kinds(&p).contains(&ValidationErrorKind::InvalidWeight));

        let mut p = sample_problem();
        p.activities[0]
            .user_frequency_constraints
            .push(UserFrequencyConstraint::at_least(TimeScope::SameDay, 1, -1.0));
        assert!(kinds(&p).contains(&ValidationErrorKind::InvalidWeight));
    }

    #[test]
    fn test_inverted_bounds() {
        let mut p = sample_problem();
        p.activities[0].user_frequency_constraints.push(UserFrequencyConstraint {
            scope: TimeScope::SameDay,
            min_count: Some(3),
            max_count: Some(1),
            deadline_end: None,
            penalty_weight: 1.0,
        });
        assert!(kinds(&p).contains(&ValidationErrorKind::OutOfRange));

        let p = sample_problem().with_constraint(GlobalConstraint::forbidden(10, 4));
        assert!(kinds(&p).contains(&ValidationErrorKind::OutOfRange));

        let p = sample_problem().with_constraint(GlobalConstraint::cumulative(None, 0, 0, 1));
        assert!(kinds(&p).contains(&ValidationErrorKind::OutOfRange));

        let p = sample_problem().with_constraint(GlobalConstraint::cumulative(None, 96, 5, 1));
        assert!(kinds(&p).contains(&ValidationErrorKind::OutOfRange));
    }

    #[test]
    fn test_zero_duration() {
        let mut p = sample_problem();
        p.activities[0].duration_slots = 0;
        assert!(kinds(&p).contains(&ValidationErrorKind::OutOfRange));
    }

    #[test]
    fn test_multiple_errors() {
        let mut p = sample_problem();
        p.total_slots = 0;
        p.activities[0].duration_slots = 0;
        p.activities[1].priority = f32::NAN;
        let errors = validate_problem(&p).unwrap_err();
        assert!(errors.len() >= 3);
    }
}

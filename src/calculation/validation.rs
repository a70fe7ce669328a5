//! Candidate input validation.
//!
//! Invalid candidates are excluded from a run and reported; they never abort it.

use chrono::NaiveDate;

use super::combined_score::validate_score;
use crate::error::{EngineError, EngineResult};
use crate::models::{CandidateRecord, GradeStepBounds};

/// Checks that the candidate's grade is known and the step lies in `1..=max`.
pub fn validate_placement(candidate: &CandidateRecord, bounds: &GradeStepBounds) -> EngineResult<u32> {
    let grade = candidate.current_grade;
    let max_step = bounds.max_step(grade).map_err(|_| {
        EngineError::invalid_candidate(
            &candidate.id,
            "current_grade",
            format!("grade {grade} is not defined in the grade step bounds"),
        )
    })?;

    if candidate.current_step == 0 || candidate.current_step > max_step {
        return Err(EngineError::invalid_candidate(
            &candidate.id,
            "current_step",
            format!(
                "step {} is outside 1-{} for grade {}",
                candidate.current_step, max_step, grade
            ),
        ));
    }

    Ok(max_step)
}

/// Validates everything ranking depends on.
///
/// On top of [`validate_placement`]: both scores must lie in [0, 100], the
/// file number must not be blank and no date may fall after `evaluation_date`.
pub fn validate_candidate(
    candidate: &CandidateRecord,
    bounds: &GradeStepBounds,
    evaluation_date: NaiveDate,
) -> EngineResult<()> {
    validate_placement(candidate, bounds)?;

    validate_score("exam", candidate.exam_score)?;
    validate_score("performance", candidate.periodic_performance_score)?;

    if candidate.file_number.trim().is_empty() {
        return Err(EngineError::invalid_candidate(
            &candidate.id,
            "file_number",
            "must not be empty",
        ));
    }

    let dates = [
        ("confirmation_date", candidate.confirmation_date),
        ("date_of_birth", candidate.date_of_birth),
        ("date_of_last_promotion", candidate.date_of_last_promotion),
        ("date_of_first_appointment", candidate.date_of_first_appointment),
    ];
    for (field, value) in dates {
        if let Some(value) = value.filter(|d| *d > evaluation_date) {
            return Err(EngineError::invalid_candidate(
                &candidate.id,
                field,
                format!("{value} is after the evaluation date {evaluation_date}"),
            ));
        }
    }

    Ok(())
}

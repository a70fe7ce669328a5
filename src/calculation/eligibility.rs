//! Promotion eligibility.
//!
//! Eligibility is recomputed from scratch for every evaluation: it depends on
//! the grade's vacancy state, any disciplinary hold, the grade's standard
//! cycle length and the time elapsed since the candidate's reference date.
//! A candidate who has failed a previous attempt only has to wait one year.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, CandidateRecord, EligibilityStatus, IneligibilityReason, VacancyConfig,
};

/// Years required between attempts after a failed promotion attempt.
pub const RETRY_CYCLE_YEARS: u32 = 1;

/// Returns the standard promotion cycle in years for a grade.
///
/// Returns `None` for the terminal grade 15 and for grades outside the scale.
///
/// ```
/// use promotion_engine::calculation::standard_cycle_years;
///
/// assert_eq!(standard_cycle_years(4), Some(2));
/// assert_eq!(standard_cycle_years(12), Some(3));
/// assert_eq!(standard_cycle_years(13), Some(4));
/// assert_eq!(standard_cycle_years(15), None);
/// ```
pub fn standard_cycle_years(grade: u32) -> Option<u32> {
    match grade {
        2..=5 => Some(2),
        6..=12 => Some(3),
        13..=14 => Some(4),
        _ => None,
    }
}

/// The outcome of an eligibility evaluation with the detail behind it.
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityDecision {
    /// The candidate evaluated.
    pub candidate_id: String,
    /// The grade the candidate holds.
    pub grade: u32,
    /// The date the evaluation was made for.
    pub evaluation_date: NaiveDate,
    /// Eligible, or not eligible with a reason.
    #[serde(flatten)]
    pub status: EligibilityStatus,
    /// The grade's standard cycle length, if it has one.
    pub standard_cycle_years: Option<u32>,
    /// Years actually required for this candidate.
    pub required_years: Option<u32>,
    /// Completed years since the reference date.
    pub years_since_reference: Option<u32>,
    /// Years still to wait, when the cycle has not elapsed.
    pub years_remaining: Option<u32>,
    /// Failed attempts since the last promotion.
    pub failed_attempts: u32,
    /// The audit step recording this evaluation.
    pub audit_step: AuditStep,
}

impl EligibilityDecision {
    /// Returns true if the candidate may attempt promotion.
    pub fn is_eligible(&self) -> bool {
        self.status.is_eligible()
    }
}

/// Evaluates whether a candidate may attempt promotion.
///
/// Rules apply in order and the first that fails decides the outcome:
/// 1. the grade must have at least one promotion slot
/// 2. the candidate must not be under a disciplinary hold
/// 3. the grade must not be terminal
/// 4. a reference date (last promotion, else first appointment) must exist
/// 5. with a failed attempt on record, one completed year is enough
/// 6. otherwise the grade's standard cycle must have elapsed
///
/// # Errors
///
/// Returns `InvalidCandidate` if the reference date is after the evaluation date.
pub fn evaluate_eligibility(
    candidate: &CandidateRecord,
    vacancy: Option<&VacancyConfig>,
    disciplinary_hold: bool,
    evaluation_date: NaiveDate,
    step_number: u32,
) -> EngineResult<EligibilityDecision> {
    let grade = candidate.current_grade;
    let standard_cycle = standard_cycle_years(grade);
    let failed_attempts = candidate.failed_promotion_attempts;
    let reference_date = candidate.reference_date();

    let years_since_reference = match reference_date {
        Some(reference) => Some(evaluation_date.years_since(reference).ok_or_else(|| {
            let field = if candidate.date_of_last_promotion.is_some() {
                "date_of_last_promotion"
            } else {
                "date_of_first_appointment"
            };
            EngineError::invalid_candidate(
                &candidate.id,
                field,
                format!("reference date {reference} is after the evaluation date {evaluation_date}"),
            )
        })?),
        None => None,
    };

    let required_years = standard_cycle.map(|years| {
        if candidate.has_failed_attempt() {
            RETRY_CYCLE_YEARS
        } else {
            years
        }
    });

    let has_vacancy = vacancy.is_some_and(VacancyConfig::has_promotion_vacancy);

    let status = if !has_vacancy {
        EligibilityStatus::NotEligible(IneligibilityReason::NoVacancy)
    } else if disciplinary_hold {
        EligibilityStatus::NotEligible(IneligibilityReason::DisciplinaryHold)
    } else {
        match (required_years, years_since_reference) {
            (None, _) => EligibilityStatus::NotEligible(IneligibilityReason::TerminalGrade),
            (_, None) => EligibilityStatus::NotEligible(IneligibilityReason::MissingReferenceDate),
            (Some(required), Some(years)) if years >= required => EligibilityStatus::Eligible,
            (Some(_), Some(_)) => {
                EligibilityStatus::NotEligible(IneligibilityReason::CycleNotElapsed)
            }
        }
    };

    let years_remaining = match (status, required_years, years_since_reference) {
        (
            EligibilityStatus::NotEligible(IneligibilityReason::CycleNotElapsed),
            Some(required),
            Some(years),
        ) => Some(required - years),
        _ => None,
    };

    let reasoning = match status {
        EligibilityStatus::Eligible => format!(
            "{} completed year(s) in grade {} meets the {} year requirement",
            years_since_reference.unwrap_or_default(),
            grade,
            required_years.unwrap_or_default()
        ),
        EligibilityStatus::NotEligible(IneligibilityReason::NoVacancy) => {
            format!("Grade {grade} has no promotion slots in this cycle")
        }
        EligibilityStatus::NotEligible(IneligibilityReason::DisciplinaryHold) => {
            "Candidate is under an active disciplinary hold".to_string()
        }
        EligibilityStatus::NotEligible(IneligibilityReason::TerminalGrade) => {
            format!("Grade {grade} has no higher grade to promote to")
        }
        EligibilityStatus::NotEligible(IneligibilityReason::MissingReferenceDate) => {
            "Neither a last promotion date nor a first appointment date is recorded".to_string()
        }
        EligibilityStatus::NotEligible(IneligibilityReason::CycleNotElapsed) => format!(
            "{} completed year(s) in grade {} is short of the {} year requirement",
            years_since_reference.unwrap_or_default(),
            grade,
            required_years.unwrap_or_default()
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "eligibility".to_string(),
        rule_name: "Promotion Eligibility".to_string(),
        subject: candidate.id.clone(),
        input: serde_json::json!({
            "grade": grade,
            "evaluation_date": evaluation_date.to_string(),
            "reference_date": reference_date.map(|d| d.to_string()),
            "failed_attempts": failed_attempts,
            "promotion_slots": vacancy.map(|v| v.promotion_slots),
            "disciplinary_hold": disciplinary_hold
        }),
        output: serde_json::json!({
            "eligible": status.is_eligible(),
            "reason": status.reason(),
            "required_years": required_years,
            "years_since_reference": years_since_reference
        }),
        reasoning,
    };

    Ok(EligibilityDecision {
        candidate_id: candidate.id.clone(),
        grade,
        evaluation_date,
        status,
        standard_cycle_years: standard_cycle,
        required_years,
        years_since_reference,
        years_remaining,
        failed_attempts,
        audit_step,
    })
}

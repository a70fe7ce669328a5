//! Request types for the Promotion Allocation Engine API.
//!
//! This module defines the JSON request structures for the `/allocate`,
//! `/eligibility`, `/step-recommendation` and `/step-increment` endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{GoalRating, performance_percentage};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, CandidateRecord, VacancyConfig};

fn default_active() -> bool {
    true
}

/// Request body for the `/allocate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// The promotion cycle to run.
    pub promotion_cycle_id: String,
    /// The date eligibility is evaluated on.
    pub evaluation_date: NaiveDate,
    /// The staff taking part in the cycle.
    pub candidates: Vec<CandidateRequest>,
    /// Slot counts per grade. When absent, the configured counts for the
    /// cycle are used.
    #[serde(default)]
    pub vacancies: Option<Vec<VacancyRequest>>,
    /// Ids of candidates under an active disciplinary hold.
    #[serde(default)]
    pub disciplinary_holds: Vec<String>,
}

/// Request body for the `/eligibility` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityRequest {
    /// The candidate to evaluate.
    pub candidate: CandidateRequest,
    /// The promotion cycle.
    pub promotion_cycle_id: String,
    /// The date eligibility is evaluated on.
    pub evaluation_date: NaiveDate,
    /// Slot counts for the candidate's grade. When absent, the configured
    /// counts for the cycle are used.
    #[serde(default)]
    pub vacancy: Option<VacancyRequest>,
    /// Whether the candidate is under an active disciplinary hold.
    #[serde(default)]
    pub disciplinary_hold: bool,
}

/// Request body for the `/step-recommendation` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecommendationRequest {
    /// Grade held before promotion.
    pub current_grade: u32,
    /// Step held before promotion.
    pub current_step: u32,
    /// Grade promoted to; defaults to the next grade.
    #[serde(default)]
    pub destination_grade: Option<u32>,
    /// Date used to select the salary table; defaults to today.
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
}

/// Request body for the `/step-increment` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepIncrementRequest {
    /// The period being processed. Each period is processed once.
    pub period_id: String,
    /// The date the increments take effect.
    pub effective_date: NaiveDate,
    /// Snapshot of the staff directory.
    pub staff: Vec<StaffRequest>,
}

/// Candidate information in a request.
///
/// The periodic performance score may be given directly or derived from
/// goal ratings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRequest {
    /// Unique identifier for the candidate.
    pub id: String,
    /// The grade currently held.
    pub current_grade: u32,
    /// The step currently held.
    pub current_step: u32,
    /// Date of confirmation of appointment.
    #[serde(default)]
    pub confirmation_date: Option<NaiveDate>,
    /// Date of birth.
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Personnel file number.
    pub file_number: String,
    /// Date of the last promotion.
    #[serde(default)]
    pub date_of_last_promotion: Option<NaiveDate>,
    /// Date of first appointment.
    #[serde(default)]
    pub date_of_first_appointment: Option<NaiveDate>,
    /// Number of failed promotion attempts.
    #[serde(default)]
    pub failed_promotion_attempts: u32,
    /// Promotion exam score (0-100).
    pub exam_score: Decimal,
    /// Periodic performance score (0-100).
    #[serde(default)]
    pub periodic_performance_score: Option<Decimal>,
    /// Goal ratings used when no performance score is given.
    #[serde(default)]
    pub goal_ratings: Vec<GoalRating>,
    /// Whether the candidate is an active staff member.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl CandidateRequest {
    /// Converts the request into a candidate record.
    ///
    /// When the performance score is derived from goal ratings, the audit step
    /// of that derivation is returned alongside the record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCandidate` if neither a performance score nor goal
    /// ratings are given, or if a goal rating is invalid.
    pub fn into_record(self, step_number: u32) -> EngineResult<(CandidateRecord, Option<AuditStep>)> {
        let (performance, audit_step) = match self.periodic_performance_score {
            Some(score) => (score, None),
            None if !self.goal_ratings.is_empty() => {
                let result = performance_percentage(&self.id, &self.goal_ratings, step_number)?;
                (result.percentage, Some(result.audit_step))
            }
            None => {
                return Err(EngineError::invalid_candidate(
                    &self.id,
                    "periodic_performance_score",
                    "either a performance score or goal ratings must be provided",
                ));
            }
        };

        let record = CandidateRecord {
            id: self.id,
            current_grade: self.current_grade,
            current_step: self.current_step,
            confirmation_date: self.confirmation_date,
            date_of_birth: self.date_of_birth,
            file_number: self.file_number,
            date_of_last_promotion: self.date_of_last_promotion,
            date_of_first_appointment: self.date_of_first_appointment,
            failed_promotion_attempts: self.failed_promotion_attempts,
            exam_score: self.exam_score,
            periodic_performance_score: performance,
            is_active: self.is_active,
        };
        Ok((record, audit_step))
    }
}

/// Slot counts for one grade in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyRequest {
    /// The grade. Ignored by `/eligibility`, which uses the candidate's grade.
    #[serde(default)]
    pub grade: u32,
    /// Number of promotion slots.
    pub promotion_slots: i64,
    /// Number of recognition slots.
    #[serde(default)]
    pub recognition_slots: i64,
    /// Number of reward slots.
    #[serde(default)]
    pub reward_slots: i64,
}

impl VacancyRequest {
    /// Builds a vacancy config for a grade and cycle.
    pub fn to_config(&self, grade: u32, promotion_cycle_id: &str) -> EngineResult<VacancyConfig> {
        VacancyConfig::new(
            grade,
            promotion_cycle_id,
            self.promotion_slots,
            self.recognition_slots,
            self.reward_slots,
        )
    }
}

/// Staff information in a step increment request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRequest {
    /// Unique identifier for the staff member.
    pub id: String,
    /// The grade currently held.
    pub current_grade: u32,
    /// The step currently held.
    pub current_step: u32,
    /// Whether the staff member is active.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl From<StaffRequest> for CandidateRecord {
    fn from(req: StaffRequest) -> Self {
        CandidateRecord {
            file_number: req.id.clone(),
            id: req.id,
            current_grade: req.current_grade,
            current_step: req.current_step,
            confirmation_date: None,
            date_of_birth: None,
            date_of_last_promotion: None,
            date_of_first_appointment: None,
            failed_promotion_attempts: 0,
            exam_score: Decimal::ZERO,
            periodic_performance_score: Decimal::ZERO,
            is_active: req.is_active,
        }
    }
}

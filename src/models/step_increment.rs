//! Step increment models.
//!
//! A [`StepIncrementRecord`] is the append-only ledger entry for a single step
//! change, whether it came from the annual increment or from a promotion.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditTrace, CandidateIssue};

/// Why a step changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncrementReason {
    /// The recurring per-period increment.
    Annual,
    /// Placement after a grade promotion.
    Promotion,
}

/// A single recorded step change.
///
/// # Example
///
/// ```
/// use promotion_engine::models::{IncrementReason, StepIncrementRecord};
/// use chrono::NaiveDate;
///
/// let record = StepIncrementRecord {
///     candidate_id: "staff_001".to_string(),
///     grade: 6,
///     period_id: "2025-01".to_string(),
///     previous_step: 4,
///     new_step: 5,
///     effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     reason: IncrementReason::Annual,
/// };
/// assert_eq!(record.new_step, record.previous_step + 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepIncrementRecord {
    /// The staff member whose step changed.
    pub candidate_id: String,
    /// The grade held after the change.
    pub grade: u32,
    /// The period or cycle that produced the change.
    pub period_id: String,
    /// The step before the change.
    pub previous_step: u32,
    /// The step after the change.
    pub new_step: u32,
    /// The date the change takes effect.
    pub effective_date: NaiveDate,
    /// Why the step changed.
    pub reason: IncrementReason,
}

/// Counts reported at the end of a step-increment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementSummary {
    /// Staff whose step was raised.
    pub incremented: u32,
    /// Staff already at the maximum step.
    pub skipped: u32,
    /// Staff whose records failed validation.
    pub invalid: u32,
    /// Active staff examined.
    pub total_processed: u32,
}

/// The result of a step-increment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementOutcome {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the run.
    pub engine_version: String,
    /// The period that was processed.
    pub period_id: String,
    /// The effective date of the increments.
    pub effective_date: NaiveDate,
    /// True when the period had already been processed and nothing was changed.
    pub already_processed: bool,
    /// The records for the period (new, or the existing ones on a repeat run).
    pub records: Vec<StepIncrementRecord>,
    /// Staff records that could not be processed.
    pub issues: Vec<CandidateIssue>,
    /// Counts for the run.
    pub summary: IncrementSummary,
    /// Audit trace of the run.
    pub audit_trace: AuditTrace,
}

//! Allocation result models.
//!
//! This module contains the [`CycleOutcome`] produced by a promotion cycle run
//! and the per-grade and per-candidate structures it is built from.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    AuditTrace, AwardTier, CandidateRecord, IncrementReason, IneligibilityReason,
    StepIncrementRecord, VacancyConfig,
};
use crate::error::EngineError;

/// A candidate with every score computed, ready for allocation.
///
/// Built once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// The underlying candidate snapshot.
    pub candidate: CandidateRecord,
    /// Exam score (0-100).
    pub exam_score: Decimal,
    /// Periodic performance score (0-100).
    pub performance_score: Decimal,
    /// Seniority score derived from seniority rank (0-100).
    pub seniority_score: Decimal,
    /// Weighted combined score (0-100).
    pub combined_score: Decimal,
    /// 1-indexed position in the seniority order.
    pub seniority_rank: u32,
    /// 1-indexed position in the final combined ranking.
    pub rank_within_grade: u32,
    /// Number of ranked candidates in the grade.
    pub total_in_grade: u32,
}

/// The allocation decision for one ranked candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// The candidate the decision applies to.
    pub candidate_id: String,
    /// The grade the candidate held when ranked.
    pub grade: u32,
    /// The step the candidate held when ranked.
    pub current_step: u32,
    /// The promotion cycle.
    pub promotion_cycle_id: String,
    /// Exam score (0-100).
    pub exam_score: Decimal,
    /// Periodic performance score (0-100).
    pub performance_score: Decimal,
    /// Seniority score (0-100).
    pub seniority_score: Decimal,
    /// Weighted combined score (0-100).
    pub combined_score: Decimal,
    /// 1-indexed position in the final ranking.
    pub rank_within_grade: u32,
    /// Number of ranked candidates in the grade.
    pub total_in_grade: u32,
    /// Selected for promotion.
    pub is_promoted: bool,
    /// Selected for recognition.
    pub is_recognized: bool,
    /// Selected for reward.
    pub is_rewarded: bool,
    /// The grade promoted to.
    pub promoted_to_grade: Option<u32>,
    /// The step placed at in the new grade.
    pub promoted_to_step: Option<u32>,
    /// The annual salary at the new grade and step.
    pub promoted_salary: Option<Decimal>,
    /// True when the step placement fell back and needs a human check.
    pub needs_review: bool,
}

impl AllocationResult {
    /// Returns the tiers this candidate was selected for.
    pub fn tiers(&self) -> Vec<AwardTier> {
        AwardTier::ALL
            .into_iter()
            .filter(|tier| match tier {
                AwardTier::Promotion => self.is_promoted,
                AwardTier::Recognition => self.is_recognized,
                AwardTier::Reward => self.is_rewarded,
            })
            .collect()
    }

    /// Builds the step record the workflow appends once a promotion is approved.
    ///
    /// Returns `None` unless the candidate was promoted and placed.
    pub fn promotion_step_record(&self, effective_date: NaiveDate) -> Option<StepIncrementRecord> {
        if !self.is_promoted {
            return None;
        }
        Some(StepIncrementRecord {
            candidate_id: self.candidate_id.clone(),
            grade: self.promoted_to_grade?,
            period_id: self.promotion_cycle_id.clone(),
            previous_step: self.current_step,
            new_step: self.promoted_to_step?,
            effective_date,
            reason: IncrementReason::Promotion,
        })
    }
}

/// A candidate filtered out before ranking, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IneligibleCandidate {
    /// The candidate.
    pub candidate_id: String,
    /// The grade the candidate holds.
    pub grade: u32,
    /// Why the candidate was filtered out.
    pub reason: IneligibilityReason,
}

/// A candidate record that failed input validation and was excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateIssue {
    /// The candidate.
    pub candidate_id: String,
    /// The offending field, when known.
    pub field: Option<String>,
    /// A description of the problem.
    pub message: String,
}

impl CandidateIssue {
    /// Builds an issue from the error that excluded a candidate.
    pub fn from_error(candidate_id: &str, error: &EngineError) -> Self {
        let field = match error {
            EngineError::InvalidCandidate { field, .. } => Some(field.clone()),
            EngineError::ScoreOutOfRange { component, .. } => Some(format!("{component}_score")),
            EngineError::UnknownGrade { .. } => Some("current_grade".to_string()),
            _ => None,
        };
        CandidateIssue {
            candidate_id: candidate_id.to_string(),
            field,
            message: error.to_string(),
        }
    }
}

/// Award counts for a grade or a whole cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSummary {
    /// Candidates ranked.
    pub total: u32,
    /// Candidates promoted.
    pub promoted: u32,
    /// Candidates recognized.
    pub recognized: u32,
    /// Candidates rewarded.
    pub rewarded: u32,
}

impl AllocationSummary {
    /// Counts the flags set across a set of results.
    pub fn from_results(results: &[AllocationResult]) -> Self {
        results.iter().fold(AllocationSummary::default(), |mut acc, r| {
            acc.total += 1;
            acc.promoted += u32::from(r.is_promoted);
            acc.recognized += u32::from(r.is_recognized);
            acc.rewarded += u32::from(r.is_rewarded);
            acc
        })
    }

    /// Adds another summary's counts into this one.
    pub fn absorb(&mut self, other: &AllocationSummary) {
        self.total += other.total;
        self.promoted += other.promoted;
        self.recognized += other.recognized;
        self.rewarded += other.rewarded;
    }
}

/// The allocation for a single grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeAllocation {
    /// The grade candidates held.
    pub grade: u32,
    /// The vacancy configuration applied, if the grade had one.
    pub vacancy: Option<VacancyConfig>,
    /// One result per ranked candidate, in rank order.
    pub results: Vec<AllocationResult>,
    /// Candidates filtered out by eligibility.
    pub ineligible: Vec<IneligibleCandidate>,
    /// Counts for the grade.
    pub summary: AllocationSummary,
}

/// The complete result of a promotion cycle run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleOutcome {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the run.
    pub engine_version: String,
    /// The promotion cycle.
    pub promotion_cycle_id: String,
    /// The date eligibility was evaluated on.
    pub evaluation_date: NaiveDate,
    /// The effective date of the salary table used for step placement.
    pub salary_table_effective_date: NaiveDate,
    /// Per-grade allocations in ascending grade order.
    pub grades: Vec<GradeAllocation>,
    /// Candidates excluded by input validation.
    pub issues: Vec<CandidateIssue>,
    /// Counts across every grade.
    pub summary: AllocationSummary,
    /// Audit trace of the run.
    pub audit_trace: AuditTrace,
}

impl CycleOutcome {
    /// Iterates over every allocation result across grades.
    pub fn results(&self) -> impl Iterator<Item = &AllocationResult> {
        self.grades.iter().flat_map(|g| g.results.iter())
    }

    /// Finds the result for a candidate.
    pub fn result_for(&self, candidate_id: &str) -> Option<&AllocationResult> {
        self.results().find(|r| r.candidate_id == candidate_id)
    }
}

//! Core data models for the Promotion Allocation Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod allocation;
mod audit;
mod candidate;
mod eligibility;
mod grade;
mod salary;
mod step_increment;
mod vacancy;

pub use allocation::{
    AllocationResult, AllocationSummary, CandidateIssue, CycleOutcome, GradeAllocation,
    IneligibleCandidate, ScoredCandidate,
};
pub use audit::{
    AuditStep, AuditTrace, AuditWarning, WARN_NO_VACANCY_CONFIG, WARN_NON_MONOTONIC_SALARY,
    WARN_PERIOD_ALREADY_PROCESSED, WARN_STEP_FALLBACK, WarningSeverity,
};
pub use candidate::CandidateRecord;
pub use eligibility::{EligibilityStatus, IneligibilityReason};
pub use grade::{CONRAISS_RANGES, GradeStepBounds};
pub use salary::{SalaryTable, SalaryTableEntry};
pub use step_increment::{IncrementOutcome, IncrementReason, IncrementSummary, StepIncrementRecord};
pub use vacancy::{AwardTier, VacancyConfig};

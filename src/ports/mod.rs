//! Collaborator interfaces.
//!
//! The engine reads staff and disciplinary data and reads/writes the step
//! increment ledger through these traits. Results are handed to an
//! [`AuditSink`]. In-memory implementations live in [`memory`].

pub mod memory;

use crate::error::EngineResult;
use crate::models::{CandidateRecord, CycleOutcome, IncrementOutcome, StepIncrementRecord};

/// Source of staff records and target of step updates.
pub trait StaffDirectory: Send + Sync {
    /// Returns a snapshot of every active staff member.
    fn active_staff(&self) -> EngineResult<Vec<CandidateRecord>>;

    /// Sets a staff member's step.
    fn set_step(&mut self, candidate_id: &str, new_step: u32) -> EngineResult<()>;
}

/// Answers whether a staff member is under an active disciplinary hold.
pub trait DisciplinaryStatusProvider: Send + Sync {
    /// Returns true if the staff member has an active hold.
    fn has_active_hold(&self, candidate_id: &str) -> EngineResult<bool>;
}

/// Append-only store of processed periods and their step increment records.
pub trait IncrementLedger: Send + Sync {
    /// Returns true if the period was committed, even with no records.
    fn is_period_processed(&self, period_id: &str) -> EngineResult<bool>;

    /// Returns the records already written for a period.
    fn records_for_period(&self, period_id: &str) -> EngineResult<Vec<StepIncrementRecord>>;

    /// Marks a period processed and appends its records in one write.
    ///
    /// A period can be committed only once.
    fn commit_period(
        &mut self,
        period_id: &str,
        records: &[StepIncrementRecord],
    ) -> EngineResult<()>;
}

/// Receives the outcome of every run.
pub trait AuditSink: Send + Sync {
    /// Records a promotion cycle outcome.
    fn record_cycle(&mut self, outcome: &CycleOutcome) -> EngineResult<()>;

    /// Records a step increment outcome.
    fn record_increment(&mut self, outcome: &IncrementOutcome) -> EngineResult<()>;
}

//! In-memory collaborators for tests and the HTTP service.

use std::collections::{BTreeSet, HashSet};

use crate::error::{EngineError, EngineResult};
use crate::models::{CandidateRecord, CycleOutcome, IncrementOutcome, StepIncrementRecord};

use super::{AuditSink, DisciplinaryStatusProvider, IncrementLedger, StaffDirectory};

/// A staff directory backed by a vector.
#[derive(Debug, Clone, Default)]
pub struct MemoryStaffDirectory {
    staff: Vec<CandidateRecord>,
}

impl MemoryStaffDirectory {
    /// Creates a directory holding the given staff.
    pub fn new(staff: Vec<CandidateRecord>) -> Self {
        Self { staff }
    }

    /// Every staff member, active or not.
    pub fn staff(&self) -> &[CandidateRecord] {
        &self.staff
    }

    /// Looks up a staff member by id.
    pub fn get(&self, candidate_id: &str) -> Option<&CandidateRecord> {
        self.staff.iter().find(|c| c.id == candidate_id)
    }
}

impl StaffDirectory for MemoryStaffDirectory {
    fn active_staff(&self) -> EngineResult<Vec<CandidateRecord>> {
        Ok(self.staff.iter().filter(|c| c.is_active).cloned().collect())
    }

    fn set_step(&mut self, candidate_id: &str, new_step: u32) -> EngineResult<()> {
        let record = self
            .staff
            .iter_mut()
            .find(|c| c.id == candidate_id)
            .ok_or_else(|| EngineError::CollaboratorError {
                collaborator: "staff directory".to_string(),
                message: format!("no staff member with id '{candidate_id}'"),
            })?;
        record.current_step = new_step;
        Ok(())
    }
}

/// A disciplinary registry holding the ids of staff under an active hold.
#[derive(Debug, Clone, Default)]
pub struct MemoryDisciplinaryRegistry {
    holds: HashSet<String>,
}

impl MemoryDisciplinaryRegistry {
    /// Creates a registry with the given holds.
    pub fn new(holds: impl IntoIterator<Item = String>) -> Self {
        Self {
            holds: holds.into_iter().collect(),
        }
    }
}

impl DisciplinaryStatusProvider for MemoryDisciplinaryRegistry {
    fn has_active_hold(&self, candidate_id: &str) -> EngineResult<bool> {
        Ok(self.holds.contains(candidate_id))
    }
}

/// An increment ledger backed by a vector.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    records: Vec<StepIncrementRecord>,
    processed_periods: BTreeSet<String>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record ever appended, in append order.
    pub fn records(&self) -> &[StepIncrementRecord] {
        &self.records
    }
}

impl IncrementLedger for MemoryLedger {
    fn is_period_processed(&self, period_id: &str) -> EngineResult<bool> {
        Ok(self.processed_periods.contains(period_id))
    }

    fn records_for_period(&self, period_id: &str) -> EngineResult<Vec<StepIncrementRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.period_id == period_id)
            .cloned()
            .collect())
    }

    fn commit_period(
        &mut self,
        period_id: &str,
        records: &[StepIncrementRecord],
    ) -> EngineResult<()> {
        if !self.processed_periods.insert(period_id.to_string()) {
            return Err(EngineError::CollaboratorError {
                collaborator: "increment ledger".to_string(),
                message: format!("period '{period_id}' is already committed"),
            });
        }
        self.records.extend_from_slice(records);
        Ok(())
    }
}

/// An audit sink that keeps every outcome it receives.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    /// Recorded cycle outcomes.
    pub cycles: Vec<CycleOutcome>,
    /// Recorded increment outcomes.
    pub increments: Vec<IncrementOutcome>,
}

impl AuditSink for MemoryAuditSink {
    fn record_cycle(&mut self, outcome: &CycleOutcome) -> EngineResult<()> {
        self.cycles.push(outcome.clone());
        Ok(())
    }

    fn record_increment(&mut self, outcome: &IncrementOutcome) -> EngineResult<()> {
        self.increments.push(outcome.clone());
        Ok(())
    }
}

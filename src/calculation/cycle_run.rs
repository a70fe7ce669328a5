//! Promotion cycle orchestration.
//!
//! A cycle run validates its configuration, snapshots the staff directory and
//! disciplinary status, then allocates every grade independently in ascending
//! grade order. Configuration problems abort the run before any candidate is
//! looked at; candidate problems exclude only that candidate.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::validation::validate_candidate;
use super::vacancy_allocation::{AllocationContext, allocate_grade};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AllocationSummary, AuditTrace, AuditWarning, CandidateIssue, CandidateRecord, CycleOutcome,
    GradeAllocation, GradeStepBounds, IneligibilityReason, IneligibleCandidate, SalaryTable,
    VacancyConfig, WARN_NO_VACANCY_CONFIG, WARN_NON_MONOTONIC_SALARY, WarningSeverity,
};
use crate::ports::{DisciplinaryStatusProvider, StaffDirectory};

/// The configuration a cycle run is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct CycleParameters<'a> {
    /// The promotion cycle.
    pub promotion_cycle_id: &'a str,
    /// The date eligibility is evaluated on.
    pub evaluation_date: NaiveDate,
    /// Slot counts per grade for the cycle.
    pub vacancies: &'a [VacancyConfig],
    /// The salary table used for step placement.
    pub salary_table: &'a SalaryTable,
    /// Maximum steps per grade.
    pub bounds: &'a GradeStepBounds,
}

/// Checks the vacancy configs for a cycle.
///
/// Every config must belong to the cycle, name a known grade and appear at
/// most once per grade.
pub fn validate_vacancies(
    vacancies: &[VacancyConfig],
    promotion_cycle_id: &str,
    bounds: &GradeStepBounds,
) -> EngineResult<()> {
    let mut seen = HashSet::new();
    for vacancy in vacancies {
        if vacancy.promotion_cycle_id != promotion_cycle_id {
            return Err(EngineError::InvalidVacancy {
                grade: vacancy.grade,
                cycle_id: vacancy.promotion_cycle_id.clone(),
                message: format!("does not belong to cycle '{promotion_cycle_id}'"),
            });
        }
        if !bounds.contains(vacancy.grade) {
            return Err(EngineError::UnknownGrade {
                grade: vacancy.grade,
            });
        }
        if !seen.insert(vacancy.grade) {
            return Err(EngineError::InvalidVacancy {
                grade: vacancy.grade,
                cycle_id: vacancy.promotion_cycle_id.clone(),
                message: "grade is configured more than once".to_string(),
            });
        }
    }
    Ok(())
}

/// Runs a promotion cycle over the directory's active staff.
///
/// # Errors
///
/// Returns a configuration error if the vacancies are invalid, or if a
/// promoted candidate's salary cannot be looked up. Collaborator failures are
/// propagated. Nothing is emitted on failure.
pub fn run_promotion_cycle<D, P>(
    params: &CycleParameters<'_>,
    directory: &D,
    discipline: &P,
) -> EngineResult<CycleOutcome>
where
    D: StaffDirectory + ?Sized,
    P: DisciplinaryStatusProvider + ?Sized,
{
    let start_time = Instant::now();
    let run_id = Uuid::new_v4();
    info!(
        run_id = %run_id,
        cycle_id = params.promotion_cycle_id,
        evaluation_date = %params.evaluation_date,
        vacancies = params.vacancies.len(),
        "Starting promotion cycle"
    );

    validate_vacancies(params.vacancies, params.promotion_cycle_id, params.bounds)?;

    let mut trace = AuditTrace::default();
    for grade in params.salary_table.non_monotonic_grades() {
        warn!(run_id = %run_id, grade, "Salary decreases with step");
        trace.warnings.push(AuditWarning::new(
            WARN_NON_MONOTONIC_SALARY,
            format!("Salary for grade {grade} decreases as the step rises"),
            WarningSeverity::Medium,
        ));
    }

    // Snapshot every input before computing anything.
    let staff = directory.active_staff()?;
    let mut holds = HashSet::new();
    for member in &staff {
        if discipline.has_active_hold(&member.id)? {
            holds.insert(member.id.clone());
        }
    }

    let mut issues = Vec::new();
    let mut by_grade: BTreeMap<u32, Vec<CandidateRecord>> = BTreeMap::new();
    for member in staff.into_iter().filter(|c| c.is_active) {
        match validate_candidate(&member, params.bounds, params.evaluation_date) {
            Ok(()) => by_grade.entry(member.current_grade).or_default().push(member),
            Err(err) => {
                warn!(run_id = %run_id, candidate_id = %member.id, error = %err, "Excluding invalid candidate");
                issues.push(CandidateIssue::from_error(&member.id, &err));
            }
        }
    }

    let vacancies: BTreeMap<u32, &VacancyConfig> =
        params.vacancies.iter().map(|v| (v.grade, v)).collect();
    let grades: BTreeSet<u32> = vacancies.keys().chain(by_grade.keys()).copied().collect();

    let mut allocations = Vec::with_capacity(grades.len());
    let mut summary = AllocationSummary::default();
    for grade in grades {
        let candidates = by_grade.remove(&grade).unwrap_or_default();

        let Some(vacancy) = vacancies.get(&grade).copied() else {
            warn!(run_id = %run_id, grade, candidates = candidates.len(), "No vacancy configuration for grade");
            trace.warnings.push(AuditWarning::new(
                WARN_NO_VACANCY_CONFIG,
                format!(
                    "Grade {} has {} candidate(s) but no vacancy configuration in cycle '{}'",
                    grade,
                    candidates.len(),
                    params.promotion_cycle_id
                ),
                WarningSeverity::Low,
            ));
            allocations.push(GradeAllocation {
                grade,
                vacancy: None,
                results: Vec::new(),
                ineligible: candidates
                    .iter()
                    .map(|c| IneligibleCandidate {
                        candidate_id: c.id.clone(),
                        grade,
                        reason: IneligibilityReason::NoVacancy,
                    })
                    .collect(),
                summary: AllocationSummary::default(),
            });
            continue;
        };

        let context = AllocationContext {
            vacancy,
            evaluation_date: params.evaluation_date,
            disciplinary_holds: &holds,
            salary_table: params.salary_table,
            bounds: params.bounds,
        };
        let result = allocate_grade(&candidates, &context, trace.next_step_number())?;

        debug!(
            run_id = %run_id,
            grade,
            ranked = result.allocation.summary.total,
            ineligible = result.allocation.ineligible.len(),
            promoted = result.allocation.summary.promoted,
            recognized = result.allocation.summary.recognized,
            rewarded = result.allocation.summary.rewarded,
            "Grade allocated"
        );
        for warning in &result.warnings {
            warn!(run_id = %run_id, grade, code = %warning.code, message = %warning.message, "Allocation anomaly");
        }

        summary.absorb(&result.allocation.summary);
        trace.steps.extend(result.audit_steps);
        trace.warnings.extend(result.warnings);
        allocations.push(result.allocation);
    }

    trace.duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        run_id = %run_id,
        cycle_id = params.promotion_cycle_id,
        grades = allocations.len(),
        ranked = summary.total,
        promoted = summary.promoted,
        recognized = summary.recognized,
        rewarded = summary.rewarded,
        issues = issues.len(),
        warnings = trace.warnings.len(),
        duration_us = trace.duration_us,
        "Promotion cycle completed"
    );

    Ok(CycleOutcome {
        run_id,
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        promotion_cycle_id: params.promotion_cycle_id.to_string(),
        evaluation_date: params.evaluation_date,
        salary_table_effective_date: params.salary_table.effective_date(),
        grades: allocations,
        issues,
        summary,
        audit_trace: trace,
    })
}

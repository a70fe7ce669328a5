//! Periodic step increment.
//!
//! Once per period every active staff member below their grade's maximum step
//! moves up one step. A period is processed at most once: the ledger marks the
//! period before any step changes, so a repeated run finds the mark and
//! changes nothing.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::validation::validate_placement;
use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, CandidateIssue, CandidateRecord, GradeStepBounds,
    IncrementOutcome, IncrementReason, IncrementSummary, StepIncrementRecord,
    WARN_PERIOD_ALREADY_PROCESSED, WarningSeverity,
};
use crate::ports::{IncrementLedger, StaffDirectory};

/// The increments computed for a period, before anything is applied.
#[derive(Debug, Clone)]
pub struct IncrementPlan {
    /// One record per staff member to move up a step.
    pub records: Vec<StepIncrementRecord>,
    /// Staff records that failed validation.
    pub issues: Vec<CandidateIssue>,
    /// Counts for the period.
    pub summary: IncrementSummary,
    /// One audit step per staff member examined.
    pub audit_steps: Vec<AuditStep>,
}

/// Computes the step increments for a period without touching any state.
///
/// Inactive staff are ignored. Staff at their grade's maximum step are
/// skipped; staff with an unknown grade or an out-of-range step are reported
/// as issues.
pub fn plan_step_increments(
    period_id: &str,
    effective_date: NaiveDate,
    staff: &[CandidateRecord],
    bounds: &GradeStepBounds,
    step_number: u32,
) -> IncrementPlan {
    let mut records = Vec::new();
    let mut issues = Vec::new();
    let mut audit_steps = Vec::new();
    let mut summary = IncrementSummary::default();
    let mut step_number = step_number;

    for member in staff.iter().filter(|c| c.is_active) {
        summary.total_processed += 1;

        let max_step = match validate_placement(member, bounds) {
            Ok(max_step) => max_step,
            Err(err) => {
                summary.invalid += 1;
                issues.push(CandidateIssue::from_error(&member.id, &err));
                continue;
            }
        };

        let (output, reasoning) = if member.current_step < max_step {
            let new_step = member.current_step + 1;
            records.push(StepIncrementRecord {
                candidate_id: member.id.clone(),
                grade: member.current_grade,
                period_id: period_id.to_string(),
                previous_step: member.current_step,
                new_step,
                effective_date,
                reason: IncrementReason::Annual,
            });
            summary.incremented += 1;
            (
                serde_json::json!({ "new_step": new_step, "incremented": true }),
                format!(
                    "Step {} -> {} in grade {} (maximum {})",
                    member.current_step, new_step, member.current_grade, max_step
                ),
            )
        } else {
            summary.skipped += 1;
            (
                serde_json::json!({ "new_step": member.current_step, "incremented": false }),
                format!(
                    "Already at maximum step {} for grade {}",
                    max_step, member.current_grade
                ),
            )
        };

        audit_steps.push(AuditStep {
            step_number,
            rule_id: "annual_increment".to_string(),
            rule_name: "Annual Step Increment".to_string(),
            subject: member.id.clone(),
            input: serde_json::json!({
                "grade": member.current_grade,
                "current_step": member.current_step,
                "max_step": max_step,
                "period_id": period_id
            }),
            output,
            reasoning,
        });
        step_number += 1;
    }

    IncrementPlan {
        records,
        issues,
        summary,
        audit_steps,
    }
}

/// Runs the step increment for a period.
///
/// The ledger is checked for the period once, before anything else. If the
/// period was already processed, its records are returned with a warning and
/// nothing changes; the summary then counts only those records as
/// incremented. Otherwise all increments are computed first, the period is
/// committed to the ledger, and only then are the steps written to the
/// directory. A period that increments nobody is still committed.
///
/// # Errors
///
/// Propagates collaborator failures from the directory or the ledger.
pub fn run_step_increment<D, L>(
    period_id: &str,
    effective_date: NaiveDate,
    directory: &mut D,
    ledger: &mut L,
    bounds: &GradeStepBounds,
) -> EngineResult<IncrementOutcome>
where
    D: StaffDirectory + ?Sized,
    L: IncrementLedger + ?Sized,
{
    let start_time = Instant::now();
    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, period_id, %effective_date, "Starting step increment");

    if ledger.is_period_processed(period_id)? {
        let existing = ledger.records_for_period(period_id)?;
        let incremented = existing.len() as u32;
        warn!(
            run_id = %run_id,
            period_id,
            existing_records = existing.len(),
            "Period already processed; returning existing records"
        );
        let warning = AuditWarning::new(
            WARN_PERIOD_ALREADY_PROCESSED,
            format!(
                "Period '{}' was already processed with {} step increment record(s); nothing was changed",
                period_id,
                existing.len()
            ),
            WarningSeverity::Low,
        );
        return Ok(IncrementOutcome {
            run_id,
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            period_id: period_id.to_string(),
            effective_date,
            already_processed: true,
            records: existing,
            issues: Vec::new(),
            summary: IncrementSummary {
                incremented,
                ..IncrementSummary::default()
            },
            audit_trace: AuditTrace {
                steps: Vec::new(),
                warnings: vec![warning],
                duration_us: start_time.elapsed().as_micros() as u64,
            },
        });
    }

    let staff = directory.active_staff()?;
    let plan = plan_step_increments(period_id, effective_date, &staff, bounds, 1);

    for issue in &plan.issues {
        warn!(run_id = %run_id, candidate_id = %issue.candidate_id, error = %issue.message, "Skipping invalid staff record");
    }

    ledger.commit_period(period_id, &plan.records)?;

    for record in &plan.records {
        debug!(
            run_id = %run_id,
            candidate_id = %record.candidate_id,
            previous_step = record.previous_step,
            new_step = record.new_step,
            "Applying step increment"
        );
        directory.set_step(&record.candidate_id, record.new_step)?;
    }

    let duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        run_id = %run_id,
        period_id,
        incremented = plan.summary.incremented,
        skipped = plan.summary.skipped,
        invalid = plan.summary.invalid,
        total_processed = plan.summary.total_processed,
        duration_us,
        "Step increment completed"
    );

    Ok(IncrementOutcome {
        run_id,
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        period_id: period_id.to_string(),
        effective_date,
        already_processed: false,
        records: plan.records,
        issues: plan.issues,
        summary: plan.summary,
        audit_trace: AuditTrace {
            steps: plan.audit_steps,
            warnings: Vec::new(),
            duration_us,
        },
    })
}

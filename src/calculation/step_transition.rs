//! Step placement across a grade promotion.
//!
//! A promoted staff member lands on the lowest step of the destination grade
//! that pays strictly more than their current salary. When no such step exists
//! (compressed salary bands), the placement falls back to the destination
//! grade's maximum step and is flagged for manual review.

use rust_decimal::Decimal;
use serde::Serialize;

use super::combined_score::round_2dp;
use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditWarning, GradeStepBounds, SalaryTable, WARN_STEP_FALLBACK, WarningSeverity,
};

/// The recommended placement in the destination grade.
#[derive(Debug, Clone, Serialize)]
pub struct StepTransition {
    /// Grade held before promotion.
    pub current_grade: u32,
    /// Step held before promotion.
    pub current_step: u32,
    /// Salary before promotion.
    pub current_salary: Decimal,
    /// Grade promoted to.
    pub destination_grade: u32,
    /// Step placed at in the destination grade.
    pub new_step: u32,
    /// Salary at the new grade and step.
    pub new_salary: Decimal,
    /// `new_salary - current_salary`.
    pub salary_increment: Decimal,
    /// Increment as a percentage of the current salary, 2 dp.
    pub increment_percentage: Decimal,
    /// True when no step paid more and the maximum step was used instead.
    pub needs_review: bool,
    /// The anomaly raised for a fallback placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<AuditWarning>,
    /// The audit step recording this placement.
    pub audit_step: AuditStep,
}

/// Resolves the destination step for a promotion.
///
/// Only steps up to the destination grade's maximum are considered.
///
/// # Errors
///
/// * `SalaryNotFound` if the current grade and step, or the fallback maximum
///   step, have no salary entry
/// * `UnknownGrade` if the destination grade has no step bounds
///
/// # Examples
///
/// ```
/// use promotion_engine::calculation::resolve_step;
/// use promotion_engine::models::{GradeStepBounds, SalaryTable, SalaryTableEntry};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let entry = |grade, step, amount| SalaryTableEntry {
///     grade,
///     step,
///     annual_amount: Decimal::new(amount, 0),
/// };
/// let table = SalaryTable::from_entries(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     vec![entry(6, 5, 600), entry(7, 1, 580), entry(7, 2, 610), entry(7, 3, 640)],
/// )
/// .unwrap();
///
/// let transition = resolve_step(&table, &GradeStepBounds::conraiss(), 6, 5, 7, 1).unwrap();
/// assert_eq!(transition.new_step, 2);
/// assert_eq!(transition.new_salary, Decimal::new(610, 0));
/// assert!(!transition.needs_review);
/// ```
pub fn resolve_step(
    table: &SalaryTable,
    bounds: &GradeStepBounds,
    current_grade: u32,
    current_step: u32,
    destination_grade: u32,
    step_number: u32,
) -> EngineResult<StepTransition> {
    let current_salary = table.amount(current_grade, current_step)?;
    let max_step = bounds.max_step(destination_grade)?;

    let placement = table
        .steps(destination_grade)
        .take_while(|(step, _)| *step <= max_step)
        .find(|(_, amount)| *amount > current_salary);

    let (new_step, new_salary, needs_review) = match placement {
        Some((step, amount)) => (step, amount, false),
        None => (max_step, table.amount(destination_grade, max_step)?, true),
    };

    let salary_increment = new_salary - current_salary;
    let increment_percentage = if current_salary.is_zero() {
        Decimal::ZERO
    } else {
        round_2dp(salary_increment / current_salary * Decimal::ONE_HUNDRED)
    };

    let warning = needs_review.then(|| {
        AuditWarning::new(
            WARN_STEP_FALLBACK,
            format!(
                "No step in grade {} up to step {} pays more than {} (grade {} step {}); placed at step {} for manual review",
                destination_grade, max_step, current_salary, current_grade, current_step, max_step
            ),
            WarningSeverity::High,
        )
    });

    let reasoning = if needs_review {
        format!(
            "No step in grade {} exceeds {}; fell back to maximum step {} at {}",
            destination_grade, current_salary, new_step, new_salary
        )
    } else {
        format!(
            "Step {} is the lowest step in grade {} paying more than {}: {} (+{}, {}%)",
            new_step, destination_grade, current_salary, new_salary, salary_increment, increment_percentage
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "step_transition".to_string(),
        rule_name: "Promotion Step Placement".to_string(),
        subject: format!("grade {current_grade} step {current_step}"),
        input: serde_json::json!({
            "current_grade": current_grade,
            "current_step": current_step,
            "current_salary": current_salary.to_string(),
            "destination_grade": destination_grade,
            "destination_max_step": max_step,
            "salary_table_effective_date": table.effective_date().to_string()
        }),
        output: serde_json::json!({
            "new_step": new_step,
            "new_salary": new_salary.to_string(),
            "salary_increment": salary_increment.to_string(),
            "increment_percentage": increment_percentage.to_string(),
            "needs_review": needs_review
        }),
        reasoning,
    };

    Ok(StepTransition {
        current_grade,
        current_step,
        current_salary,
        destination_grade,
        new_step,
        new_salary,
        salary_increment,
        increment_percentage,
        needs_review,
        warning,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::SalaryTableEntry;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn entry(grade: u32, step: u32, amount: &str) -> SalaryTableEntry {
        SalaryTableEntry {
            grade,
            step,
            annual_amount: dec(amount),
        }
    }

    fn table(entries: Vec<SalaryTableEntry>) -> SalaryTable {
        SalaryTable::from_entries(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), entries).unwrap()
    }

    fn bounds() -> GradeStepBounds {
        GradeStepBounds::conraiss()
    }

    #[test]
    fn test_lowest_step_strictly_greater() {
        let table = table(vec![
            entry(6, 8, "700000.00"),
            entry(7, 1, "650000.00"),
            entry(7, 2, "700000.00"),
            entry(7, 3, "730000.00"),
            entry(7, 4, "760000.00"),
        ]);

        let transition = resolve_step(&table, &bounds(), 6, 8, 7, 1).unwrap();
        // step 2 is equal, not greater
        assert_eq!(transition.new_step, 3);
        assert_eq!(transition.new_salary, dec("730000.00"));
        assert_eq!(transition.salary_increment, dec("30000.00"));
        assert_eq!(transition.increment_percentage, dec("4.29"));
        assert!(!transition.needs_review);
        assert!(transition.warning.is_none());
    }

    #[test]
    fn test_first_step_when_destination_starts_higher() {
        let table = table(vec![entry(3, 2, "100"), entry(4, 1, "150"), entry(4, 2, "160")]);
        let transition = resolve_step(&table, &bounds(), 3, 2, 4, 1).unwrap();
        assert_eq!(transition.new_step, 1);
        assert_eq!(transition.increment_percentage, dec("50"));
    }

    #[test]
    fn test_fallback_to_max_step_needs_review() {
        // grade 13 max step is 9; every step pays less than the current salary
        let mut entries = vec![entry(12, 11, "5000")];
        for step in 1..=9 {
            entries.push(entry(13, step, &format!("{}", 4000 + step * 10)));
        }
        let table = table(entries);

        let transition = resolve_step(&table, &bounds(), 12, 11, 13, 5).unwrap();
        assert_eq!(transition.new_step, 9);
        assert_eq!(transition.new_salary, dec("4090"));
        assert!(transition.needs_review);
        assert!(transition.salary_increment < Decimal::ZERO);

        let warning = transition.warning.unwrap();
        assert_eq!(warning.code, WARN_STEP_FALLBACK);
        assert_eq!(warning.severity, WarningSeverity::High);
        assert_eq!(transition.audit_step.step_number, 5);
    }

    #[test]
    fn test_steps_above_destination_max_ignored() {
        // grade 13 max step is 9; step 10 would pay more but is out of bounds
        let mut entries = vec![entry(12, 11, "5000")];
        for step in 1..=10 {
            let amount = if step == 10 { 9999 } else { 4000 + step };
            entries.push(entry(13, step, &amount.to_string()));
        }
        let table = table(entries);

        let transition = resolve_step(&table, &bounds(), 12, 11, 13, 1).unwrap();
        assert_eq!(transition.new_step, 9);
        assert!(transition.needs_review);
    }

    #[test]
    fn test_missing_current_salary_is_error() {
        let table = table(vec![entry(7, 1, "100")]);
        match resolve_step(&table, &bounds(), 6, 4, 7, 1) {
            Err(EngineError::SalaryNotFound { grade, step }) => {
                assert_eq!((grade, step), (6, 4));
            }
            other => panic!("Expected SalaryNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_fallback_salary_is_error() {
        let table = table(vec![entry(6, 4, "500"), entry(7, 1, "100")]);
        assert!(matches!(
            resolve_step(&table, &bounds(), 6, 4, 7, 1),
            Err(EngineError::SalaryNotFound { grade: 7, step: 15 })
        ));
    }

    #[test]
    fn test_unknown_destination_grade() {
        let table = table(vec![entry(15, 9, "100")]);
        assert!(matches!(
            resolve_step(&table, &bounds(), 15, 9, 16, 1),
            Err(EngineError::UnknownGrade { grade: 16 })
        ));
    }

    fn monotonic_amounts(len: usize) -> impl Strategy<Value = Vec<i64>> {
        (1i64..=500_000, prop::collection::vec(0i64..=50_000, len - 1)).prop_map(|(start, steps)| {
            let mut amounts = vec![start];
            for delta in steps {
                let last = *amounts.last().unwrap_or(&start);
                amounts.push(last + delta);
            }
            amounts
        })
    }

    proptest! {
        #[test]
        fn prop_placement_pays_more_or_needs_review(
            current in monotonic_amounts(15),
            destination in monotonic_amounts(15),
            current_step in 1u32..=15,
        ) {
            let mut entries = Vec::new();
            for (i, amount) in current.iter().enumerate() {
                entries.push(SalaryTableEntry { grade: 6, step: i as u32 + 1, annual_amount: Decimal::new(*amount, 0) });
            }
            for (i, amount) in destination.iter().enumerate() {
                entries.push(SalaryTableEntry { grade: 7, step: i as u32 + 1, annual_amount: Decimal::new(*amount, 0) });
            }
            let table = table(entries);

            let transition = resolve_step(&table, &bounds(), 6, current_step, 7, 1).unwrap();
            let current_salary = table.amount(6, current_step).unwrap();

            if transition.needs_review {
                prop_assert!(table.steps(7).all(|(_, amount)| amount <= current_salary));
                prop_assert_eq!(transition.new_step, 15);
            } else {
                prop_assert!(transition.new_salary > current_salary);
                prop_assert!(
                    table.steps(7)
                        .filter(|(step, _)| *step < transition.new_step)
                        .all(|(_, amount)| amount <= current_salary)
                );
            }
        }
    }
}

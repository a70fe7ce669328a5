//! Salary table models.
//!
//! A [`SalaryTable`] is the immutable (grade, step) to annual amount lookup used
//! for one run. It is built from [`SalaryTableEntry`] rows and rejects duplicates.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One row of a salary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryTableEntry {
    /// The grade.
    pub grade: u32,
    /// The step within the grade.
    pub step: u32,
    /// The annual salary for the grade and step.
    pub annual_amount: Decimal,
}

/// A complete salary table effective from a given date.
///
/// # Example
///
/// ```
/// use promotion_engine::models::{SalaryTable, SalaryTableEntry};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let table = SalaryTable::from_entries(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     vec![
///         SalaryTableEntry { grade: 6, step: 1, annual_amount: Decimal::new(500_000, 0) },
///         SalaryTableEntry { grade: 6, step: 2, annual_amount: Decimal::new(520_000, 0) },
///     ],
/// )
/// .unwrap();
/// assert_eq!(table.amount(6, 2).unwrap(), Decimal::new(520_000, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryTable {
    effective_date: NaiveDate,
    amounts: BTreeMap<(u32, u32), Decimal>,
}

impl SalaryTable {
    /// Builds a table from entries, rejecting duplicate (grade, step) pairs.
    pub fn from_entries(
        effective_date: NaiveDate,
        entries: impl IntoIterator<Item = SalaryTableEntry>,
    ) -> EngineResult<Self> {
        let mut amounts = BTreeMap::new();
        for entry in entries {
            if amounts
                .insert((entry.grade, entry.step), entry.annual_amount)
                .is_some()
            {
                return Err(EngineError::DuplicateSalaryEntry {
                    grade: entry.grade,
                    step: entry.step,
                });
            }
        }
        Ok(SalaryTable {
            effective_date,
            amounts,
        })
    }

    /// The date this table takes effect.
    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }

    /// Looks up the annual amount for a grade and step.
    pub fn amount(&self, grade: u32, step: u32) -> EngineResult<Decimal> {
        self.amounts
            .get(&(grade, step))
            .copied()
            .ok_or(EngineError::SalaryNotFound { grade, step })
    }

    /// Iterates over `(step, amount)` for one grade in ascending step order.
    pub fn steps(&self, grade: u32) -> impl Iterator<Item = (u32, Decimal)> + '_ {
        self.amounts
            .range((grade, u32::MIN)..=(grade, u32::MAX))
            .map(|(&(_, step), &amount)| (step, amount))
    }

    /// Returns the grades whose amounts decrease somewhere as the step rises.
    pub fn non_monotonic_grades(&self) -> Vec<u32> {
        let mut grades = Vec::new();
        let mut previous: Option<(u32, Decimal)> = None;

        for (&(grade, _), &amount) in &self.amounts {
            let decreased = matches!(previous, Some((g, prev)) if g == grade && amount < prev);
            if decreased && grades.last() != Some(&grade) {
                grades.push(grade);
            }
            previous = Some((grade, amount));
        }

        grades
    }

    /// Iterates over every entry in (grade, step) order.
    pub fn entries(&self) -> impl Iterator<Item = SalaryTableEntry> + '_ {
        self.amounts
            .iter()
            .map(|(&(grade, step), &annual_amount)| SalaryTableEntry {
                grade,
                step,
                annual_amount,
            })
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn effective() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_amount_lookup() {
        let table = SalaryTable::from_entries(
            effective(),
            vec![entry(6, 1, "500000.00"), entry(7, 1, "560000.00")],
        )
        .unwrap();

        assert_eq!(table.amount(7, 1).unwrap(), dec("560000.00"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.effective_date(), effective());
    }

    #[test]
    fn test_missing_amount_is_salary_not_found() {
        let table = SalaryTable::from_entries(effective(), vec![entry(6, 1, "500000.00")]).unwrap();

        match table.amount(6, 2) {
            Err(EngineError::SalaryNotFound { grade, step }) => {
                assert_eq!(grade, 6);
                assert_eq!(step, 2);
            }
            other => panic!("Expected SalaryNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let result = SalaryTable::from_entries(
            effective(),
            vec![entry(6, 1, "500000.00"), entry(6, 1, "510000.00")],
        );
        assert!(matches!(
            result,
            Err(EngineError::DuplicateSalaryEntry { grade: 6, step: 1 })
        ));
    }

    #[test]
    fn test_steps_are_scoped_to_grade_and_ascending() {
        let table = SalaryTable::from_entries(
            effective(),
            vec![
                entry(7, 2, "580000"),
                entry(6, 2, "520000"),
                entry(7, 1, "560000"),
                entry(6, 1, "500000"),
                entry(8, 1, "640000"),
            ],
        )
        .unwrap();

        let steps: Vec<(u32, Decimal)> = table.steps(7).collect();
        assert_eq!(steps, vec![(1, dec("560000")), (2, dec("580000"))]);
        assert_eq!(table.steps(9).count(), 0);
    }

    #[test]
    fn test_non_monotonic_grades_detected_once() {
        let table = SalaryTable::from_entries(
            effective(),
            vec![
                entry(4, 1, "300"),
                entry(4, 2, "290"),
                entry(4, 3, "280"),
                entry(5, 1, "400"),
                entry(5, 2, "400"),
                entry(6, 1, "100"),
            ],
        )
        .unwrap();

        assert_eq!(table.non_monotonic_grades(), vec![4]);
    }

    #[test]
    fn test_drop_between_grades_is_not_non_monotonic() {
        let table = SalaryTable::from_entries(
            effective(),
            vec![entry(5, 15, "900"), entry(6, 1, "500")],
        )
        .unwrap();
        assert!(table.non_monotonic_grades().is_empty());
    }

    #[test]
    fn test_entries_round_trip_through_table() {
        let rows = vec![entry(6, 1, "500"), entry(6, 2, "520")];
        let table = SalaryTable::from_entries(effective(), rows.clone()).unwrap();
        let collected: Vec<SalaryTableEntry> = table.entries().collect();
        assert_eq!(collected, rows);
        assert!(!table.is_empty());
    }
}

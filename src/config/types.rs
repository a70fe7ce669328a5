//! Configuration types for the promotion engine.
//!
//! This module contains the strongly-typed structures deserialized from the
//! YAML files of a scale configuration directory, plus the validated
//! [`ScaleConfig`] they are assembled into.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{GradeStepBounds, SalaryTable, VacancyConfig};

/// Metadata about the salary scale.
#[derive(Debug, Clone, Deserialize)]
pub struct ScaleMetadata {
    /// Short code for the scale (e.g., "CONRAISS").
    pub code: String,
    /// The human-readable name of the scale.
    pub name: String,
    /// The version of the configuration.
    pub version: String,
    /// ISO currency code for salary amounts.
    pub currency: String,
}

/// A contiguous range of grades sharing a maximum step.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GradeRange {
    /// First grade in the range.
    pub from_grade: u32,
    /// Last grade in the range, inclusive.
    pub to_grade: u32,
    /// Maximum step for every grade in the range.
    pub max_step: u32,
}

/// Structure of grade_bounds.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct GradeBoundsConfig {
    /// The grade ranges.
    pub ranges: Vec<GradeRange>,
}

/// Structure of a file in the salaries directory.
///
/// Each grade maps to its annual amounts in step order, starting at step 1.
#[derive(Debug, Clone, Deserialize)]
pub struct SalaryScheduleConfig {
    /// The date this schedule takes effect.
    pub effective_date: NaiveDate,
    /// Annual amounts per grade, indexed by step - 1.
    pub grades: BTreeMap<u32, Vec<Decimal>>,
}

/// One grade's slot counts as written in a vacancy file.
///
/// Counts are signed so a negative value is reported as an invalid
/// vacancy rather than a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct VacancyEntry {
    /// The grade.
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

/// Structure of a file in the vacancies directory.
#[derive(Debug, Clone, Deserialize)]
pub struct VacancyFileConfig {
    /// The promotion cycle the file configures.
    pub promotion_cycle_id: String,
    /// Slot counts per grade.
    pub vacancies: Vec<VacancyEntry>,
}

/// The complete, validated scale configuration.
#[derive(Debug, Clone)]
pub struct ScaleConfig {
    metadata: ScaleMetadata,
    bounds: GradeStepBounds,
    /// Sorted oldest first.
    salary_tables: Vec<SalaryTable>,
    vacancies: HashMap<String, Vec<VacancyConfig>>,
}

impl ScaleConfig {
    /// Creates a new ScaleConfig from its component parts.
    pub fn new(
        metadata: ScaleMetadata,
        bounds: GradeStepBounds,
        salary_tables: Vec<SalaryTable>,
        vacancies: HashMap<String, Vec<VacancyConfig>>,
    ) -> Self {
        let mut sorted_tables = salary_tables;
        sorted_tables.sort_by_key(|t| t.effective_date());
        Self {
            metadata,
            bounds,
            salary_tables: sorted_tables,
            vacancies,
        }
    }

    /// Returns the scale metadata.
    pub fn scale(&self) -> &ScaleMetadata {
        &self.metadata
    }

    /// Returns the grade step bounds.
    pub fn bounds(&self) -> &GradeStepBounds {
        &self.bounds
    }

    /// Returns all salary tables, oldest first.
    pub fn salary_tables(&self) -> &[SalaryTable] {
        &self.salary_tables
    }

    /// Returns the vacancy configs keyed by promotion cycle.
    pub fn vacancies(&self) -> &HashMap<String, Vec<VacancyConfig>> {
        &self.vacancies
    }
}

//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a salary scale
//! configuration from YAML files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::calculation::validate_vacancies;
use crate::error::{EngineError, EngineResult};
use crate::models::{GradeStepBounds, SalaryTable, SalaryTableEntry, VacancyConfig};

use super::types::{
    GradeBoundsConfig, SalaryScheduleConfig, ScaleConfig, ScaleMetadata, VacancyFileConfig,
};

/// Loads and provides access to scale configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// validates them against each other and provides lookups for salary tables
/// and vacancy counts.
///
/// # Directory Structure
///
/// ```text
/// config/conraiss/
/// ├── scale.yaml          # Scale metadata
/// ├── grade_bounds.yaml   # Maximum step per grade range
/// ├── salaries/
/// │   └── 2024-01-01.yaml # Salary schedule effective from this date
/// └── vacancies/
///     └── 2025.yaml       # Slot counts for a promotion cycle
/// ```
///
/// # Example
///
/// ```no_run
/// use promotion_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/conraiss").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
/// let table = loader.salary_table(date).unwrap();
/// println!("Grade 7 step 1: {}", table.amount(7, 1).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
    config: ScaleConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - A required file is missing
    /// - A file contains invalid YAML
    /// - The grade bounds overlap or are empty
    /// - A salary schedule is incomplete for a grade or names an unknown grade
    /// - A vacancy count is negative, duplicated or names an unknown grade
    ///
    /// # Example
    ///
    /// ```no_run
    /// use promotion_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/conraiss")?;
    /// # Ok::<(), promotion_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<ScaleMetadata>(&path.join("scale.yaml"))?;

        let bounds_config = Self::load_yaml::<GradeBoundsConfig>(&path.join("grade_bounds.yaml"))?;
        let bounds = GradeStepBounds::from_ranges(
            bounds_config
                .ranges
                .iter()
                .map(|r| (r.from_grade, r.to_grade, r.max_step)),
        )?;

        let salaries_dir = path.join("salaries");
        let schedules = Self::load_dir::<SalaryScheduleConfig>(&salaries_dir, true)?;
        let mut salary_tables = Vec::with_capacity(schedules.len());
        for (file, schedule) in schedules {
            salary_tables.push(Self::build_salary_table(&file, schedule, &bounds)?);
        }

        let vacancy_files = Self::load_dir::<VacancyFileConfig>(&path.join("vacancies"), false)?;
        let mut vacancies = HashMap::new();
        for (file, vacancy_file) in vacancy_files {
            let cycle_id = vacancy_file.promotion_cycle_id.clone();
            let configs = Self::build_vacancies(vacancy_file, &bounds)?;
            if vacancies.insert(cycle_id.clone(), configs).is_some() {
                return Err(EngineError::ConfigParseError {
                    path: file.display().to_string(),
                    message: format!("promotion cycle '{cycle_id}' is configured in more than one file"),
                });
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            config: ScaleConfig::new(metadata, bounds, salary_tables, vacancies),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every `.yaml` file in a directory, in file name order.
    fn load_dir<T: serde::de::DeserializeOwned>(
        dir: &Path,
        required: bool,
    ) -> EngineResult<Vec<(PathBuf, T)>> {
        let dir_str = dir.display().to_string();

        if !dir.exists() {
            return if required {
                Err(EngineError::ConfigNotFound { path: dir_str })
            } else {
                Ok(Vec::new())
            };
        }

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        if required && paths.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no yaml files found)", dir_str),
            });
        }

        paths
            .into_iter()
            .map(|path| {
                let parsed = Self::load_yaml::<T>(&path)?;
                Ok((path, parsed))
            })
            .collect()
    }

    /// Turns a salary schedule into a table, requiring one amount per step
    /// for every grade in the bounds.
    fn build_salary_table(
        file: &Path,
        schedule: SalaryScheduleConfig,
        bounds: &GradeStepBounds,
    ) -> EngineResult<SalaryTable> {
        let parse_error = |message: String| EngineError::ConfigParseError {
            path: file.display().to_string(),
            message,
        };

        for (grade, max_step) in bounds.iter() {
            match schedule.grades.get(&grade) {
                None => return Err(parse_error(format!("grade {grade} has no salary amounts"))),
                Some(amounts) if amounts.len() != max_step as usize => {
                    return Err(parse_error(format!(
                        "grade {} lists {} step amounts, expected {}",
                        grade,
                        amounts.len(),
                        max_step
                    )));
                }
                Some(_) => {}
            }
        }

        let mut entries = Vec::new();
        for (grade, amounts) in schedule.grades {
            if !bounds.contains(grade) {
                return Err(EngineError::UnknownGrade { grade });
            }
            for (index, annual_amount) in amounts.into_iter().enumerate() {
                entries.push(SalaryTableEntry {
                    grade,
                    step: index as u32 + 1,
                    annual_amount,
                });
            }
        }

        SalaryTable::from_entries(schedule.effective_date, entries)
    }

    fn build_vacancies(
        file: VacancyFileConfig,
        bounds: &GradeStepBounds,
    ) -> EngineResult<Vec<VacancyConfig>> {
        let configs = file
            .vacancies
            .iter()
            .map(|v| {
                VacancyConfig::new(
                    v.grade,
                    file.promotion_cycle_id.as_str(),
                    v.promotion_slots,
                    v.recognition_slots,
                    v.reward_slots,
                )
            })
            .collect::<EngineResult<Vec<_>>>()?;

        validate_vacancies(&configs, &file.promotion_cycle_id, bounds)?;
        Ok(configs)
    }

    /// Returns the underlying scale configuration.
    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }

    /// Returns the scale metadata.
    pub fn scale(&self) -> &ScaleMetadata {
        self.config.scale()
    }

    /// Returns the grade step bounds.
    pub fn bounds(&self) -> &GradeStepBounds {
        self.config.bounds()
    }

    /// Gets the salary table in effect on a date.
    ///
    /// The most recent table effective on or before the date is used.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use promotion_engine::config::ConfigLoader;
    /// use chrono::NaiveDate;
    ///
    /// let loader = ConfigLoader::load("./config/conraiss")?;
    /// let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
    /// let table = loader.salary_table(date)?;
    /// assert_eq!(table.effective_date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    /// # Ok::<(), promotion_engine::error::EngineError>(())
    /// ```
    pub fn salary_table(&self, date: NaiveDate) -> EngineResult<&SalaryTable> {
        self.config
            .salary_tables()
            .iter()
            .rev()
            .find(|t| t.effective_date() <= date)
            .ok_or(EngineError::SalaryTableNotEffective { date })
    }

    /// Gets the vacancy configs for a promotion cycle.
    pub fn vacancies(&self, promotion_cycle_id: &str) -> EngineResult<&[VacancyConfig]> {
        self.config
            .vacancies()
            .get(promotion_cycle_id)
            .map(Vec::as_slice)
            .ok_or_else(|| EngineError::ConfigNotFound {
                path: format!(
                    "{} (no vacancy configuration for cycle '{}')",
                    self.path.join("vacancies").display(),
                    promotion_cycle_id
                ),
            })
    }
}

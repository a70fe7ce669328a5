//! Error types for the Promotion Allocation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during allocation and step processing.
//!
//! Errors fall into two families. Configuration errors (missing files, salary
//! table gaps, malformed grade bounds, invalid vacancy counts) are fatal and abort
//! a whole run before any candidate is touched. Candidate errors (scores out of
//! range, inconsistent dates, unknown grades) only exclude the offending candidate;
//! the engine reports them alongside the results instead of returning them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the Promotion Allocation Engine.
///
/// # Example
///
/// ```
/// use promotion_engine::error::EngineError;
///
/// let error = EngineError::SalaryNotFound { grade: 7, step: 16 };
/// assert_eq!(error.to_string(), "Salary not found for grade 7 step 16");
/// assert!(error.is_configuration_error());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The salary table has no entry for a grade/step pair.
    #[error("Salary not found for grade {grade} step {step}")]
    SalaryNotFound {
        /// The grade that was looked up.
        grade: u32,
        /// The step that was looked up.
        step: u32,
    },

    /// The salary table contains the same grade/step pair twice.
    #[error("Duplicate salary entry for grade {grade} step {step}")]
    DuplicateSalaryEntry {
        /// The duplicated grade.
        grade: u32,
        /// The duplicated step.
        step: u32,
    },

    /// No salary table is effective on the requested date.
    #[error("No salary table effective on {date}")]
    SalaryTableNotEffective {
        /// The evaluation date.
        date: NaiveDate,
    },

    /// The grade step bounds are malformed.
    #[error("Invalid grade step bounds: {message}")]
    InvalidGradeBounds {
        /// A description of the problem.
        message: String,
    },

    /// A vacancy configuration is invalid.
    #[error("Invalid vacancy configuration for grade {grade} in cycle '{cycle_id}': {message}")]
    InvalidVacancy {
        /// The grade the vacancy applies to.
        grade: u32,
        /// The promotion cycle identifier.
        cycle_id: String,
        /// A description of the problem.
        message: String,
    },

    /// A grade was requested that the configured bounds do not know about.
    #[error("Grade {grade} is not defined in the grade step bounds")]
    UnknownGrade {
        /// The unknown grade.
        grade: u32,
    },

    /// A score component was outside the 0-100 range.
    #[error("{component} score {value} is outside the range 0-100")]
    ScoreOutOfRange {
        /// The score component (exam, performance, seniority).
        component: String,
        /// The rejected value.
        value: Decimal,
    },

    /// A candidate record was invalid or contained inconsistent data.
    #[error("Invalid candidate '{candidate_id}' field '{field}': {message}")]
    InvalidCandidate {
        /// The ID of the candidate.
        candidate_id: String,
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// An external collaborator (directory, ledger, sink) failed.
    #[error("{collaborator} failed: {message}")]
    CollaboratorError {
        /// The collaborator that failed.
        collaborator: String,
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Returns true if this error is fatal for the whole run.
    ///
    /// Configuration errors must abort the run before any external state
    /// is touched; everything else is scoped to a single candidate or a
    /// single collaborator call.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            EngineError::ConfigNotFound { .. }
                | EngineError::ConfigParseError { .. }
                | EngineError::SalaryNotFound { .. }
                | EngineError::DuplicateSalaryEntry { .. }
                | EngineError::SalaryTableNotEffective { .. }
                | EngineError::InvalidGradeBounds { .. }
                | EngineError::InvalidVacancy { .. }
                | EngineError::UnknownGrade { .. }
        )
    }

    /// Convenience constructor for [`EngineError::InvalidCandidate`].
    pub fn invalid_candidate(
        candidate_id: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        EngineError::InvalidCandidate {
            candidate_id: candidate_id.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

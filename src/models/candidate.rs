//! Candidate model.
//!
//! This module defines the [`CandidateRecord`] snapshot supplied by the staff
//! directory for one allocation run or step-increment period.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

/// A staff member as seen by the engine for the duration of one run.
///
/// The engine never mutates a candidate record. Changes that follow from a
/// decision (new step after an increment, reset of failed attempts after a
/// promotion) are carried out by the directory or the workflow.
///
/// # Example
///
/// ```
/// use promotion_engine::models::CandidateRecord;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let candidate = CandidateRecord {
///     id: "staff_001".to_string(),
///     current_grade: 6,
///     current_step: 4,
///     confirmation_date: Some(NaiveDate::from_ymd_opt(2017, 1, 10).unwrap()),
///     date_of_birth: Some(NaiveDate::from_ymd_opt(1988, 5, 2).unwrap()),
///     file_number: "NB/0142".to_string(),
///     date_of_last_promotion: Some(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()),
///     date_of_first_appointment: Some(NaiveDate::from_ymd_opt(2015, 3, 1).unwrap()),
///     failed_promotion_attempts: 0,
///     exam_score: Decimal::new(85, 0),
///     periodic_performance_score: Decimal::new(75, 0),
///     is_active: true,
/// };
/// assert_eq!(candidate.reference_date(), Some(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Unique identifier for the staff member.
    pub id: String,
    /// The grade currently held.
    pub current_grade: u32,
    /// The step currently held within the grade.
    pub current_step: u32,
    /// The date the appointment was confirmed.
    #[serde(default)]
    pub confirmation_date: Option<NaiveDate>,
    /// The staff member's date of birth.
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// The personnel file number, compared lexicographically.
    pub file_number: String,
    /// The effective date of the most recent promotion.
    #[serde(default)]
    pub date_of_last_promotion: Option<NaiveDate>,
    /// The date of first appointment (hire date).
    #[serde(default)]
    pub date_of_first_appointment: Option<NaiveDate>,
    /// Number of promotion attempts that failed since the last promotion.
    #[serde(default)]
    pub failed_promotion_attempts: u32,
    /// Promotional exam score (0-100).
    pub exam_score: Decimal,
    /// Periodic performance evaluation score (0-100).
    pub periodic_performance_score: Decimal,
    /// Whether the staff member is currently active.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl CandidateRecord {
    /// Returns the date time-in-grade is measured from.
    ///
    /// The date of last promotion wins; staff who were never promoted fall
    /// back to their date of first appointment.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.date_of_last_promotion
            .or(self.date_of_first_appointment)
    }

    /// Returns true if the candidate has failed at least one promotion attempt.
    pub fn has_failed_attempt(&self) -> bool {
        self.failed_promotion_attempts > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_candidate() -> CandidateRecord {
        CandidateRecord {
            id: "staff_001".to_string(),
            current_grade: 6,
            current_step: 4,
            confirmation_date: Some(NaiveDate::from_ymd_opt(2017, 1, 10).unwrap()),
            date_of_birth: Some(NaiveDate::from_ymd_opt(1988, 5, 2).unwrap()),
            file_number: "NB/0142".to_string(),
            date_of_last_promotion: None,
            date_of_first_appointment: Some(NaiveDate::from_ymd_opt(2015, 3, 1).unwrap()),
            failed_promotion_attempts: 0,
            exam_score: Decimal::new(85, 0),
            periodic_performance_score: Decimal::new(75, 0),
            is_active: true,
        }
    }

    #[test]
    fn test_reference_date_prefers_last_promotion() {
        let mut candidate = create_test_candidate();
        candidate.date_of_last_promotion = Some(NaiveDate::from_ymd_opt(2022, 7, 1).unwrap());

        assert_eq!(
            candidate.reference_date(),
            Some(NaiveDate::from_ymd_opt(2022, 7, 1).unwrap())
        );
    }

    #[test]
    fn test_reference_date_falls_back_to_first_appointment() {
        let candidate = create_test_candidate();
        assert_eq!(
            candidate.reference_date(),
            Some(NaiveDate::from_ymd_opt(2015, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_reference_date_missing_when_no_dates() {
        let mut candidate = create_test_candidate();
        candidate.date_of_first_appointment = None;
        assert_eq!(candidate.reference_date(), None);
    }

    #[test]
    fn test_deserialize_minimal_candidate_uses_defaults() {
        let json = r#"{
            "id": "staff_002",
            "current_grade": 4,
            "current_step": 9,
            "file_number": "NB/0200",
            "exam_score": "62.5",
            "periodic_performance_score": "80"
        }"#;

        let candidate: CandidateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.current_grade, 4);
        assert_eq!(candidate.failed_promotion_attempts, 0);
        assert!(candidate.is_active);
        assert!(candidate.confirmation_date.is_none());
        assert_eq!(candidate.exam_score, Decimal::new(625, 1));
        assert!(!candidate.has_failed_attempt());
    }

    #[test]
    fn test_serialize_candidate() {
        let candidate = create_test_candidate();
        let json = serde_json::to_string(&candidate).unwrap();
        assert!(json.contains("\"confirmation_date\":\"2017-01-10\""));
        assert!(json.contains("\"exam_score\":\"85\""));

        let deserialized: CandidateRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(candidate, deserialized);
    }
}

//! Eligibility decision states.

use serde::{Deserialize, Serialize};

/// Why a candidate may not attempt promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibilityReason {
    /// The grade has no promotion slots in this cycle.
    NoVacancy,
    /// The candidate is under an active disciplinary hold.
    DisciplinaryHold,
    /// The candidate already holds the highest grade.
    TerminalGrade,
    /// Neither a last promotion date nor a first appointment date is known.
    MissingReferenceDate,
    /// Not enough time has passed since the reference date.
    CycleNotElapsed,
}

/// Outcome of an eligibility evaluation.
///
/// ```
/// use promotion_engine::models::{EligibilityStatus, IneligibilityReason};
///
/// let status = EligibilityStatus::NotEligible(IneligibilityReason::CycleNotElapsed);
/// assert_eq!(
///     serde_json::to_string(&status).unwrap(),
///     r#"{"status":"not_eligible","reason":"cycle_not_elapsed"}"#
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum EligibilityStatus {
    /// The candidate may attempt promotion.
    Eligible,
    /// The candidate may not attempt promotion.
    NotEligible(IneligibilityReason),
}

impl EligibilityStatus {
    /// Returns true for [`EligibilityStatus::Eligible`].
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityStatus::Eligible)
    }

    /// Returns the reason when not eligible.
    pub fn reason(&self) -> Option<IneligibilityReason> {
        match self {
            EligibilityStatus::Eligible => None,
            EligibilityStatus::NotEligible(reason) => Some(*reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligible_serialization() {
        let json = serde_json::to_string(&EligibilityStatus::Eligible).unwrap();
        assert_eq!(json, r#"{"status":"eligible"}"#);
    }

    #[test]
    fn test_not_eligible_deserialization() {
        let status: EligibilityStatus =
            serde_json::from_str(r#"{"status":"not_eligible","reason":"disciplinary_hold"}"#).unwrap();
        assert_eq!(
            status,
            EligibilityStatus::NotEligible(IneligibilityReason::DisciplinaryHold)
        );
        assert!(!status.is_eligible());
        assert_eq!(status.reason(), Some(IneligibilityReason::DisciplinaryHold));
    }

    #[test]
    fn test_eligible_has_no_reason() {
        assert!(EligibilityStatus::Eligible.is_eligible());
        assert_eq!(EligibilityStatus::Eligible.reason(), None);
    }
}

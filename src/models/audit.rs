//! Audit trail models.
//!
//! Every rule application records an [`AuditStep`] so a run's decisions can be
//! replayed and explained. Non-fatal anomalies are captured as [`AuditWarning`]s.

use serde::{Deserialize, Serialize};

/// Warning raised when no destination step pays more than the current salary.
pub const WARN_STEP_FALLBACK: &str = "STEP_FALLBACK_REVIEW";
/// Warning raised when a step-increment period has already been processed.
pub const WARN_PERIOD_ALREADY_PROCESSED: &str = "PERIOD_ALREADY_PROCESSED";
/// Warning raised when a salary grade is not non-decreasing in step.
pub const WARN_NON_MONOTONIC_SALARY: &str = "NON_MONOTONIC_SALARY";
/// Warning raised when candidates are supplied for a grade without a vacancy config.
pub const WARN_NO_VACANCY_CONFIG: &str = "NO_VACANCY_CONFIG";

/// A single step in the audit trace recording a rule decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The candidate or grade the rule was applied to.
    pub subject: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// How urgently a warning needs a human to look at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    /// Informational.
    Low,
    /// Worth checking before the results are applied.
    Medium,
    /// Results must be reviewed manually.
    High,
}

/// A warning generated during a run.
///
/// Warnings indicate anomalies that don't prevent the run from completing
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level.
    pub severity: WarningSeverity,
    /// The candidate the warning concerns, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
}

impl AuditWarning {
    /// Creates a warning that is not tied to a single candidate.
    pub fn new(code: &str, message: impl Into<String>, severity: WarningSeverity) -> Self {
        AuditWarning {
            code: code.to_string(),
            message: message.into(),
            severity,
            candidate_id: None,
        }
    }

    /// Attaches the candidate the warning concerns.
    pub fn for_candidate(mut self, candidate_id: impl Into<String>) -> Self {
        self.candidate_id = Some(candidate_id.into());
        self
    }
}

/// The complete audit trace for a run.
///
/// # Example
///
/// ```
/// use promotion_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// assert!(trace.steps.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of rule steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during the run.
    pub warnings: Vec<AuditWarning>,
    /// The total run duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Returns the step number the next recorded step should use.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Returns true if any warning with the given code was recorded.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_step(step_number: u32, rule_id: &str) -> AuditStep {
        AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: "Test rule".to_string(),
            subject: "staff_001".to_string(),
            input: serde_json::json!({}),
            output: serde_json::json!({}),
            reasoning: "Test reasoning".to_string(),
        }
    }

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 1,
            rule_id: "combined_score".to_string(),
            rule_name: "Combined Score".to_string(),
            subject: "staff_001".to_string(),
            input: serde_json::json!({"exam": "85"}),
            output: serde_json::json!({"combined": "83.50"}),
            reasoning: "85 x 0.70 + 75 x 0.20 + 90 x 0.10 = 83.50".to_string(),
        };

        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"step_number\":1"));
        assert!(json.contains("\"rule_id\":\"combined_score\""));
        assert!(json.contains("\"subject\":\"staff_001\""));
    }

    #[test]
    fn test_audit_warning_serialization() {
        let warning = AuditWarning::new(
            WARN_STEP_FALLBACK,
            "No step in grade 7 exceeds current salary",
            WarningSeverity::High,
        )
        .for_candidate("staff_009");

        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"code\":\"STEP_FALLBACK_REVIEW\""));
        assert!(json.contains("\"severity\":\"high\""));
        assert!(json.contains("\"candidate_id\":\"staff_009\""));
    }

    #[test]
    fn test_audit_warning_without_candidate_omits_field() {
        let warning = AuditWarning::new(WARN_PERIOD_ALREADY_PROCESSED, "done", WarningSeverity::Low);
        let json = serde_json::to_string(&warning).unwrap();
        assert!(!json.contains("candidate_id"));

        let back: AuditWarning = serde_json::from_str(&json).unwrap();
        assert_eq!(back, warning);
    }

    #[test]
    fn test_next_step_number_follows_recorded_steps() {
        let mut trace = AuditTrace::default();
        assert_eq!(trace.next_step_number(), 1);

        trace.steps.push(create_step(1, "eligibility"));
        trace.steps.push(create_step(2, "combined_score"));
        assert_eq!(trace.next_step_number(), 3);
    }

    #[test]
    fn test_has_warning() {
        let trace = AuditTrace {
            steps: vec![],
            warnings: vec![AuditWarning::new(
                WARN_NON_MONOTONIC_SALARY,
                "grade 4 decreases at step 6",
                WarningSeverity::Medium,
            )],
            duration_us: 10,
        };

        assert!(trace.has_warning(WARN_NON_MONOTONIC_SALARY));
        assert!(!trace.has_warning(WARN_STEP_FALLBACK));
    }
}

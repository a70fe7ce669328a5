//! Combined score calculation.
//!
//! The combined score weights the exam result, the periodic performance
//! evaluation and the seniority component into a single 0-100 figure used to
//! rank candidates within a grade.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// Weight of the exam score (0.70).
pub const EXAM_WEIGHT: Decimal = Decimal::from_parts(70, 0, 0, false, 2);
/// Weight of the periodic performance score (0.20).
pub const PERFORMANCE_WEIGHT: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
/// Weight of the seniority score (0.10).
pub const SENIORITY_WEIGHT: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

const SCORE_MAX: Decimal = Decimal::ONE_HUNDRED;

/// Rounds to 2 decimal places, half away from zero.
pub(crate) fn round_2dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Checks that a score component lies in [0, 100].
///
/// Out-of-range values are rejected, never clamped.
pub fn validate_score(component: &str, value: Decimal) -> EngineResult<Decimal> {
    if value < Decimal::ZERO || value > SCORE_MAX {
        return Err(EngineError::ScoreOutOfRange {
            component: component.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Computes the weighted combined score.
///
/// `exam * 0.70 + performance * 0.20 + seniority * 0.10`, rounded to 2 dp.
///
/// # Examples
///
/// ```
/// use promotion_engine::calculation::combined_score;
/// use rust_decimal::Decimal;
///
/// let score = combined_score(Decimal::new(85, 0), Decimal::new(75, 0), Decimal::new(90, 0)).unwrap();
/// assert_eq!(score, Decimal::new(8350, 2));
/// ```
pub fn combined_score(exam: Decimal, performance: Decimal, seniority: Decimal) -> EngineResult<Decimal> {
    let exam = validate_score("exam", exam)?;
    let performance = validate_score("performance", performance)?;
    let seniority = validate_score("seniority", seniority)?;

    Ok(round_2dp(
        exam * EXAM_WEIGHT + performance * PERFORMANCE_WEIGHT + seniority * SENIORITY_WEIGHT,
    ))
}

/// The result of a combined score calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct CombinedScoreResult {
    /// The combined score.
    pub score: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the combined score for a candidate and records an audit step.
pub fn calculate_combined_score(
    candidate_id: &str,
    exam: Decimal,
    performance: Decimal,
    seniority: Decimal,
    step_number: u32,
) -> EngineResult<CombinedScoreResult> {
    let score = combined_score(exam, performance, seniority)?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "combined_score".to_string(),
        rule_name: "Combined Score".to_string(),
        subject: candidate_id.to_string(),
        input: serde_json::json!({
            "exam_score": exam.to_string(),
            "performance_score": performance.to_string(),
            "seniority_score": seniority.to_string()
        }),
        output: serde_json::json!({
            "combined_score": score.to_string()
        }),
        reasoning: format!(
            "{} x {} + {} x {} + {} x {} = {}",
            exam, EXAM_WEIGHT, performance, PERFORMANCE_WEIGHT, seniority, SENIORITY_WEIGHT, score
        ),
    };

    Ok(CombinedScoreResult { score, audit_step })
}

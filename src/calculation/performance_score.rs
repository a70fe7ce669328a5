//! Periodic performance percentage.
//!
//! Performance evaluations rate each agreed goal on a 1-5 scale. The
//! percentage is the weight-averaged rating over agreed, rated goals,
//! expressed out of 100.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::combined_score::round_2dp;
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

const RATING_MIN: Decimal = Decimal::ONE;
const RATING_MAX: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

fn default_weight() -> Decimal {
    Decimal::ONE
}

/// One goal from a performance evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRating {
    /// Relative weight of the goal.
    #[serde(default = "default_weight")]
    pub weight: Decimal,
    /// The rating given (1-5), if the goal has been rated.
    #[serde(default)]
    pub rating: Option<Decimal>,
    /// Whether the goal was agreed between staff member and supervisor.
    #[serde(default)]
    pub agreed: bool,
}

/// The result of a performance percentage calculation.
#[derive(Debug, Clone)]
pub struct PerformanceScoreResult {
    /// Percentage (0-100).
    pub percentage: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Converts goal ratings into a 0-100 performance percentage.
///
/// Goals that are not agreed or not rated are ignored. With no remaining goal,
/// or a zero total weight, the percentage is 0.
///
/// # Errors
///
/// Returns `InvalidCandidate` for a rating outside 1-5 or a negative weight.
///
/// # Examples
///
/// ```
/// use promotion_engine::calculation::{GoalRating, performance_percentage};
/// use rust_decimal::Decimal;
///
/// let goals = vec![
///     GoalRating { weight: Decimal::ONE, rating: Some(Decimal::new(4, 0)), agreed: true },
///     GoalRating { weight: Decimal::ONE, rating: Some(Decimal::new(5, 0)), agreed: true },
/// ];
/// let result = performance_percentage("staff_001", &goals, 1).unwrap();
/// assert_eq!(result.percentage, Decimal::new(90, 0));
/// ```
pub fn performance_percentage(
    candidate_id: &str,
    goals: &[GoalRating],
    step_number: u32,
) -> EngineResult<PerformanceScoreResult> {
    let mut weighted_sum = Decimal::ZERO;
    let mut total_weight = Decimal::ZERO;
    let mut counted = 0u32;

    for goal in goals.iter().filter(|g| g.agreed) {
        if goal.weight < Decimal::ZERO {
            return Err(EngineError::invalid_candidate(
                candidate_id,
                "goal_ratings",
                format!("goal weight {} must not be negative", goal.weight),
            ));
        }
        let Some(rating) = goal.rating else {
            continue;
        };
        if rating < RATING_MIN || rating > RATING_MAX {
            return Err(EngineError::invalid_candidate(
                candidate_id,
                "goal_ratings",
                format!("rating {rating} is outside 1-5"),
            ));
        }
        weighted_sum += rating * goal.weight;
        total_weight += goal.weight;
        counted += 1;
    }

    let percentage = if total_weight.is_zero() {
        Decimal::ZERO
    } else {
        round_2dp(weighted_sum / total_weight / RATING_MAX * Decimal::ONE_HUNDRED)
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "performance_percentage".to_string(),
        rule_name: "Performance Percentage".to_string(),
        subject: candidate_id.to_string(),
        input: serde_json::json!({
            "goals": goals.len(),
            "counted_goals": counted,
            "total_weight": total_weight.to_string()
        }),
        output: serde_json::json!({
            "percentage": percentage.to_string()
        }),
        reasoning: if counted == 0 {
            "No agreed, rated goals; performance percentage is 0".to_string()
        } else {
            format!(
                "Weighted average rating over {} goal(s) is {} of 5 = {}%",
                counted,
                round_2dp(weighted_sum / total_weight),
                percentage
            )
        },
    };

    Ok(PerformanceScoreResult {
        percentage,
        audit_step,
    })
}

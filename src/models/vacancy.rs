//! Vacancy configuration models.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The three award tiers a ranked list is cut into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardTier {
    /// Promotion to the next grade.
    Promotion,
    /// Formal recognition.
    Recognition,
    /// Monetary or in-kind reward.
    Reward,
}

impl AwardTier {
    /// All tiers, in allocation order.
    pub const ALL: [AwardTier; 3] = [AwardTier::Promotion, AwardTier::Recognition, AwardTier::Reward];
}

/// Slot counts for one grade in one promotion cycle.
///
/// `grade` is the grade candidates currently hold; promoted candidates move to
/// `grade + 1`.
///
/// # Example
///
/// ```
/// use promotion_engine::models::{AwardTier, VacancyConfig};
///
/// let vacancy = VacancyConfig::new(6, "2025", 2, 5, 3).unwrap();
/// assert_eq!(vacancy.slots(AwardTier::Recognition), 5);
/// assert!(VacancyConfig::new(6, "2025", -1, 0, 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyConfig {
    /// The grade the candidates currently hold.
    pub grade: u32,
    /// The promotion cycle this config applies to.
    pub promotion_cycle_id: String,
    /// Number of promotion slots.
    pub promotion_slots: u32,
    /// Number of recognition slots.
    pub recognition_slots: u32,
    /// Number of reward slots.
    pub reward_slots: u32,
}

impl VacancyConfig {
    /// Builds a vacancy config from raw counts, rejecting negative values.
    pub fn new(
        grade: u32,
        promotion_cycle_id: impl Into<String>,
        promotion_slots: i64,
        recognition_slots: i64,
        reward_slots: i64,
    ) -> EngineResult<Self> {
        let promotion_cycle_id = promotion_cycle_id.into();
        let check = |name: &str, value: i64| -> EngineResult<u32> {
            u32::try_from(value).map_err(|_| EngineError::InvalidVacancy {
                grade,
                cycle_id: promotion_cycle_id.clone(),
                message: if value < 0 {
                    format!("{name} must not be negative (got {value})")
                } else {
                    format!("{name} is too large (got {value})")
                },
            })
        };

        let promotion_slots = check("promotion_slots", promotion_slots)?;
        let recognition_slots = check("recognition_slots", recognition_slots)?;
        let reward_slots = check("reward_slots", reward_slots)?;

        Ok(VacancyConfig {
            grade,
            promotion_cycle_id,
            promotion_slots,
            recognition_slots,
            reward_slots,
        })
    }

    /// Number of slots configured for a tier.
    pub fn slots(&self, tier: AwardTier) -> u32 {
        match tier {
            AwardTier::Promotion => self.promotion_slots,
            AwardTier::Recognition => self.recognition_slots,
            AwardTier::Reward => self.reward_slots,
        }
    }

    /// Returns true if at least one promotion slot is open.
    pub fn has_promotion_vacancy(&self) -> bool {
        self.promotion_slots > 0
    }

    /// The grade promoted candidates move to.
    pub fn target_grade(&self) -> u32 {
        self.grade + 1
    }
}

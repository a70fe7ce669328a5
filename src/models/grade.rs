//! Grade and step bounds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// CONRAISS grade ranges and their maximum step: (first grade, last grade, max step).
pub const CONRAISS_RANGES: [(u32, u32, u32); 3] = [(2, 9, 15), (10, 12, 11), (13, 15, 9)];

/// Maps each grade to the highest step it can hold.
///
/// # Example
///
/// ```
/// use promotion_engine::models::GradeStepBounds;
///
/// let bounds = GradeStepBounds::conraiss();
/// assert_eq!(bounds.max_step(5).unwrap(), 15);
/// assert_eq!(bounds.max_step(11).unwrap(), 11);
/// assert_eq!(bounds.max_step(14).unwrap(), 9);
/// assert!(bounds.max_step(16).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeStepBounds {
    max_steps: BTreeMap<u32, u32>,
}

impl GradeStepBounds {
    /// The built-in CONRAISS bounds.
    pub fn conraiss() -> Self {
        let max_steps = CONRAISS_RANGES
            .iter()
            .flat_map(|&(from, to, max_step)| (from..=to).map(move |grade| (grade, max_step)))
            .collect();
        GradeStepBounds { max_steps }
    }

    /// Builds bounds from inclusive grade ranges.
    ///
    /// Ranges must be non-empty, must not overlap and every maximum step
    /// must be at least 1.
    pub fn from_ranges(ranges: impl IntoIterator<Item = (u32, u32, u32)>) -> EngineResult<Self> {
        let mut max_steps = BTreeMap::new();

        for (from, to, max_step) in ranges {
            if from > to {
                return Err(EngineError::InvalidGradeBounds {
                    message: format!("range {from}-{to} is empty"),
                });
            }
            if max_step == 0 {
                return Err(EngineError::InvalidGradeBounds {
                    message: format!("range {from}-{to} has a maximum step of 0"),
                });
            }
            for grade in from..=to {
                if max_steps.insert(grade, max_step).is_some() {
                    return Err(EngineError::InvalidGradeBounds {
                        message: format!("grade {grade} appears in more than one range"),
                    });
                }
            }
        }

        if max_steps.is_empty() {
            return Err(EngineError::InvalidGradeBounds {
                message: "no grades defined".to_string(),
            });
        }

        Ok(GradeStepBounds { max_steps })
    }

    /// Returns the maximum step for a grade.
    pub fn max_step(&self, grade: u32) -> EngineResult<u32> {
        self.max_steps
            .get(&grade)
            .copied()
            .ok_or(EngineError::UnknownGrade { grade })
    }

    /// Returns true if the grade is defined.
    pub fn contains(&self, grade: u32) -> bool {
        self.max_steps.contains_key(&grade)
    }

    /// Returns true if no grade above this one is defined.
    pub fn is_highest_grade(&self, grade: u32) -> bool {
        self.max_steps.keys().next_back() == Some(&grade)
    }

    /// Iterates over `(grade, max_step)` pairs in ascending grade order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.max_steps.iter().map(|(&grade, &max_step)| (grade, max_step))
    }
}

impl Default for GradeStepBounds {
    fn default() -> Self {
        GradeStepBounds::conraiss()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conraiss_max_steps() {
        let bounds = GradeStepBounds::conraiss();

        for grade in 2..=9 {
            assert_eq!(bounds.max_step(grade).unwrap(), 15, "grade {grade}");
        }
        for grade in 10..=12 {
            assert_eq!(bounds.max_step(grade).unwrap(), 11, "grade {grade}");
        }
        for grade in 13..=15 {
            assert_eq!(bounds.max_step(grade).unwrap(), 9, "grade {grade}");
        }
    }

    #[test]
    fn test_unknown_grade() {
        let bounds = GradeStepBounds::conraiss();
        assert!(matches!(
            bounds.max_step(1),
            Err(EngineError::UnknownGrade { grade: 1 })
        ));
        assert!(!bounds.contains(16));
        assert!(bounds.contains(2));
    }

    #[test]
    fn test_highest_grade() {
        let bounds = GradeStepBounds::conraiss();
        assert!(bounds.is_highest_grade(15));
        assert!(!bounds.is_highest_grade(14));
    }

    #[test]
    fn test_from_ranges_matches_builtin() {
        let bounds = GradeStepBounds::from_ranges(CONRAISS_RANGES).unwrap();
        assert_eq!(bounds, GradeStepBounds::conraiss());
    }

    #[test]
    fn test_overlapping_ranges_rejected() {
        let result = GradeStepBounds::from_ranges([(2, 9, 15), (9, 12, 11)]);
        match result {
            Err(EngineError::InvalidGradeBounds { message }) => {
                assert!(message.contains("grade 9"));
            }
            other => panic!("Expected InvalidGradeBounds, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = GradeStepBounds::from_ranges([(9, 2, 15)]);
        assert!(matches!(result, Err(EngineError::InvalidGradeBounds { .. })));
    }

    #[test]
    fn test_zero_max_step_rejected() {
        let result = GradeStepBounds::from_ranges([(2, 9, 0)]);
        assert!(matches!(result, Err(EngineError::InvalidGradeBounds { .. })));
    }

    #[test]
    fn test_empty_ranges_rejected() {
        let result = GradeStepBounds::from_ranges(Vec::new());
        assert!(matches!(result, Err(EngineError::InvalidGradeBounds { .. })));
    }

    #[test]
    fn test_iter_is_ascending() {
        let bounds = GradeStepBounds::conraiss();
        let grades: Vec<u32> = bounds.iter().map(|(grade, _)| grade).collect();
        assert_eq!(grades, (2..=15).collect::<Vec<_>>());
    }
}

//! Calculation logic for the Promotion Allocation Engine.
//!
//! This module contains the rules that decide who is promoted: eligibility by
//! grade cycle and failed attempts, seniority ordering, combined score
//! weighting, tier allocation against vacancy slots, and step placement in the
//! destination grade. It also holds the orchestration for a full promotion
//! cycle and the periodic step increment.

mod combined_score;
mod cycle_run;
mod eligibility;
mod performance_score;
mod seniority;
mod step_increment;
mod step_transition;
mod vacancy_allocation;
mod validation;

pub use combined_score::{
    CombinedScoreResult, EXAM_WEIGHT, PERFORMANCE_WEIGHT, SENIORITY_WEIGHT,
    calculate_combined_score, combined_score, validate_score,
};
pub use cycle_run::{CycleParameters, run_promotion_cycle, validate_vacancies};
pub use eligibility::{
    EligibilityDecision, RETRY_CYCLE_YEARS, evaluate_eligibility, standard_cycle_years,
};
pub use performance_score::{GoalRating, PerformanceScoreResult, performance_percentage};
pub use seniority::{SeniorityPosition, compare_seniority, rank_by_seniority, seniority_score};
pub use step_increment::{IncrementPlan, plan_step_increments, run_step_increment};
pub use step_transition::{StepTransition, resolve_step};
pub use vacancy_allocation::{
    AllocationContext, GradeAllocationResult, RankingResult, allocate_grade, rank_candidates,
};
pub use validation::{validate_candidate, validate_placement};

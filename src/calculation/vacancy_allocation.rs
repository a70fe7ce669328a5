//! Vacancy-bounded allocation for a single grade.
//!
//! Eligible candidates are scored, ranked once, and the promotion,
//! recognition and reward tiers are each cut from the top of that one list.
//! Tiers overlap: the top candidate can receive all three awards.

use std::collections::HashSet;

use chrono::NaiveDate;

use super::combined_score::calculate_combined_score;
use super::eligibility::evaluate_eligibility;
use super::seniority::{compare_seniority, rank_by_seniority};
use super::step_transition::resolve_step;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AllocationResult, AllocationSummary, AuditStep, AuditWarning, CandidateRecord,
    GradeAllocation, GradeStepBounds, IneligibleCandidate, SalaryTable, ScoredCandidate,
    VacancyConfig,
};

/// The result of ranking a set of candidates.
#[derive(Debug, Clone)]
pub struct RankingResult {
    /// Candidates in final rank order.
    pub ranked: Vec<ScoredCandidate>,
    /// The audit steps recording seniority, scoring and ranking.
    pub audit_steps: Vec<AuditStep>,
}

/// Scores and ranks candidates.
///
/// Seniority is computed over the full set first. Candidates are then
/// ordered by combined score, highest first, with seniority breaking ties.
pub fn rank_candidates(candidates: &[CandidateRecord], step_number: u32) -> EngineResult<RankingResult> {
    let mut audit_steps = Vec::new();
    let mut step_number = step_number;

    let seniority = rank_by_seniority(candidates);
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "seniority_ranking".to_string(),
        rule_name: "Seniority Ranking".to_string(),
        subject: format!("{} candidate(s)", seniority.len()),
        input: serde_json::json!({
            "candidates": candidates.len()
        }),
        output: serde_json::json!(seniority
            .iter()
            .map(|p| serde_json::json!({
                "candidate_id": p.candidate.id,
                "seniority_rank": p.rank,
                "seniority_score": p.score.to_string()
            }))
            .collect::<Vec<_>>()),
        reasoning: "Ordered by step, confirmation date, date of birth, file number and id".to_string(),
    });
    step_number += 1;

    let total = seniority.len() as u32;
    let mut scored = Vec::with_capacity(seniority.len());
    for position in &seniority {
        let candidate = position.candidate;
        let combined = calculate_combined_score(
            &candidate.id,
            candidate.exam_score,
            candidate.periodic_performance_score,
            position.score,
            step_number,
        )?;
        audit_steps.push(combined.audit_step);
        step_number += 1;

        scored.push(ScoredCandidate {
            candidate: candidate.clone(),
            exam_score: candidate.exam_score,
            performance_score: candidate.periodic_performance_score,
            seniority_score: position.score,
            combined_score: combined.score,
            seniority_rank: position.rank,
            rank_within_grade: 0,
            total_in_grade: total,
        });
    }

    scored.sort_by(|a, b| {
        b.combined_score
            .cmp(&a.combined_score)
            .then_with(|| compare_seniority(&a.candidate, &b.candidate))
    });
    for (index, candidate) in scored.iter_mut().enumerate() {
        candidate.rank_within_grade = index as u32 + 1;
    }

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "final_ranking".to_string(),
        rule_name: "Final Ranking".to_string(),
        subject: format!("{} candidate(s)", scored.len()),
        input: serde_json::json!({
            "candidates": scored.len()
        }),
        output: serde_json::json!(scored
            .iter()
            .map(|s| serde_json::json!({
                "candidate_id": s.candidate.id,
                "rank": s.rank_within_grade,
                "combined_score": s.combined_score.to_string()
            }))
            .collect::<Vec<_>>()),
        reasoning: "Ordered by combined score, ties broken by seniority".to_string(),
    });

    Ok(RankingResult {
        ranked: scored,
        audit_steps,
    })
}

/// Everything a grade allocation reads besides the candidates themselves.
#[derive(Debug, Clone, Copy)]
pub struct AllocationContext<'a> {
    /// Slot counts for the grade.
    pub vacancy: &'a VacancyConfig,
    /// The date eligibility is evaluated on.
    pub evaluation_date: NaiveDate,
    /// Ids of candidates under an active disciplinary hold.
    pub disciplinary_holds: &'a HashSet<String>,
    /// The salary table used for step placement.
    pub salary_table: &'a SalaryTable,
    /// Maximum steps per grade.
    pub bounds: &'a GradeStepBounds,
}

/// The result of allocating one grade.
#[derive(Debug, Clone)]
pub struct GradeAllocationResult {
    /// The allocation.
    pub allocation: GradeAllocation,
    /// The audit steps recorded while allocating.
    pub audit_steps: Vec<AuditStep>,
    /// Anomalies raised while placing promoted candidates.
    pub warnings: Vec<AuditWarning>,
}

/// Allocates the promotion, recognition and reward tiers of one grade.
///
/// 1. filter to eligible candidates
/// 2. score and rank the eligible set
/// 3. take the first `promotion_slots`, `recognition_slots` and `reward_slots`
///    entries of the ranking for each tier
/// 4. place every promoted candidate in the next grade
///
/// An empty eligible set yields no results; surplus slots stay unfilled.
///
/// # Errors
///
/// Returns `InvalidCandidate` for a candidate outside the vacancy's grade and
/// propagates salary table errors from step placement.
pub fn allocate_grade(
    candidates: &[CandidateRecord],
    context: &AllocationContext<'_>,
    step_number: u32,
) -> EngineResult<GradeAllocationResult> {
    let vacancy = context.vacancy;
    let grade = vacancy.grade;
    let mut audit_steps = Vec::new();
    let mut warnings = Vec::new();
    let mut step_number = step_number;

    let mut eligible = Vec::new();
    let mut ineligible = Vec::new();
    for candidate in candidates {
        if candidate.current_grade != grade {
            return Err(EngineError::invalid_candidate(
                &candidate.id,
                "current_grade",
                format!(
                    "grade {} does not match the vacancy grade {}",
                    candidate.current_grade, grade
                ),
            ));
        }

        let decision = evaluate_eligibility(
            candidate,
            Some(vacancy),
            context.disciplinary_holds.contains(&candidate.id),
            context.evaluation_date,
            step_number,
        )?;
        audit_steps.push(decision.audit_step);
        step_number += 1;

        match decision.status.reason() {
            None => eligible.push(candidate.clone()),
            Some(reason) => ineligible.push(IneligibleCandidate {
                candidate_id: candidate.id.clone(),
                grade,
                reason,
            }),
        }
    }

    let ranking = rank_candidates(&eligible, step_number)?;
    step_number += ranking.audit_steps.len() as u32;
    audit_steps.extend(ranking.audit_steps);

    let promotion_slots = vacancy.promotion_slots as usize;
    let recognition_slots = vacancy.recognition_slots as usize;
    let reward_slots = vacancy.reward_slots as usize;

    let mut results = Vec::with_capacity(ranking.ranked.len());
    for (index, scored) in ranking.ranked.iter().enumerate() {
        let is_promoted = index < promotion_slots;
        let candidate = &scored.candidate;

        let mut result = AllocationResult {
            candidate_id: candidate.id.clone(),
            grade,
            current_step: candidate.current_step,
            promotion_cycle_id: vacancy.promotion_cycle_id.clone(),
            exam_score: scored.exam_score,
            performance_score: scored.performance_score,
            seniority_score: scored.seniority_score,
            combined_score: scored.combined_score,
            rank_within_grade: scored.rank_within_grade,
            total_in_grade: scored.total_in_grade,
            is_promoted,
            is_recognized: index < recognition_slots,
            is_rewarded: index < reward_slots,
            promoted_to_grade: None,
            promoted_to_step: None,
            promoted_salary: None,
            needs_review: false,
        };

        if is_promoted {
            let transition = resolve_step(
                context.salary_table,
                context.bounds,
                grade,
                candidate.current_step,
                vacancy.target_grade(),
                step_number,
            )?;
            let mut audit_step = transition.audit_step;
            audit_step.subject = candidate.id.clone();
            audit_steps.push(audit_step);
            step_number += 1;

            if let Some(warning) = transition.warning {
                warnings.push(warning.for_candidate(&candidate.id));
            }

            result.promoted_to_grade = Some(transition.destination_grade);
            result.promoted_to_step = Some(transition.new_step);
            result.promoted_salary = Some(transition.new_salary);
            result.needs_review = transition.needs_review;
        }

        results.push(result);
    }

    let summary = AllocationSummary::from_results(&results);
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "tier_allocation".to_string(),
        rule_name: "Tier Allocation".to_string(),
        subject: format!("grade {grade}"),
        input: serde_json::json!({
            "ranked": results.len(),
            "ineligible": ineligible.len(),
            "promotion_slots": vacancy.promotion_slots,
            "recognition_slots": vacancy.recognition_slots,
            "reward_slots": vacancy.reward_slots
        }),
        output: serde_json::json!({
            "promoted": summary.promoted,
            "recognized": summary.recognized,
            "rewarded": summary.rewarded
        }),
        reasoning: format!(
            "Top {} promoted, top {} recognized, top {} rewarded out of {} ranked",
            summary.promoted, summary.recognized, summary.rewarded, summary.total
        ),
    });

    Ok(GradeAllocationResult {
        allocation: GradeAllocation {
            grade,
            vacancy: Some(vacancy.clone()),
            results,
            ineligible,
            summary,
        },
        audit_steps,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IneligibilityReason, SalaryTableEntry};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn salary_table() -> SalaryTable {
        let mut entries = Vec::new();
        for grade in 6..=7u32 {
            for step in 1..=15u32 {
                entries.push(SalaryTableEntry {
                    grade,
                    step,
                    annual_amount: Decimal::from(400_000 + grade * 60_000 + step * 15_000),
                });
            }
        }
        SalaryTable::from_entries(date(2024, 1, 1), entries).unwrap()
    }

    fn create_test_candidate(id: &str, exam: &str, step: u32) -> CandidateRecord {
        CandidateRecord {
            id: id.to_string(),
            current_grade: 6,
            current_step: step,
            confirmation_date: Some(date(2015, 3, 1)),
            date_of_birth: Some(date(1988, 1, 1)),
            file_number: format!("NB/{id}"),
            date_of_last_promotion: Some(date(2020, 1, 1)),
            date_of_first_appointment: Some(date(2012, 1, 1)),
            failed_promotion_attempts: 0,
            exam_score: dec(exam),
            periodic_performance_score: dec("70"),
            is_active: true,
        }
    }

    fn seven_candidates() -> Vec<CandidateRecord> {
        vec![
            create_test_candidate("c1", "95", 4),
            create_test_candidate("c2", "90", 4),
            create_test_candidate("c3", "85", 4),
            create_test_candidate("c4", "80", 4),
            create_test_candidate("c5", "75", 4),
            create_test_candidate("c6", "70", 4),
            create_test_candidate("c7", "65", 4),
        ]
    }

    fn allocate(
        candidates: &[CandidateRecord],
        vacancy: &VacancyConfig,
        holds: &HashSet<String>,
    ) -> GradeAllocationResult {
        let table = salary_table();
        let bounds = GradeStepBounds::conraiss();
        let context = AllocationContext {
            vacancy,
            evaluation_date: date(2025, 6, 30),
            disciplinary_holds: holds,
            salary_table: &table,
            bounds: &bounds,
        };
        allocate_grade(candidates, &context, 1).unwrap()
    }

    #[test]
    fn test_overlap_promotion_2_recognition_5() {
        let vacancy = VacancyConfig::new(6, "2025", 2, 5, 0).unwrap();
        let result = allocate(&seven_candidates(), &vacancy, &HashSet::new());
        let results = &result.allocation.results;

        assert_eq!(results.len(), 7);
        let promoted: Vec<&str> = results
            .iter()
            .filter(|r| r.is_promoted)
            .map(|r| r.candidate_id.as_str())
            .collect();
        let recognized: Vec<&str> = results
            .iter()
            .filter(|r| r.is_recognized)
            .map(|r| r.candidate_id.as_str())
            .collect();

        assert_eq!(promoted, vec!["c1", "c2"]);
        assert_eq!(recognized, vec!["c1", "c2", "c3", "c4", "c5"]);
        assert!(results.iter().all(|r| !r.is_rewarded));

        // the top two hold both awards
        assert!(results[0].is_promoted && results[0].is_recognized);
        assert!(results[1].is_promoted && results[1].is_recognized);
        assert_eq!(result.allocation.summary.promoted, 2);
        assert_eq!(result.allocation.summary.recognized, 5);
    }

    #[test]
    fn test_promoted_candidates_are_placed_in_next_grade() {
        let vacancy = VacancyConfig::new(6, "2025", 1, 0, 0).unwrap();
        let result = allocate(&seven_candidates(), &vacancy, &HashSet::new());
        let top = &result.allocation.results[0];

        // grade 6 step 4 pays 820000; grade 7 step 1 pays 835000
        assert_eq!(top.promoted_to_grade, Some(7));
        assert_eq!(top.promoted_to_step, Some(1));
        assert_eq!(top.promoted_salary, Some(dec("835000")));
        assert!(!top.needs_review);

        let second = &result.allocation.results[1];
        assert_eq!(second.promoted_to_grade, None);
        assert_eq!(second.promoted_salary, None);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_excess_slots_stay_unfilled() {
        let vacancy = VacancyConfig::new(6, "2025", 10, 10, 10).unwrap();
        let candidates = vec![
            create_test_candidate("c1", "80", 4),
            create_test_candidate("c2", "70", 4),
        ];
        let result = allocate(&candidates, &vacancy, &HashSet::new());
        assert_eq!(result.allocation.summary.total, 2);
        assert_eq!(result.allocation.summary.promoted, 2);
        assert_eq!(result.allocation.summary.rewarded, 2);
    }

    #[test]
    fn test_empty_eligible_set_gives_empty_result() {
        let vacancy = VacancyConfig::new(6, "2025", 2, 2, 2).unwrap();
        let result = allocate(&[], &vacancy, &HashSet::new());
        assert!(result.allocation.results.is_empty());
        assert_eq!(result.allocation.summary, AllocationSummary::default());
    }

    #[test]
    fn test_ineligible_candidates_reported_and_excluded_from_ranking() {
        let vacancy = VacancyConfig::new(6, "2025", 2, 2, 2).unwrap();
        let mut candidates = seven_candidates();
        candidates[0].date_of_last_promotion = Some(date(2024, 1, 1));
        let holds: HashSet<String> = ["c2".to_string()].into_iter().collect();

        let result = allocate(&candidates, &vacancy, &holds);
        let allocation = &result.allocation;

        assert_eq!(allocation.results.len(), 5);
        assert_eq!(allocation.results[0].candidate_id, "c3");
        assert_eq!(allocation.results[0].total_in_grade, 5);
        assert_eq!(allocation.ineligible.len(), 2);
        assert_eq!(allocation.ineligible[0].reason, IneligibilityReason::CycleNotElapsed);
        assert_eq!(allocation.ineligible[1].reason, IneligibilityReason::DisciplinaryHold);
    }

    #[test]
    fn test_zero_promotion_slots_means_no_awards() {
        let vacancy = VacancyConfig::new(6, "2025", 0, 3, 3).unwrap();
        let result = allocate(&seven_candidates(), &vacancy, &HashSet::new());
        assert!(result.allocation.results.is_empty());
        assert_eq!(result.allocation.ineligible.len(), 7);
        assert!(result
            .allocation
            .ineligible
            .iter()
            .all(|c| c.reason == IneligibilityReason::NoVacancy));
    }

    #[test]
    fn test_equal_scores_broken_by_seniority() {
        let vacancy = VacancyConfig::new(6, "2025", 1, 0, 0).unwrap();
        // same exam and performance; c_senior holds a higher step, so it wins
        // seniority and therefore the combined score too
        let candidates = vec![
            create_test_candidate("c_junior", "80", 3),
            create_test_candidate("c_senior", "80", 9),
        ];
        let result = allocate(&candidates, &vacancy, &HashSet::new());
        assert_eq!(result.allocation.results[0].candidate_id, "c_senior");
        assert_eq!(result.allocation.results[0].seniority_score, dec("100"));
    }

    #[test]
    fn test_tie_on_combined_score_uses_seniority_order() {
        // senior: 70 x 0.7 + 50 x 0.2 + 100 x 0.1 = 69.00
        // junior: 70 x 0.7 + 100 x 0.2 + 0 x 0.1 = 69.00
        let mut senior = create_test_candidate("z_senior", "70", 9);
        senior.periodic_performance_score = dec("50");
        let mut junior = create_test_candidate("a_junior", "70", 3);
        junior.periodic_performance_score = dec("100");

        let result = rank_candidates(&[junior, senior], 1).unwrap();
        assert_eq!(result.ranked[0].combined_score, result.ranked[1].combined_score);
        assert_eq!(result.ranked[0].candidate.id, "z_senior");
        assert_eq!(result.ranked[0].rank_within_grade, 1);
        assert_eq!(result.ranked[1].rank_within_grade, 2);
    }

    #[test]
    fn test_candidate_outside_vacancy_grade_rejected() {
        let vacancy = VacancyConfig::new(7, "2025", 1, 0, 0).unwrap();
        let table = salary_table();
        let bounds = GradeStepBounds::conraiss();
        let holds = HashSet::new();
        let context = AllocationContext {
            vacancy: &vacancy,
            evaluation_date: date(2025, 6, 30),
            disciplinary_holds: &holds,
            salary_table: &table,
            bounds: &bounds,
        };
        let result = allocate_grade(&seven_candidates(), &context, 1);
        assert!(matches!(result, Err(EngineError::InvalidCandidate { .. })));
    }

    #[test]
    fn test_audit_steps_are_numbered_sequentially() {
        let vacancy = VacancyConfig::new(6, "2025", 2, 5, 1).unwrap();
        let result = allocate(&seven_candidates(), &vacancy, &HashSet::new());
        let numbers: Vec<u32> = result.audit_steps.iter().map(|s| s.step_number).collect();
        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        assert_eq!(numbers, expected);
    }

    proptest! {
        #[test]
        fn prop_tiers_never_exceed_slots(
            exams in prop::collection::vec(0u32..=100, 0..12),
            promotion in 0i64..6,
            recognition in 0i64..6,
            reward in 0i64..6,
        ) {
            let candidates: Vec<CandidateRecord> = exams
                .iter()
                .enumerate()
                .map(|(i, exam)| create_test_candidate(&format!("c{i:02}"), &exam.to_string(), 4))
                .collect();
            let vacancy = VacancyConfig::new(6, "2025", promotion, recognition, reward).unwrap();
            let result = allocate(&candidates, &vacancy, &HashSet::new());
            let summary = result.allocation.summary;

            prop_assert!(summary.promoted <= vacancy.promotion_slots);
            prop_assert!(summary.recognized <= vacancy.recognition_slots);
            prop_assert!(summary.rewarded <= vacancy.reward_slots);
            prop_assert!(summary.total as usize <= candidates.len());

            for pair in result.allocation.results.windows(2) {
                prop_assert!(pair[0].combined_score >= pair[1].combined_score);
            }
        }
    }
}

//! Seniority ranking.
//!
//! Seniority is a strict total order over candidates. It supplies the
//! seniority component of the combined score and breaks ties in the final
//! ranking.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::combined_score::round_2dp;
use crate::models::CandidateRecord;

/// A candidate's place in the seniority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeniorityPosition<'a> {
    /// The candidate.
    pub candidate: &'a CandidateRecord,
    /// 1-indexed seniority rank (1 is most senior).
    pub rank: u32,
    /// Seniority score derived from the rank (0-100).
    pub score: Decimal,
}

/// Earlier dates come first; a missing date sorts after every known date.
fn cmp_date_missing_last(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compares two candidates by seniority. `Less` means `a` is more senior.
///
/// Keys, in priority order:
/// 1. current step, higher first
/// 2. confirmation date, earlier first, missing last
/// 3. date of birth, earlier first, missing last
/// 4. file number, lexicographic
/// 5. candidate id, lexicographic
pub fn compare_seniority(a: &CandidateRecord, b: &CandidateRecord) -> Ordering {
    // 1. Current step (highest wins)
    match b.current_step.cmp(&a.current_step) {
        Ordering::Less => return Ordering::Less,
        Ordering::Greater => return Ordering::Greater,
        Ordering::Equal => {}
    }

    // 2. Confirmation date (earliest wins)
    match cmp_date_missing_last(a.confirmation_date, b.confirmation_date) {
        Ordering::Less => return Ordering::Less,
        Ordering::Greater => return Ordering::Greater,
        Ordering::Equal => {}
    }

    // 3. Date of birth (oldest wins)
    match cmp_date_missing_last(a.date_of_birth, b.date_of_birth) {
        Ordering::Less => return Ordering::Less,
        Ordering::Greater => return Ordering::Greater,
        Ordering::Equal => {}
    }

    // 4. File number
    match a.file_number.cmp(&b.file_number) {
        Ordering::Less => return Ordering::Less,
        Ordering::Greater => return Ordering::Greater,
        Ordering::Equal => {}
    }

    // 5. Candidate id
    a.id.cmp(&b.id)
}

/// Seniority score for 1-indexed rank `rank` out of `total` candidates.
///
/// A lone candidate scores 100; otherwise the most senior scores 100, the
/// least senior 0, and the rest are spread linearly.
///
/// ```
/// use promotion_engine::calculation::seniority_score;
/// use rust_decimal::Decimal;
///
/// assert_eq!(seniority_score(1, 1), Decimal::ONE_HUNDRED);
/// assert_eq!(seniority_score(2, 3), Decimal::new(50, 0));
/// ```
pub fn seniority_score(rank: u32, total: u32) -> Decimal {
    if total <= 1 {
        return Decimal::ONE_HUNDRED;
    }
    let above = Decimal::from(total.saturating_sub(rank));
    let span = Decimal::from(total - 1);
    round_2dp(above * Decimal::ONE_HUNDRED / span)
}

/// Orders candidates by seniority and assigns rank and score.
///
/// The result is independent of input order.
pub fn rank_by_seniority(candidates: &[CandidateRecord]) -> Vec<SeniorityPosition<'_>> {
    let mut ordered: Vec<&CandidateRecord> = candidates.iter().collect();
    ordered.sort_by(|a, b| compare_seniority(a, b));

    let total = ordered.len() as u32;
    ordered
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| {
            let rank = index as u32 + 1;
            SeniorityPosition {
                candidate,
                rank,
                score: seniority_score(rank, total),
            }
        })
        .collect()
}

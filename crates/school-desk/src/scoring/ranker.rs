use std::cmp::Ordering;

use super::domain::TestResult;

/// Assign 1-based ranks and percentiles in place. The input order is preserved.
pub fn rank_cohort(results: &mut [TestResult]) {
    let cohort_size = results.len();
    let mut order: Vec<usize> = (0..cohort_size).collect();
    order.sort_by(|&left, &right| standing_order(&results[left], &results[right]));

    for (position, index) in order.into_iter().enumerate() {
        let rank = position + 1;
        results[index].rank = rank;
        results[index].percentile = percentile(rank, cohort_size);
    }
}

/// `(cohort_size - rank) / cohort_size * 100`. Zero for an empty cohort.
pub fn percentile(rank: usize, cohort_size: usize) -> f64 {
    if cohort_size == 0 {
        return 0.0;
    }
    let rank = rank.min(cohort_size);
    (cohort_size - rank) as f64 / cohort_size as f64 * 100.0
}

/// Better standing sorts first.
pub fn standing_order(left: &TestResult, right: &TestResult) -> Ordering {
    right
        .total_marks
        .cmp(&left.total_marks)
        .then_with(|| right.tie_break.biology_marks.cmp(&left.tie_break.biology_marks))
        .then_with(|| {
            right
                .tie_break
                .chemistry_marks
                .cmp(&left.tie_break.chemistry_marks)
        })
        .then_with(|| left.wrong.cmp(&right.wrong))
        .then_with(|| left.tie_break.biology_wrong.cmp(&right.tie_break.biology_wrong))
        .then_with(|| {
            left.tie_break
                .chemistry_wrong
                .cmp(&right.tie_break.chemistry_wrong)
        })
        .then_with(|| registration_order(&left.reg_number, &right.reg_number))
}

/// Numeric comparison when both sides are integers, otherwise lexicographic.
fn registration_order(left: &str, right: &str) -> Ordering {
    let (left, right) = (left.trim(), right.trim());
    match (left.parse::<u128>(), right.parse::<u128>()) {
        (Ok(l), Ok(r)) => l.cmp(&r).then_with(|| left.cmp(right)),
        _ => left
            .to_ascii_lowercase()
            .cmp(&right.to_ascii_lowercase())
            .then_with(|| left.cmp(right)),
    }
}

#[cfg(test)]
pub(crate) fn registration_order_for_tests(left: &str, right: &str) -> Ordering {
    registration_order(left, right)
}

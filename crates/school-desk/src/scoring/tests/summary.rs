use chrono::NaiveDate;

use super::common::*;
use crate::scoring::marking::{MarkingScheme, SchemePolicy};
use crate::scoring::summary::{monthly_standings, CohortSummary};
use crate::scoring::{cohort_label, score_cohort, ScoringError, TestScorer};

#[test]
fn cohort_summary_reports_spread_and_toppers() {
    let reports = vec![
        report("S1", &[(1, "A"), (2, "D")]),
        report("S2", &[(1, "A")]),
        report("S3", &[(1, "A"), (2, "B")]),
    ];
    let results = score_cohort(&reports, &example_key(), MarkingScheme::FOUR_MINUS_ONE);
    let summary = CohortSummary::from_results(&results, 2);

    assert_eq!(summary.size, 3);
    assert_eq!(summary.highest_total, 8);
    assert_eq!(summary.lowest_total, 3);
    assert_eq!(summary.median_total, 4.0);
    assert!((summary.mean_total - 5.0).abs() < f64::EPSILON);
    assert_eq!(summary.toppers, vec!["S3".to_string(), "S2".to_string()]);
    assert!((summary.subject_means["Physics"] - 5.0).abs() < f64::EPSILON);
}

#[test]
fn empty_cohort_summary_is_zeroed() {
    let summary = CohortSummary::from_results(&[], 3);
    assert_eq!(summary.size, 0);
    assert!(summary.toppers.is_empty());
}

#[test]
fn scorer_groups_reports_by_test_and_date() {
    let mut later = report("S1", &[(1, "A")]);
    later.date = NaiveDate::from_ymd_opt(2025, 7, 21).expect("valid date");
    let reports = vec![
        report("S1", &[(1, "A"), (2, "D")]),
        report("S2", &[(1, "A")]),
        later,
    ];

    let scorer = TestScorer::new(
        vec![solution(1, &["A"], "Physics"), solution(2, &["B", "C"], "Physics")],
        SchemePolicy::Lenient,
    );
    let cohorts = scorer.score(&reports).expect("scores");

    assert_eq!(cohorts.len(), 2);
    assert_eq!(cohorts[0].date, test_date());
    assert_eq!(cohorts[0].results.len(), 2);
    assert_eq!(cohorts[0].scheme, MarkingScheme::FOUR_MINUS_ONE);
    assert_eq!(cohorts[1].results.len(), 1);
    assert_eq!(cohorts[1].results[0].rank, 1);
    assert_eq!(cohorts[0].standings()[0].reg_number, "S2");
}

#[test]
fn strict_scorer_refuses_unknown_schemes() {
    let mut odd = report("S1", &[(1, "A")]);
    odd.marks_type = "+2 Correct, -0.5 Wrong".to_string();

    let scorer = TestScorer::new(vec![solution(1, &["A"], "Physics")], SchemePolicy::Strict);
    match scorer.score(&[odd]) {
        Err(ScoringError::UnrecognizedMarkingScheme(label)) => {
            assert_eq!(label, "+2 Correct, -0.5 Wrong")
        }
        other => panic!("expected unrecognized scheme, got {other:?}"),
    }
}

#[test]
fn mixed_labels_score_with_the_first_and_count_the_rest() {
    let mut blank = report("S1", &[(1, "A")]);
    blank.marks_type = "  ".to_string();
    let mut sixteen = report("S2", &[(1, "A")]);
    sixteen.marks_type = "+16 CorrectAnswer, -4 WrongAnswer".to_string();
    let members = vec![blank, report("S3", &[(1, "A")]), sixteen, report("S4", &[(1, "B")])];

    assert_eq!(cohort_label(&members), (FOUR_MINUS_ONE, 1));
    assert_eq!(cohort_label(&members[..2]), (FOUR_MINUS_ONE, 0));
    assert_eq!(cohort_label(&members[..1]), ("", 0));

    let scorer = TestScorer::new(vec![solution(1, &["A"], "Physics")], SchemePolicy::Strict);
    let cohorts = scorer.score(&members).expect("scores");
    assert_eq!(cohorts.len(), 1);
    assert_eq!(cohorts[0].scheme, MarkingScheme::FOUR_MINUS_ONE);
    let s2 = cohorts[0]
        .results
        .iter()
        .find(|result| result.reg_number == "S2")
        .expect("S2 scored");
    assert_eq!(s2.total_marks, 4);
}

#[test]
fn monthly_standings_roll_up_per_student() {
    let mut second_sitting = report("S2", &[(1, "A"), (2, "B")]);
    second_sitting.date = NaiveDate::from_ymd_opt(2025, 7, 28).expect("valid date");
    let mut next_month = report("S2", &[(1, "A")]);
    next_month.date = NaiveDate::from_ymd_opt(2025, 8, 4).expect("valid date");

    let scorer = TestScorer::new(
        vec![solution(1, &["A"], "Physics"), solution(2, &["B", "C"], "Physics")],
        SchemePolicy::Lenient,
    );
    let cohorts = scorer
        .score(&[
            report("S1", &[(1, "A"), (2, "D")]),
            report("S2", &[(1, "A")]),
            second_sitting,
            next_month,
        ])
        .expect("scores");
    let results: Vec<_> = cohorts.into_iter().flat_map(|cohort| cohort.results).collect();

    let standings = monthly_standings(&results);
    assert_eq!(standings.len(), 3);

    let july_s2 = standings
        .iter()
        .find(|standing| standing.reg_number == "S2" && standing.month == 7)
        .expect("july standing");
    assert_eq!(july_s2.tests_taken, 2);
    assert_eq!(july_s2.total_marks, 12);
    assert_eq!(july_s2.best_rank, 1);
    assert!((july_s2.average_percentage - 75.0).abs() < 1e-9);
    assert_eq!(
        july_s2.month_start(),
        NaiveDate::from_ymd_opt(2025, 7, 1)
    );
}

use super::common::*;
use crate::scoring::domain::AnswerKey;
use crate::scoring::marking::MarkingScheme;
use crate::scoring::scorer::{effective_biology, score_report};

#[test]
fn worked_example_scores_both_students() {
    let key = example_key();
    let scheme = MarkingScheme::resolve(FOUR_MINUS_ONE);

    let first = score_report(&report("S1", &[(1, "A"), (2, "D")]), &key, scheme);
    assert_eq!((first.correct, first.wrong, first.unattempted), (1, 1, 0));
    assert_eq!(first.total_marks, 3);

    let second = score_report(&report("S2", &[(1, "A")]), &key, scheme);
    assert_eq!((second.correct, second.wrong, second.unattempted), (1, 0, 1));
    assert_eq!(second.total_marks, 4);
}

#[test]
fn multiple_correct_options_are_accepted_case_insensitively() {
    let key = example_key();
    let result = score_report(
        &report("S3", &[(1, " a "), (2, "c")]),
        &key,
        MarkingScheme::FOUR_MINUS_ONE,
    );
    assert_eq!(result.correct, 2);
    assert_eq!(result.total_marks, 8);
    assert!((result.percentage - 100.0).abs() < f64::EPSILON);
}

#[test]
fn grace_question_credits_everyone() {
    let key = AnswerKey::new(vec![solution(1, &["A"], "Physics"), grace(2, "Physics")]);
    let scheme = MarkingScheme::FOUR_MINUS_ONE;

    let answered_wrong = score_report(&report("G1", &[(1, "A"), (2, "D")]), &key, scheme);
    let skipped = score_report(&report("G2", &[(1, "A")]), &key, scheme);
    let answered_right = score_report(&report("G3", &[(1, "A"), (2, "B")]), &key, scheme);

    for result in [&answered_wrong, &skipped, &answered_right] {
        assert_eq!(result.correct, 2);
        assert_eq!(result.wrong, 0);
        assert_eq!(result.unattempted, 0);
        assert_eq!(result.total_marks, 8);
    }
}

#[test]
fn blank_and_missing_answers_count_as_unattempted() {
    let key = AnswerKey::new(vec![
        solution(1, &["A"], "Physics"),
        solution(2, &["B"], "Physics"),
        solution(3, &["C"], "Physics"),
    ]);
    let mut blank = report("U1", &[(1, "A"), (2, "   ")]);
    blank.question_answers.insert(3, None);

    let result = score_report(&blank, &key, MarkingScheme::FOUR_MINUS_ONE);
    assert_eq!(result.unattempted, 2);
    assert_eq!(result.total_marks, 4);

    let missing = score_report(&report("U2", &[(1, "A")]), &key, MarkingScheme::FOUR_MINUS_ONE);
    assert_eq!(missing.unattempted, 2);
    assert_eq!(missing.total_marks, 4);
}

#[test]
fn empty_correct_options_can_only_be_wrong_or_unattempted() {
    let key = AnswerKey::new(vec![solution(1, &[], "Physics")]);
    let answered = score_report(&report("E1", &[(1, "A")]), &key, MarkingScheme::FOUR_MINUS_ONE);
    assert_eq!((answered.correct, answered.wrong), (0, 1));

    let skipped = score_report(&report("E2", &[]), &key, MarkingScheme::FOUR_MINUS_ONE);
    assert_eq!((skipped.correct, skipped.unattempted), (0, 1));
}

#[test]
fn answers_outside_the_key_are_ignored() {
    let key = example_key();
    let result = score_report(
        &report("X1", &[(1, "A"), (2, "B"), (99, "A")]),
        &key,
        MarkingScheme::FOUR_MINUS_ONE,
    );
    assert_eq!(result.correct + result.wrong + result.unattempted, 2);
    assert_eq!(result.total_marks, 8);
}

#[test]
fn accuracy_and_percentage_guard_against_zero_denominators() {
    let empty_key = AnswerKey::new(Vec::new());
    let result = score_report(&report("Z1", &[(1, "A")]), &empty_key, MarkingScheme::FOUR_MINUS_ONE);
    assert_eq!(result.accuracy, 0.0);
    assert_eq!(result.percentage, 0.0);

    let zero_points = MarkingScheme { correct: 0, wrong: 0 };
    let result = score_report(&report("Z2", &[(1, "A")]), &example_key(), zero_points);
    assert_eq!(result.percentage, 0.0);
    assert!((result.accuracy - 100.0).abs() < f64::EPSILON);
}

#[test]
fn accuracy_uses_attempted_questions_only() {
    let key = AnswerKey::new(vec![
        solution(1, &["A"], "Physics"),
        solution(2, &["B"], "Physics"),
        solution(3, &["C"], "Physics"),
        solution(4, &["D"], "Physics"),
    ]);
    let result = score_report(
        &report("A1", &[(1, "A"), (2, "A"), (3, "C")]),
        &key,
        MarkingScheme::FOUR_MINUS_ONE,
    );
    assert!((result.accuracy - 200.0 / 3.0).abs() < 1e-9);
    assert!((result.percentage - 7.0 / 16.0 * 100.0).abs() < 1e-9);
}

#[test]
fn subject_tallies_follow_the_key() {
    let key = three_subject_key();
    let result = score_report(
        &report("T1", &[(1, "A"), (2, "D")]),
        &key,
        MarkingScheme::FOUR_MINUS_ONE,
    );

    let biology = result.subjects.get("Biology").expect("biology tally");
    assert_eq!((biology.correct, biology.marks), (1, 4));
    let chemistry = result.subjects.get("Chemistry").expect("chemistry tally");
    assert_eq!((chemistry.wrong, chemistry.marks), (1, -1));
    let physics = result.subjects.get("Physics").expect("physics tally");
    assert_eq!(physics.unattempted, 1);

    assert_eq!(result.tie_break.biology_marks, 4);
    assert_eq!(result.tie_break.chemistry_marks, -1);
    assert_eq!(result.tie_break.chemistry_wrong, 1);
}

#[test]
fn biology_falls_back_to_botany_plus_zoology() {
    let key = AnswerKey::new(vec![
        solution(1, &["A"], "Botany"),
        solution(2, &["B"], "Zoology"),
        solution(3, &["C"], "Zoology"),
    ]);
    let result = score_report(
        &report("B1", &[(1, "A"), (2, "B"), (3, "A")]),
        &key,
        MarkingScheme::FOUR_MINUS_ONE,
    );

    let biology = effective_biology(&result.subjects);
    assert_eq!(biology.marks, 7);
    assert_eq!(biology.wrong, 1);
    assert_eq!(result.tie_break.biology_marks, 7);
    assert_eq!(result.tie_break.biology_wrong, 1);
}

#[test]
fn biology_with_marks_ignores_botany_and_zoology() {
    let key = AnswerKey::new(vec![
        solution(1, &["A"], "Biology"),
        solution(2, &["B"], "Botany"),
        solution(3, &["C"], "Zoology"),
    ]);
    let result = score_report(
        &report("B2", &[(1, "A"), (2, "B"), (3, "C")]),
        &key,
        MarkingScheme::FOUR_MINUS_ONE,
    );
    assert_eq!(result.tie_break.biology_marks, 4);
}

#[test]
fn duplicate_solutions_keep_the_first_entry() {
    let key = AnswerKey::new(vec![
        solution(1, &["A"], "Physics"),
        solution(1, &["B"], "Chemistry"),
    ]);
    assert_eq!(key.question_count(), 1);
    let kept = key.get(1).expect("question 1 present");
    assert_eq!(kept.correct_options, vec!["A".to_string()]);
    assert_eq!(kept.subject, "Physics");
}

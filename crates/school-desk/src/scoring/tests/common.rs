use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::scoring::domain::{AnswerKey, Report, Solution};

pub(super) const FOUR_MINUS_ONE: &str = "+4 CorrectAnswer, -1 WrongAnswer";

pub(super) fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 14).expect("valid test date")
}

pub(super) fn solution(question: u32, options: &[&str], subject: &str) -> Solution {
    Solution {
        question_number: question,
        correct_options: options.iter().map(|option| option.to_string()).collect(),
        is_grace: false,
        subject: subject.to_string(),
    }
}

pub(super) fn grace(question: u32, subject: &str) -> Solution {
    Solution {
        is_grace: true,
        ..solution(question, &[], subject)
    }
}

pub(super) fn report(reg_number: &str, answers: &[(u32, &str)]) -> Report {
    let question_answers: BTreeMap<u32, Option<String>> = answers
        .iter()
        .map(|(question, option)| (*question, Some(option.to_string())))
        .collect();

    Report {
        reg_number: reg_number.to_string(),
        test_name: "NEET Mock 3".to_string(),
        date: test_date(),
        marks_type: FOUR_MINUS_ONE.to_string(),
        question_answers,
    }
}

/// Two-question key from the worked example: q1 accepts A, q2 accepts B or C.
pub(super) fn example_key() -> AnswerKey {
    AnswerKey::new(vec![
        solution(1, &["A"], "Physics"),
        solution(2, &["B", "C"], "Physics"),
    ])
}

/// One question each for Biology, Chemistry, and Physics.
pub(super) fn three_subject_key() -> AnswerKey {
    AnswerKey::new(vec![
        solution(1, &["A"], "Biology"),
        solution(2, &["B"], "Chemistry"),
        solution(3, &["C"], "Physics"),
    ])
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ingest::dates::deserialize_flexible_date;

/// One student's raw answer submission for one test sitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub reg_number: String,
    #[serde(default)]
    pub test_name: String,
    #[serde(deserialize_with = "deserialize_flexible_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub marks_type: String,
    #[serde(default)]
    pub question_answers: BTreeMap<u32, Option<String>>,
}

impl Report {
    /// The marked option for a question, or `None` when blank or absent.
    pub fn answer(&self, question: u32) -> Option<String> {
        self.question_answers
            .get(&question)
            .and_then(|value| value.as_deref())
            .map(normalize_option)
            .filter(|value| !value.is_empty())
    }
}

/// Answer-key entry for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub question_number: u32,
    #[serde(default)]
    pub correct_options: Vec<String>,
    #[serde(default)]
    pub is_grace: bool,
    #[serde(default)]
    pub subject: String,
}

impl Solution {
    pub fn accepts(&self, option: &str) -> bool {
        let option = normalize_option(option);
        self.correct_options
            .iter()
            .any(|accepted| normalize_option(accepted) == option)
    }
}

/// Deduplicated answer key, ordered by question number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerKey {
    questions: BTreeMap<u32, Solution>,
}

impl AnswerKey {
    pub fn new(solutions: impl IntoIterator<Item = Solution>) -> Self {
        let mut questions = BTreeMap::new();
        for mut solution in solutions {
            solution.correct_options = solution
                .correct_options
                .iter()
                .map(|option| normalize_option(option))
                .filter(|option| !option.is_empty())
                .collect();
            solution.subject = solution.subject.trim().to_string();
            questions.entry(solution.question_number).or_insert(solution);
        }
        Self { questions }
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn solutions(&self) -> impl Iterator<Item = &Solution> {
        self.questions.values()
    }

    pub fn get(&self, question: u32) -> Option<&Solution> {
        self.questions.get(&question)
    }
}

/// Running correct/wrong/marks subtotal for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTally {
    pub correct: u32,
    pub wrong: u32,
    pub unattempted: u32,
    pub marks: i64,
}

impl SubjectTally {
    pub fn merge(self, other: SubjectTally) -> SubjectTally {
        SubjectTally {
            correct: self.correct + other.correct,
            wrong: self.wrong + other.wrong,
            unattempted: self.unattempted + other.unattempted,
            marks: self.marks + other.marks,
        }
    }
}

/// Subject figures the ranker consults after total marks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TieBreak {
    pub biology_marks: i64,
    pub biology_wrong: u32,
    pub chemistry_marks: i64,
    pub chemistry_wrong: u32,
}

/// Derived standing of one student in one test cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub reg_number: String,
    pub test_name: String,
    pub date: NaiveDate,
    pub marks_type: String,
    pub correct: u32,
    pub wrong: u32,
    pub unattempted: u32,
    pub total_marks: i64,
    pub accuracy: f64,
    pub percentage: f64,
    pub rank: usize,
    pub percentile: f64,
    pub subjects: BTreeMap<String, SubjectTally>,
    pub tie_break: TieBreak,
}

impl TestResult {
    pub fn attempted(&self) -> u32 {
        self.correct + self.wrong
    }
}

pub(crate) fn normalize_option(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}

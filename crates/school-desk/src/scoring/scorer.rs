use std::collections::BTreeMap;

use super::domain::{AnswerKey, Report, Solution, SubjectTally, TestResult, TieBreak};
use super::marking::{AnswerOutcome, MarkingScheme};

const BIOLOGY: &str = "biology";
const BOTANY: &str = "botany";
const ZOOLOGY: &str = "zoology";
const CHEMISTRY: &str = "chemistry";

/// Score one report against the answer key. Rank and percentile are left at zero for the ranker.
pub fn score_report(report: &Report, key: &AnswerKey, scheme: MarkingScheme) -> TestResult {
    let mut correct = 0u32;
    let mut wrong = 0u32;
    let mut unattempted = 0u32;
    let mut total_marks = 0i64;
    let mut subjects: BTreeMap<String, SubjectTally> = BTreeMap::new();

    for solution in key.solutions() {
        let outcome = judge(solution, report.answer(solution.question_number).as_deref());
        let points = scheme.points_for(outcome);
        total_marks += points;

        let tally = subjects.entry(solution.subject.clone()).or_default();
        tally.marks += points;
        match outcome {
            AnswerOutcome::Correct => {
                correct += 1;
                tally.correct += 1;
            }
            AnswerOutcome::Wrong => {
                wrong += 1;
                tally.wrong += 1;
            }
            AnswerOutcome::Unattempted => {
                unattempted += 1;
                tally.unattempted += 1;
            }
        }
    }

    let attempted = correct + wrong;
    let accuracy = if attempted == 0 {
        0.0
    } else {
        f64::from(correct) / f64::from(attempted) * 100.0
    };

    let max_marks = key.question_count() as i64 * i64::from(scheme.correct);
    let percentage = if max_marks == 0 {
        0.0
    } else {
        total_marks as f64 / max_marks as f64 * 100.0
    };

    let tie_break = tie_break_figures(&subjects);

    TestResult {
        reg_number: report.reg_number.trim().to_string(),
        test_name: report.test_name.clone(),
        date: report.date,
        marks_type: report.marks_type.clone(),
        correct,
        wrong,
        unattempted,
        total_marks,
        accuracy,
        percentage,
        rank: 0,
        percentile: 0.0,
        subjects,
        tie_break,
    }
}

fn judge(solution: &Solution, answer: Option<&str>) -> AnswerOutcome {
    if solution.is_grace {
        return AnswerOutcome::Correct;
    }

    match answer {
        None => AnswerOutcome::Unattempted,
        Some(option) if solution.accepts(option) => AnswerOutcome::Correct,
        Some(_) => AnswerOutcome::Wrong,
    }
}

/// Effective Biology and Chemistry figures. Biology falls back to Botany + Zoology when its own
/// subtotal carries no marks.
pub fn tie_break_figures(subjects: &BTreeMap<String, SubjectTally>) -> TieBreak {
    let biology = effective_biology(subjects);
    let chemistry = subject_tally(subjects, CHEMISTRY).unwrap_or_default();

    TieBreak {
        biology_marks: biology.marks,
        biology_wrong: biology.wrong,
        chemistry_marks: chemistry.marks,
        chemistry_wrong: chemistry.wrong,
    }
}

pub fn effective_biology(subjects: &BTreeMap<String, SubjectTally>) -> SubjectTally {
    let biology = subject_tally(subjects, BIOLOGY);
    if let Some(tally) = biology.filter(|tally| tally.marks != 0) {
        return tally;
    }

    let botany = subject_tally(subjects, BOTANY);
    let zoology = subject_tally(subjects, ZOOLOGY);
    match (botany, zoology) {
        (None, None) => biology.unwrap_or_default(),
        (botany, zoology) => botany.unwrap_or_default().merge(zoology.unwrap_or_default()),
    }
}

fn subject_tally(subjects: &BTreeMap<String, SubjectTally>, name: &str) -> Option<SubjectTally> {
    subjects
        .iter()
        .filter(|(subject, _)| subject.trim().eq_ignore_ascii_case(name))
        .map(|(_, tally)| *tally)
        .reduce(SubjectTally::merge)
}

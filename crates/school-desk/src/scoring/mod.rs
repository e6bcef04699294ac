//! Test-result scoring and cohort ranking.
//!
//! Everything here is pure: reports and an answer key go in, ranked results come out. Nothing
//! touches the network or the session.

pub mod domain;
pub mod marking;
pub mod ranker;
pub mod scorer;
pub mod summary;

#[cfg(test)]
mod tests;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub use domain::{AnswerKey, Report, Solution, SubjectTally, TestResult, TieBreak};
pub use marking::{AnswerOutcome, MarkingScheme, SchemePolicy};
pub use ranker::{percentile, rank_cohort};
pub use scorer::score_report;
pub use summary::{monthly_standings, CohortSummary, MonthlyStanding};

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("unrecognized marking scheme '{0}'")]
    UnrecognizedMarkingScheme(String),
}

/// Score and rank one cohort under a single marking scheme.
pub fn score_cohort(reports: &[Report], key: &AnswerKey, scheme: MarkingScheme) -> Vec<TestResult> {
    let mut results: Vec<TestResult> = reports
        .iter()
        .map(|report| score_report(report, key, scheme))
        .collect();
    rank_cohort(&mut results);
    results
}

/// Reports sharing a test name and date, ranked together.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
    pub test_name: String,
    pub date: NaiveDate,
    pub scheme: MarkingScheme,
    pub results: Vec<TestResult>,
}

impl Cohort {
    pub fn summary(&self, topper_count: usize) -> CohortSummary {
        CohortSummary::from_results(&self.results, topper_count)
    }

    /// Results in rank order.
    pub fn standings(&self) -> Vec<&TestResult> {
        let mut ranked: Vec<&TestResult> = self.results.iter().collect();
        ranked.sort_by_key(|result| result.rank);
        ranked
    }
}

/// Groups reports into cohorts and scores each against a shared answer key.
#[derive(Debug, Clone)]
pub struct TestScorer {
    key: AnswerKey,
    policy: SchemePolicy,
}

impl TestScorer {
    pub fn new(solutions: impl IntoIterator<Item = Solution>, policy: SchemePolicy) -> Self {
        Self {
            key: AnswerKey::new(solutions),
            policy,
        }
    }

    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    pub fn score(&self, reports: &[Report]) -> Result<Vec<Cohort>, ScoringError> {
        let mut grouped: BTreeMap<(String, NaiveDate), Vec<Report>> = BTreeMap::new();
        for report in reports {
            grouped
                .entry((report.test_name.trim().to_string(), report.date))
                .or_default()
                .push(report.clone());
        }

        let mut cohorts = Vec::with_capacity(grouped.len());
        for ((test_name, date), members) in grouped {
            let (label, disagreeing) = cohort_label(&members);
            if disagreeing > 0 {
                warn!(
                    test = %test_name,
                    %date,
                    marks_type = label,
                    disagreeing,
                    "reports in one cohort carry different marking labels, scoring with the first"
                );
            }
            let scheme = MarkingScheme::resolve_with(label, self.policy)?;
            let results = score_cohort(&members, &self.key, scheme);

            debug!(
                test = %test_name,
                %date,
                students = results.len(),
                questions = self.key.question_count(),
                "scored cohort"
            );

            cohorts.push(Cohort {
                test_name,
                date,
                scheme,
                results,
            });
        }

        Ok(cohorts)
    }
}

/// First non-empty marking label in a cohort, with how many other non-empty labels differ from it.
fn cohort_label(members: &[Report]) -> (&str, usize) {
    let mut labels = members
        .iter()
        .map(|report| report.marks_type.trim())
        .filter(|label| !label.is_empty());
    let Some(first) = labels.next() else {
        return ("", 0);
    };
    (first, labels.filter(|label| *label != first).count())
}

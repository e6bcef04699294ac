use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use super::domain::TestResult;

/// Aggregate figures for one ranked cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortSummary {
    pub size: usize,
    pub highest_total: i64,
    pub lowest_total: i64,
    pub mean_total: f64,
    pub median_total: f64,
    pub mean_percentage: f64,
    pub subject_means: BTreeMap<String, f64>,
    pub toppers: Vec<String>,
}

impl CohortSummary {
    pub fn from_results(results: &[TestResult], topper_count: usize) -> CohortSummary {
        if results.is_empty() {
            return CohortSummary {
                size: 0,
                highest_total: 0,
                lowest_total: 0,
                mean_total: 0.0,
                median_total: 0.0,
                mean_percentage: 0.0,
                subject_means: BTreeMap::new(),
                toppers: Vec::new(),
            };
        }

        let size = results.len();
        let mut totals: Vec<i64> = results.iter().map(|result| result.total_marks).collect();
        totals.sort_unstable();

        let median_total = if size % 2 == 0 {
            (totals[size / 2 - 1] + totals[size / 2]) as f64 / 2.0
        } else {
            totals[size / 2] as f64
        };

        let mut subject_sums: BTreeMap<String, i64> = BTreeMap::new();
        for result in results {
            for (subject, tally) in &result.subjects {
                *subject_sums.entry(subject.clone()).or_default() += tally.marks;
            }
        }
        let subject_means = subject_sums
            .into_iter()
            .map(|(subject, sum)| (subject, sum as f64 / size as f64))
            .collect();

        let mut ranked: Vec<&TestResult> = results.iter().collect();
        ranked.sort_by_key(|result| result.rank);
        let toppers = ranked
            .into_iter()
            .take(topper_count)
            .map(|result| result.reg_number.clone())
            .collect();

        CohortSummary {
            size,
            highest_total: totals[size - 1],
            lowest_total: totals[0],
            mean_total: totals.iter().sum::<i64>() as f64 / size as f64,
            median_total,
            mean_percentage: results.iter().map(|result| result.percentage).sum::<f64>()
                / size as f64,
            subject_means,
            toppers,
        }
    }
}

/// One student's standing across all tests sat in a calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStanding {
    pub reg_number: String,
    pub year: i32,
    pub month: u32,
    pub tests_taken: usize,
    pub total_marks: i64,
    pub average_percentage: f64,
    pub average_percentile: f64,
    pub best_rank: usize,
}

impl MonthlyStanding {
    pub fn month_start(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

/// Roll ranked results up per student per month, ordered by month then registration number.
pub fn monthly_standings(results: &[TestResult]) -> Vec<MonthlyStanding> {
    let mut grouped: BTreeMap<(i32, u32, String), Vec<&TestResult>> = BTreeMap::new();
    for result in results {
        grouped
            .entry((result.date.year(), result.date.month(), result.reg_number.clone()))
            .or_default()
            .push(result);
    }

    grouped
        .into_iter()
        .map(|((year, month, reg_number), entries)| {
            let tests_taken = entries.len();
            let count = tests_taken as f64;
            MonthlyStanding {
                reg_number,
                year,
                month,
                tests_taken,
                total_marks: entries.iter().map(|entry| entry.total_marks).sum(),
                average_percentage: entries.iter().map(|entry| entry.percentage).sum::<f64>()
                    / count,
                average_percentile: entries.iter().map(|entry| entry.percentile).sum::<f64>()
                    / count,
                best_rank: entries
                    .iter()
                    .map(|entry| entry.rank)
                    .filter(|rank| *rank > 0)
                    .min()
                    .unwrap_or(0),
            }
        })
        .collect()
}

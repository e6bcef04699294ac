use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::info;

use super::admissions::RowIssue;
use super::dates::parse_flexible_date;
use super::mapping::Field;
use super::sheet::Sheet;
use super::IngestError;
use crate::scoring::{Report, Solution};

/// Answer-sheet rows converted to reports, with the rows that could not be read.
#[derive(Debug, Clone, Default)]
pub struct ReportSheet {
    pub reports: Vec<Report>,
    pub rejected: Vec<RowIssue>,
}

/// Read student answer rows: one row per student, one column per question.
///
/// `test_name` and `default_date` fill in when the sheet carries no such column.
pub fn parse_reports(
    sheet: &Sheet,
    test_name: &str,
    default_date: Option<NaiveDate>,
) -> Result<ReportSheet, IngestError> {
    sheet.require(&[Field::RegNumber])?;
    if sheet.question_count() == 0 {
        return Err(IngestError::MissingColumns(vec!["Q1..Qn"]));
    }
    if default_date.is_none() {
        sheet.require(&[Field::TestDate])?;
    }

    let mut parsed = ReportSheet::default();
    for row in sheet.rows() {
        let Some(reg_number) = sheet.get(row, Field::RegNumber) else {
            parsed.rejected.push(RowIssue {
                line: row.line,
                field: Field::RegNumber.label(),
                message: "registration number is required".to_string(),
            });
            continue;
        };

        let date = match sheet.get(row, Field::TestDate) {
            Some(raw) => match parse_flexible_date(raw) {
                Some(date) => date,
                None => {
                    parsed.rejected.push(RowIssue {
                        line: row.line,
                        field: Field::TestDate.label(),
                        message: format!("'{raw}' is not a recognized date"),
                    });
                    continue;
                }
            },
            None => match default_date {
                Some(date) => date,
                None => {
                    parsed.rejected.push(RowIssue {
                        line: row.line,
                        field: Field::TestDate.label(),
                        message: "test date is required".to_string(),
                    });
                    continue;
                }
            },
        };

        let question_answers: BTreeMap<u32, Option<String>> = sheet
            .answers(row)
            .map(|(question, answer)| (question, answer.map(str::to_string)))
            .collect();

        parsed.reports.push(Report {
            reg_number: reg_number.to_string(),
            test_name: sheet
                .get(row, Field::TestName)
                .unwrap_or(test_name)
                .to_string(),
            date,
            marks_type: sheet
                .get(row, Field::MarksType)
                .unwrap_or_default()
                .to_string(),
            question_answers,
        });
    }

    info!(
        reports = parsed.reports.len(),
        rejected = parsed.rejected.len(),
        questions = sheet.question_count(),
        "answer sheet read"
    );
    Ok(parsed)
}

/// Read an answer key: one row per question.
pub fn parse_solutions(sheet: &Sheet) -> Result<Vec<Solution>, IngestError> {
    sheet.require(&[Field::QuestionNumber, Field::CorrectOptions])?;

    let mut solutions = Vec::with_capacity(sheet.rows().len());
    for row in sheet.rows() {
        let raw_number = sheet.get(row, Field::QuestionNumber).unwrap_or_default();
        let question_number = raw_number
            .trim_start_matches(['Q', 'q'])
            .trim()
            .parse::<u32>()
            .map_err(|_| IngestError::InvalidRow {
                line: row.line,
                message: format!("'{raw_number}' is not a question number"),
            })?;

        let is_grace = sheet
            .get(row, Field::IsGrace)
            .map(parse_flag)
            .unwrap_or(false);

        solutions.push(Solution {
            question_number,
            correct_options: split_options(sheet.get(row, Field::CorrectOptions).unwrap_or_default()),
            is_grace,
            subject: sheet
                .get(row, Field::Subject)
                .unwrap_or_default()
                .to_string(),
        });
    }

    Ok(solutions)
}

fn split_options(raw: &str) -> Vec<String> {
    raw.split([',', '|', '/', ';', ' '])
        .map(|option| option.trim().to_ascii_uppercase())
        .filter(|option| !option.is_empty())
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "grace"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sheet(csv: &str) -> Sheet {
        Sheet::from_csv(Cursor::new(csv.to_string())).expect("csv parses")
    }

    #[test]
    fn reports_collect_question_columns() {
        let parsed = parse_reports(
            &sheet(
                "RegNumber,Date,Marks Type,Q1,Q2,Q3\n\
                 S1,14-07-2025,+4 CorrectAnswer -1 WrongAnswer,A,,c\n\
                 ,14-07-2025,,A,B,C\n\
                 S2,someday,,A,B,C\n",
            ),
            "Mock 3",
            None,
        )
        .expect("reports parse");

        assert_eq!(parsed.reports.len(), 1);
        assert_eq!(parsed.rejected.len(), 2);
        let report = &parsed.reports[0];
        assert_eq!(report.test_name, "Mock 3");
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2025, 7, 14).expect("date"));
        assert_eq!(report.answer(1).as_deref(), Some("A"));
        assert_eq!(report.answer(2), None);
        assert_eq!(report.answer(3).as_deref(), Some("C"));
    }

    #[test]
    fn default_date_covers_sheets_without_a_date_column() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 14).expect("date");
        let parsed = parse_reports(&sheet("reg_number,1,2\nS1,A,B\n"), "Mock 3", Some(date))
            .expect("reports parse");
        assert_eq!(parsed.reports[0].date, date);

        let error = parse_reports(&sheet("reg_number,1,2\nS1,A,B\n"), "Mock 3", None)
            .expect_err("date column required");
        assert!(matches!(error, IngestError::MissingColumns(_)));
    }

    #[test]
    fn solutions_split_options_and_read_grace_flags() {
        let solutions = parse_solutions(&sheet(
            "Question No,Correct Answer,Grace,Subject\nQ1,A,,Botany\n2,\"b, c\",no,Zoology\n3,,yes,Chemistry\n",
        ))
        .expect("solutions parse");

        assert_eq!(solutions.len(), 3);
        assert_eq!(solutions[0].question_number, 1);
        assert_eq!(solutions[1].correct_options, vec!["B".to_string(), "C".to_string()]);
        assert!(!solutions[1].is_grace);
        assert!(solutions[2].is_grace);
        assert!(solutions[2].correct_options.is_empty());
        assert_eq!(solutions[2].subject, "Chemistry");
    }

    #[test]
    fn unreadable_question_numbers_fail_with_the_line() {
        let error = parse_solutions(&sheet("qno,answer\nfirst,A\n")).expect_err("bad number");
        match error {
            IngestError::InvalidRow { line, .. } => assert_eq!(line, 2),
            other => panic!("expected invalid row, got {other:?}"),
        }
    }
}

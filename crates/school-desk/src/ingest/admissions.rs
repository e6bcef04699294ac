use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, info};

use super::dates::parse_flexible_date;
use super::mapping::Field;
use super::sheet::{Sheet, SheetRow};
use super::IngestError;

/// One validated admission row, shaped for `POST /api/bulkcreatestudents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub reg_number: String,
    pub student_name: String,
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Why a row was left out of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowIssue {
    pub line: usize,
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdmissionBatch {
    pub students: Vec<StudentRecord>,
    pub rejected: Vec<RowIssue>,
}

impl AdmissionBatch {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

const REQUIRED: &[Field] = &[Field::RegNumber, Field::StudentName, Field::ClassName];

/// Validate every row of an admissions sheet. Column problems fail the whole sheet; row
/// problems reject just that row.
pub fn parse_admissions(sheet: &Sheet) -> Result<AdmissionBatch, IngestError> {
    sheet.require(REQUIRED)?;

    let mut batch = AdmissionBatch::default();
    let mut seen: HashSet<String> = HashSet::new();

    for row in sheet.rows() {
        match student_from_row(sheet, row) {
            Ok(student) => {
                let key = student.reg_number.to_ascii_uppercase();
                if seen.insert(key) {
                    batch.students.push(student);
                } else {
                    batch.rejected.push(RowIssue {
                        line: row.line,
                        field: Field::RegNumber.label(),
                        message: format!(
                            "registration number {} appears earlier in the file",
                            student.reg_number
                        ),
                    });
                }
            }
            Err(issues) => {
                debug!(line = row.line, issues = issues.len(), "admission row rejected");
                batch.rejected.extend(issues);
            }
        }
    }

    info!(
        accepted = batch.students.len(),
        rejected = batch.rejected.len(),
        "admission sheet validated"
    );
    Ok(batch)
}

fn student_from_row(sheet: &Sheet, row: &SheetRow) -> Result<StudentRecord, Vec<RowIssue>> {
    let mut issues = Vec::new();
    let mut issue = |field: Field, message: String| {
        issues.push(RowIssue {
            line: row.line,
            field: field.label(),
            message,
        })
    };

    let text = |field: Field| sheet.get(row, field).map(str::to_string);

    let reg_number = match text(Field::RegNumber) {
        Some(value) if registration_pattern().is_match(&value) => value,
        Some(value) => {
            issue(
                Field::RegNumber,
                format!("'{value}' is not a valid registration number"),
            );
            String::new()
        }
        None => {
            issue(Field::RegNumber, "registration number is required".to_string());
            String::new()
        }
    };

    let student_name = text(Field::StudentName).unwrap_or_else(|| {
        issue(Field::StudentName, "student name is required".to_string());
        String::new()
    });

    let class_name = text(Field::ClassName).unwrap_or_else(|| {
        issue(Field::ClassName, "class is required".to_string());
        String::new()
    });

    let phone = match text(Field::Phone) {
        Some(raw) => match normalize_phone(&raw) {
            Some(phone) => Some(phone),
            None => {
                issue(Field::Phone, format!("'{raw}' is not a 10-digit mobile number"));
                None
            }
        },
        None => None,
    };

    let email = match text(Field::Email) {
        Some(raw) if email_pattern().is_match(&raw) => Some(raw),
        Some(raw) => {
            issue(Field::Email, format!("'{raw}' is not a valid email address"));
            None
        }
        None => None,
    };

    let mut date = |field: Field| match text(field) {
        Some(raw) => match parse_flexible_date(&raw) {
            Some(date) => Some(date),
            None => {
                issue(field, format!("'{raw}' is not a recognized date"));
                None
            }
        },
        None => None,
    };
    let date_of_birth = date(Field::DateOfBirth);
    let admission_date = date(Field::AdmissionDate);

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(StudentRecord {
        reg_number,
        student_name,
        class_name,
        section: text(Field::Section),
        campus: text(Field::Campus),
        father_name: text(Field::FatherName),
        mother_name: text(Field::MotherName),
        date_of_birth,
        admission_date,
        gender: text(Field::Gender),
        phone,
        email,
        address: text(Field::Address),
    })
}

/// Ten-digit Indian mobile number, after dropping separators, `+91`/`91`, or a trunk `0`.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let local = match digits.len() {
        12 if digits.starts_with("91") => &digits[2..],
        11 if digits.starts_with('0') => &digits[1..],
        _ => digits.as_str(),
    };
    phone_pattern()
        .is_match(local)
        .then(|| local.to_string())
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[6-9][0-9]{9}$").expect("phone pattern compiles"))
}

fn registration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9/_-]{2,19}$").expect("registration pattern compiles")
    })
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sheet(csv: &str) -> Sheet {
        Sheet::from_csv(Cursor::new(csv.to_string())).expect("csv parses")
    }

    #[test]
    fn accepts_alternate_headers_and_date_spellings() {
        let batch = parse_admissions(&sheet(
            "registration_number,Name,Grade,Branch,DOB,Mobile\n\
             2024001,Asha Rao,XI,North,14-08-2008,+91 98765 43210\n\
             2024002,Vikram Shah,XII,South,08/14/2007,09876501234\n",
        ))
        .expect("sheet validates");

        assert!(batch.is_clean());
        assert_eq!(batch.students.len(), 2);
        let asha = &batch.students[0];
        assert_eq!(asha.reg_number, "2024001");
        assert_eq!(asha.class_name, "XI");
        assert_eq!(asha.campus.as_deref(), Some("North"));
        assert_eq!(asha.date_of_birth, NaiveDate::from_ymd_opt(2008, 8, 14));
        assert_eq!(asha.phone.as_deref(), Some("9876543210"));
        assert_eq!(batch.students[1].date_of_birth, NaiveDate::from_ymd_opt(2007, 8, 14));
        assert_eq!(batch.students[1].phone.as_deref(), Some("9876501234"));
    }

    #[test]
    fn rejects_rows_with_every_problem_listed() {
        let batch = parse_admissions(&sheet(
            "regNumber,studentName,className,phone,dob\n\
             ??,,X,12345,someday\n\
             2024003,Meera,X,,\n",
        ))
        .expect("sheet validates");

        assert_eq!(batch.students.len(), 1);
        let fields: Vec<&str> = batch.rejected.iter().map(|issue| issue.field).collect();
        assert_eq!(fields, vec!["regNumber", "studentName", "phone", "dateOfBirth"]);
        assert!(batch.rejected.iter().all(|issue| issue.line == 2));
    }

    #[test]
    fn duplicate_registration_numbers_are_rejected_after_the_first() {
        let batch = parse_admissions(&sheet(
            "reg_number,student_name,class\nA1001,Asha,X\na1001,Asha Again,X\n",
        ))
        .expect("sheet validates");

        assert_eq!(batch.students.len(), 1);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].line, 3);
    }

    #[test]
    fn missing_required_columns_fail_the_sheet() {
        let error = parse_admissions(&sheet("name,phone\nAsha,9876543210\n"))
            .expect_err("missing columns");
        assert!(matches!(error, IngestError::MissingColumns(_)));
    }

    #[test]
    fn phone_normalization_handles_prefixes() {
        assert_eq!(normalize_phone("98765-43210").as_deref(), Some("9876543210"));
        assert_eq!(normalize_phone("919876543210").as_deref(), Some("9876543210"));
        assert_eq!(normalize_phone("5876543210"), None);
        assert_eq!(normalize_phone("98765"), None);
    }
}

use chrono::NaiveDate;
use school_desk::ingest::{import_admissions, parse_admissions, IngestError, Sheet, SheetFormat};
use std::path::PathBuf;

fn csv(text: &str) -> Sheet {
    Sheet::from_bytes(text.as_bytes().to_vec(), SheetFormat::Csv).expect("csv parses")
}

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("school-desk-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).expect("write scratch file");
    path
}

#[test]
fn aliased_headers_and_mixed_date_formats_are_accepted() {
    let sheet = csv("\
\u{feff}Registration No,Student Name,Class,Mobile,E-mail,DOB,Campus
2024001,Asha Rao,XI,+91 98765 43210,asha@example.com,2008-03-14,North
2024002,Vikram Das,XII,09876543210,,14-03-2007,
");
    let batch = parse_admissions(&sheet).expect("sheet validates");
    assert!(batch.is_clean(), "unexpected issues: {:?}", batch.rejected);
    assert_eq!(batch.students.len(), 2);

    let asha = &batch.students[0];
    assert_eq!(asha.phone.as_deref(), Some("9876543210"));
    assert_eq!(asha.campus.as_deref(), Some("North"));
    assert_eq!(asha.date_of_birth, NaiveDate::from_ymd_opt(2008, 3, 14));

    let vikram = &batch.students[1];
    assert_eq!(vikram.phone.as_deref(), Some("9876543210"));
    assert_eq!(vikram.email, None);
    assert_eq!(vikram.date_of_birth, NaiveDate::from_ymd_opt(2007, 3, 14));
}

#[test]
fn bad_rows_are_reported_without_failing_the_batch() {
    let sheet = csv("\
Reg No,Name,Class,Phone,Email
2024001,Asha Rao,XI,9876543210,asha@example.com
2024001,Asha Again,XI,,
2024003,,XI,12345,not-an-email
2024004,Meera Iyer,XI,,
");
    let batch = parse_admissions(&sheet).expect("sheet validates");
    assert!(!batch.is_clean());
    assert_eq!(
        batch
            .students
            .iter()
            .map(|student| student.reg_number.as_str())
            .collect::<Vec<_>>(),
        vec!["2024001", "2024004"]
    );

    let lines: Vec<(usize, &str)> = batch
        .rejected
        .iter()
        .map(|issue| (issue.line, issue.field))
        .collect();
    assert!(lines.contains(&(3, "regNumber")), "duplicate flagged: {lines:?}");
    assert!(lines.contains(&(4, "studentName")));
    assert!(lines.contains(&(4, "phone")));
    assert!(lines.contains(&(4, "email")));
}

#[test]
fn missing_required_columns_fail_the_sheet() {
    let sheet = csv("Reg No,Phone\n2024001,9876543210\n");
    match parse_admissions(&sheet) {
        Err(IngestError::MissingColumns(columns)) => {
            assert_eq!(columns, vec!["studentName", "className"])
        }
        other => panic!("expected missing columns, got {other:?}"),
    }
}

#[test]
fn import_checks_extension_and_size_before_parsing() {
    let text = scratch_file("notes.txt", "Reg No,Name,Class\n2024001,Asha,XI\n");
    assert!(matches!(
        import_admissions(&text, 1024),
        Err(IngestError::UnsupportedFormat(_))
    ));

    let sheet = scratch_file("admissions.csv", "Reg No,Name,Class\n2024001,Asha,XI\n");
    assert!(matches!(
        import_admissions(&sheet, 8),
        Err(IngestError::TooLarge { limit: 8, .. })
    ));

    let batch = import_admissions(&sheet, 1024).expect("small csv imports");
    assert_eq!(batch.students.len(), 1);

    std::fs::remove_file(text).ok();
    std::fs::remove_file(sheet).ok();
}

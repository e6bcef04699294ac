use super::normalizer::normalize_header;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Logical columns recognized in uploaded sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    RegNumber,
    StudentName,
    FatherName,
    MotherName,
    DateOfBirth,
    AdmissionDate,
    Gender,
    ClassName,
    Section,
    Campus,
    Phone,
    Email,
    Address,
    TestName,
    TestDate,
    MarksType,
    QuestionNumber,
    CorrectOptions,
    IsGrace,
    Subject,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::RegNumber => "regNumber",
            Field::StudentName => "studentName",
            Field::FatherName => "fatherName",
            Field::MotherName => "motherName",
            Field::DateOfBirth => "dateOfBirth",
            Field::AdmissionDate => "admissionDate",
            Field::Gender => "gender",
            Field::ClassName => "className",
            Field::Section => "section",
            Field::Campus => "campus",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Address => "address",
            Field::TestName => "testName",
            Field::TestDate => "date",
            Field::MarksType => "marksType",
            Field::QuestionNumber => "questionNumber",
            Field::CorrectOptions => "correctOptions",
            Field::IsGrace => "isGrace",
            Field::Subject => "subject",
        }
    }
}

static ALIAS_MAP: OnceLock<HashMap<String, Field>> = OnceLock::new();

pub(crate) fn field_for_header(header: &str) -> Option<Field> {
    alias_map().get(&normalize_header(header)).copied()
}

fn alias_map() -> &'static HashMap<String, Field> {
    ALIAS_MAP.get_or_init(|| {
        const ALIASES: &[(Field, &[&str])] = &[
            (
                Field::RegNumber,
                &[
                    "regNumber",
                    "reg_number",
                    "registration_number",
                    "registration no",
                    "reg no",
                    "application number",
                    "application_no",
                    "roll number",
                ],
            ),
            (
                Field::StudentName,
                &["studentName", "student_name", "name", "full_name", "student"],
            ),
            (
                Field::FatherName,
                &["fatherName", "father_name", "father", "guardian name", "parent name"],
            ),
            (Field::MotherName, &["motherName", "mother_name", "mother"]),
            (
                Field::DateOfBirth,
                &["dateOfBirth", "date_of_birth", "dob", "birth date", "birthdate"],
            ),
            (
                Field::AdmissionDate,
                &["admissionDate", "admission_date", "date of admission", "joining date"],
            ),
            (Field::Gender, &["gender", "sex"]),
            (
                Field::ClassName,
                &["className", "class", "class_name", "grade", "standard", "course"],
            ),
            (Field::Section, &["section", "batch"]),
            (
                Field::Campus,
                &["campus", "campusName", "campus_name", "branch", "school"],
            ),
            (
                Field::Phone,
                &[
                    "phone",
                    "phoneNumber",
                    "phone_number",
                    "mobile",
                    "mobile number",
                    "contact",
                    "contact number",
                    "parent phone",
                    "parent_mobile",
                ],
            ),
            (Field::Email, &["email", "email address", "e-mail", "mail"]),
            (Field::Address, &["address", "residential address"]),
            (
                Field::TestName,
                &["testName", "test_name", "test", "exam", "exam name"],
            ),
            (
                Field::TestDate,
                &["date", "testDate", "test_date", "exam date", "exam_date"],
            ),
            (
                Field::MarksType,
                &["marksType", "marks_type", "marking scheme", "markingScheme", "scheme"],
            ),
            (
                Field::QuestionNumber,
                &["questionNumber", "question_number", "question no", "qno", "q no", "question"],
            ),
            (
                Field::CorrectOptions,
                &[
                    "correctOptions",
                    "correct_options",
                    "correctOption",
                    "correct option",
                    "correct answer",
                    "answer",
                    "key",
                ],
            ),
            (Field::IsGrace, &["isGrace", "is_grace", "grace", "bonus"]),
            (Field::Subject, &["subject", "subject name", "subjectName"]),
        ];

        let mut map = HashMap::new();
        for (field, aliases) in ALIASES {
            for alias in *aliases {
                map.insert(normalize_header(alias), *field);
            }
        }
        map
    })
}

/// Question column headers: `Q12`, `Question 12`, `Q.12`, or a bare `12`.
pub(crate) fn question_for_header(header: &str) -> Option<u32> {
    let normalized = normalize_header(header);
    let digits = normalized
        .strip_prefix("question")
        .or_else(|| normalized.strip_prefix('q'))
        .unwrap_or(&normalized);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|number| *number > 0)
}

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use super::mapping::{field_for_header, question_for_header, Field};
use super::normalizer::normalize_cell;
use super::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Workbook,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "ods" => Ok(Self::Workbook),
            _ => Err(IngestError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// One data row. `line` is the 1-based spreadsheet row, counting the header as row 1.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub line: usize,
    values: Vec<String>,
}

impl SheetRow {
    fn value(&self, index: usize) -> Option<&str> {
        self.values
            .get(index)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    fn is_blank(&self) -> bool {
        self.values.iter().all(|value| value.is_empty())
    }
}

/// Header-indexed table read from a CSV file or the first worksheet of a workbook.
#[derive(Debug, Clone)]
pub struct Sheet {
    headers: Vec<String>,
    fields: HashMap<Field, usize>,
    questions: Vec<(u32, usize)>,
    rows: Vec<SheetRow>,
}

impl Sheet {
    pub fn from_path<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let format = SheetFormat::from_path(path)?;
        let size = std::fs::metadata(path)?.len();
        if size > max_bytes {
            return Err(IngestError::TooLarge {
                size,
                limit: max_bytes,
            });
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes, format)
    }

    pub fn from_bytes(bytes: Vec<u8>, format: SheetFormat) -> Result<Self, IngestError> {
        match format {
            SheetFormat::Csv => Self::from_csv(Cursor::new(bytes)),
            SheetFormat::Workbook => Self::from_workbook(bytes),
        }
    }

    pub fn from_csv<R: Read>(reader: R) -> Result<Self, IngestError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(normalize_cell)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            rows.push(SheetRow {
                line: index + 2,
                values: record.iter().map(normalize_cell).collect(),
            });
        }

        Ok(Self::assemble(headers, rows))
    }

    fn from_workbook(bytes: Vec<u8>) -> Result<Self, IngestError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(IngestError::EmptyWorkbook)??;

        let mut raw_rows = range.rows();
        let headers = raw_rows
            .next()
            .ok_or(IngestError::EmptyWorkbook)?
            .iter()
            .map(cell_text)
            .collect::<Vec<_>>();

        let rows = raw_rows
            .enumerate()
            .map(|(index, cells)| SheetRow {
                line: index + 2,
                values: cells.iter().map(cell_text).collect(),
            })
            .collect();

        Ok(Self::assemble(headers, rows))
    }

    fn assemble(headers: Vec<String>, rows: Vec<SheetRow>) -> Self {
        let mut fields = HashMap::new();
        let mut questions = Vec::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(field) = field_for_header(header) {
                fields.entry(field).or_insert(index);
            } else if let Some(question) = question_for_header(header) {
                questions.push((question, index));
            }
        }
        questions.sort_unstable();
        questions.dedup_by_key(|(question, _)| *question);

        let rows = rows.into_iter().filter(|row| !row.is_blank()).collect();

        Self {
            headers,
            fields,
            questions,
            rows,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    pub fn has(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// Fails with every absent column named at once.
    pub fn require(&self, required: &[Field]) -> Result<(), IngestError> {
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|field| !self.has(**field))
            .map(Field::label)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(IngestError::MissingColumns(missing))
        }
    }

    pub fn get<'a>(&self, row: &'a SheetRow, field: Field) -> Option<&'a str> {
        self.fields.get(&field).and_then(|index| row.value(*index))
    }

    /// Question number and cell value for each question column, blanks included as `None`.
    pub fn answers<'a>(&'a self, row: &'a SheetRow) -> impl Iterator<Item = (u32, Option<&'a str>)> + 'a {
        self.questions
            .iter()
            .map(move |(question, index)| (*question, row.value(*index)))
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
            normalize_cell(value)
        }
        Data::Int(value) => value.to_string(),
        Data::Float(value) => float_text(*value),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => float_text(value.as_f64()),
    }
}

fn float_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_are_indexed_by_alias() {
        let sheet = Sheet::from_csv(Cursor::new(
            "Reg Number,Student Name,Q1,Q2\nREG001, Asha  Rao ,A,\n,,,\nREG002,Vikram,B,C\n",
        ))
        .expect("csv parses");

        assert_eq!(sheet.rows().len(), 2);
        assert_eq!(sheet.question_count(), 2);
        let first = &sheet.rows()[0];
        assert_eq!(first.line, 2);
        assert_eq!(sheet.get(first, Field::RegNumber), Some("REG001"));
        assert_eq!(sheet.get(first, Field::StudentName), Some("Asha Rao"));
        let answers: Vec<_> = sheet.answers(first).collect();
        assert_eq!(answers, vec![(1, Some("A")), (2, None)]);
        assert_eq!(sheet.rows()[1].line, 4);
    }

    #[test]
    fn require_names_every_missing_column() {
        let sheet = Sheet::from_csv(Cursor::new("name\nAsha\n")).expect("csv parses");
        match sheet.require(&[Field::RegNumber, Field::StudentName, Field::ClassName]) {
            Err(IngestError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["regNumber", "className"]);
            }
            other => panic!("expected missing columns, got {other:?}"),
        }
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            SheetFormat::from_path(Path::new("students.CSV")).expect("csv"),
            SheetFormat::Csv
        );
        assert_eq!(
            SheetFormat::from_path(Path::new("students.xlsx")).expect("xlsx"),
            SheetFormat::Workbook
        );
        assert!(matches!(
            SheetFormat::from_path(Path::new("students.pdf")),
            Err(IngestError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn whole_floats_print_without_fraction() {
        assert_eq!(float_text(45360.0), "45360");
        assert_eq!(float_text(9876543210.0), "9876543210");
        assert_eq!(float_text(2.5), "2.5");
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let error = Sheet::from_path("./does-not-exist.csv", 1024).expect_err("io error");
        assert!(matches!(error, IngestError::Io(_)));
    }
}

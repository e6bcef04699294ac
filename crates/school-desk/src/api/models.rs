use serde::{Deserialize, Serialize};

use crate::ingest::StudentRecord;
use crate::scoring::TestResult;
use crate::submission::ResultKey;

/// Standard success envelope: `{ "data": ... }`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) data: T,
}

/// Error payload: `{ "message": "..." }`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default, alias = "error")]
    pub(crate) message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub reg_number: String,
    #[serde(default, alias = "name")]
    pub student_name: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub campus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campus {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "campusName")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "subjectName")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentCredentials {
    pub reg_number: String,
    pub password: String,
}

/// Login endpoints answer with a bare object rather than the data envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub(crate) token: String,
    pub(crate) role: String,
    #[serde(default)]
    pub(crate) reg_number: Option<String>,
    #[serde(default, alias = "student")]
    pub(crate) student_data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckExistingRequest<'a> {
    pub(crate) results: &'a [ResultKey],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExistingCount {
    #[serde(alias = "count")]
    pub(crate) existing_count: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateResultsRequest<'a> {
    pub(crate) results: &'a [TestResult],
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkStudentsRequest<'a> {
    pub(crate) students: &'a [StudentRecord],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCreateReceipt {
    #[serde(default)]
    pub created: usize,
    #[serde(default)]
    pub skipped: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}

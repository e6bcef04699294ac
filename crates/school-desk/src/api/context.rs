use serde::Serialize;
use tracing::info;

use super::client::ApiClient;
use super::error::ApiError;
use super::models::{Campus, Student, Subject};

/// Reference data most dashboard screens need before they can render.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardContext {
    pub campuses: Vec<Campus>,
    pub subjects: Vec<Subject>,
    pub students: Vec<Student>,
}

impl DashboardContext {
    /// Fetch campuses, subjects and students concurrently. Any failure fails the whole load.
    pub async fn load(client: &ApiClient) -> Result<Self, ApiError> {
        let (campuses, subjects, students) =
            tokio::try_join!(client.campuses(), client.subjects(), client.students())?;

        info!(
            campuses = campuses.len(),
            subjects = subjects.len(),
            students = students.len(),
            "dashboard context loaded"
        );

        Ok(Self {
            campuses,
            subjects,
            students,
        })
    }

    pub fn students_on_campus<'a>(&'a self, campus: &'a str) -> impl Iterator<Item = &'a Student> {
        self.students.iter().filter(move |student| {
            student
                .campus
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(campus))
        })
    }
}

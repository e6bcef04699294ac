use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Dashboard role returned by the login endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Staff,
    Parent,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "super_admin" | "superadmin" => Some(Self::SuperAdmin),
            "admin" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            "parent" => Some(Self::Parent),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Parent => "parent",
        }
    }

    /// Menu and route gating. Not a security boundary; the API enforces access.
    pub fn allows(&self, section: Section) -> bool {
        use Section::*;
        match self {
            Role::SuperAdmin => true,
            Role::Admin => !matches!(section, StaffProfiles | StudentProfile),
            Role::Staff => matches!(
                section,
                Attendance | TestReports | GatePasses | Feedback | Noticeboard
            ),
            Role::Parent => matches!(
                section,
                TestReports | Feedback | Noticeboard | StudentProfile
            ),
        }
    }

    pub fn sections(&self) -> Vec<Section> {
        Section::ALL
            .iter()
            .copied()
            .filter(|section| self.allows(*section))
            .collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dashboard areas a role may open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Admissions,
    Attendance,
    TestReports,
    ResultSubmission,
    GatePasses,
    Feedback,
    Noticeboard,
    StaffProfiles,
    StudentProfile,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::Admissions,
        Section::Attendance,
        Section::TestReports,
        Section::ResultSubmission,
        Section::GatePasses,
        Section::Feedback,
        Section::Noticeboard,
        Section::StaffProfiles,
        Section::StudentProfile,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Section::Admissions => "Admissions",
            Section::Attendance => "Attendance",
            Section::TestReports => "Test reports",
            Section::ResultSubmission => "Result submission",
            Section::GatePasses => "Gate passes",
            Section::Feedback => "Feedback",
            Section::Noticeboard => "Noticeboard",
            Section::StaffProfiles => "Staff profiles",
            Section::StudentProfile => "Student profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginType {
    User,
    Parent,
}

/// Authenticated session threaded through every API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    #[serde(rename = "userRole")]
    pub role: Role,
    pub login_type: LoginType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_data: Option<serde_json::Value>,
}

impl Session {
    pub fn authorize(&self, section: Section) -> Result<(), SessionError> {
        if self.role.allows(section) {
            Ok(())
        } else {
            Err(SessionError::Forbidden {
                role: self.role,
                section,
            })
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("not signed in")]
    Missing,
    #[error("role {role} may not open {}", .section.label())]
    Forbidden { role: Role, section: Section },
    #[error("session storage failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistence for the current session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionError>;
    fn save(&self, session: &Session) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;

    fn require(&self) -> Result<Session, SessionError> {
        self.load()?.ok_or(SessionError::Missing)
    }
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        debug!(path = %self.path.display(), role = %session.role, "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process store for tests and the local service.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.session.lock().expect("session mutex poisoned").clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.session.lock().expect("session mutex poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.session.lock().expect("session mutex poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            token: "token-123".to_string(),
            role,
            login_type: LoginType::User,
            reg_number: None,
            student_data: None,
        }
    }

    #[test]
    fn roles_parse_from_api_strings() {
        assert_eq!(Role::parse("super_admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse(" Parent "), Some(Role::Parent));
        assert_eq!(Role::parse("janitor"), None);
    }

    #[test]
    fn gating_follows_role() {
        assert!(Role::SuperAdmin.allows(Section::StaffProfiles));
        assert!(Role::Admin.allows(Section::ResultSubmission));
        assert!(!Role::Admin.allows(Section::StaffProfiles));
        assert!(Role::Staff.allows(Section::Attendance));
        assert!(!Role::Staff.allows(Section::Admissions));
        assert!(Role::Parent.allows(Section::StudentProfile));
        assert!(!Role::Parent.allows(Section::ResultSubmission));
        assert_eq!(Role::SuperAdmin.sections().len(), Section::ALL.len());
    }

    #[test]
    fn authorize_reports_forbidden_sections() {
        let error = session(Role::Staff)
            .authorize(Section::Admissions)
            .expect_err("staff cannot import admissions");
        assert_eq!(error.to_string(), "role staff may not open Admissions");
    }

    #[test]
    fn session_serializes_with_storage_key_names() {
        let value = serde_json::to_value(session(Role::Admin)).expect("serializes");
        assert_eq!(value["userRole"], "admin");
        assert_eq!(value["loginType"], "user");
        assert!(value.get("regNumber").is_none());
    }

    #[test]
    fn memory_store_round_trips_and_clears() {
        let store = MemorySessionStore::default();
        assert!(matches!(store.require(), Err(SessionError::Missing)));
        store.save(&session(Role::Parent)).expect("save");
        assert_eq!(store.require().expect("load").role, Role::Parent);
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn file_store_persists_between_instances() {
        let path = std::env::temp_dir().join(format!(
            "school-desk-session-{}.json",
            std::process::id()
        ));
        let store = FileSessionStore::new(&path);
        store.clear().expect("clear missing file");
        store.save(&session(Role::Admin)).expect("save");

        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.require().expect("load").token, "token-123");
        reopened.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
    }
}

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use school_desk::api::ApiClient;
use school_desk::config::AppConfig;
use school_desk::error::AppError;
use school_desk::ingest::dates::parse_flexible_date;
use school_desk::scoring::SchemePolicy;
use school_desk::session::{FileSessionStore, Section, Session, SessionStore};
use school_desk::submission::OverwritePrompt;
use std::io::{BufRead, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) marking_policy: SchemePolicy,
    pub(crate) max_upload_bytes: u64,
}

/// API client backed by the on-disk session file.
pub(crate) fn connect(config: &AppConfig) -> Result<ApiClient, AppError> {
    let sessions = Arc::new(FileSessionStore::new(&config.api.session_path));
    Ok(ApiClient::new(&config.api, sessions)?)
}

/// The stored session, provided its role may open `section`.
pub(crate) fn signed_in(client: &ApiClient, section: Section) -> Result<Session, AppError> {
    let session = client.sessions().require()?;
    session.authorize(section)?;
    Ok(session)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_flexible_date(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as a date (try YYYY-MM-DD)"))
}

/// Asks on stdin before results already in the store are replaced.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StdinPrompt {
    pub(crate) assume_yes: bool,
}

impl OverwritePrompt for StdinPrompt {
    fn confirm_overwrite(&self, existing: usize, total: usize) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{existing} of {total} results already exist. Overwrite them? [y/N] ");
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_dashboard_spellings() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 14);
        assert_eq!(parse_date("2025-07-14").ok(), expected);
        assert_eq!(parse_date("14-07-2025").ok(), expected);
        assert!(parse_date("next tuesday")
            .expect_err("rejected")
            .contains("next tuesday"));
    }

    #[test]
    fn assume_yes_skips_the_question() {
        assert!(StdinPrompt { assume_yes: true }.confirm_overwrite(3, 10));
    }
}

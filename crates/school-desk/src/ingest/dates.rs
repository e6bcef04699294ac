use chrono::{DateTime, Duration, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Canonical output form for every date the dashboard handles.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

// Largest serial Excel accepts (9999-12-31).
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// Parse the date spellings found in uploaded sheets and API payloads.
///
/// Accepts `YYYY-MM-DD`, `DD-MM-YYYY`, `MM/DD/YYYY`, RFC 3339 timestamps, and Excel serial
/// day numbers (1900 date system). Slashes always mean month-first.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d-%m-%Y") {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%m/%d/%Y") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    if let Some((date_part, _)) = trimmed.split_once(['T', ' ']) {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Some(date);
        }
    }

    trimmed.parse::<f64>().ok().and_then(excel_serial_to_date)
}

/// Excel serial day number to a calendar date. Day 60 is Excel's phantom 1900-02-29.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > EXCEL_MAX_SERIAL {
        return None;
    }

    let days = serial.floor() as i64;
    let epoch = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_signed(Duration::days(days))
}

pub fn canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

pub fn deserialize_flexible_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized date '{raw}'")))
}

// ── Date formatting ──
//
// Fixed Russian-style presentations for ISO-8601 timestamps coming from
// the API. Offset-bearing values are shown in the local timezone; values
// without an offset are already local wall-clock time.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::CoreError;

const DATE: &str = "%d.%m.%Y";
const DATE_TIME: &str = "%d.%m.%Y %H:%M";
const TIME: &str = "%H:%M";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// `dd.MM.yyyy`
pub fn format_date(iso: &str) -> Result<String, CoreError> {
    Ok(parse_iso(iso)?.format(DATE).to_string())
}

/// `dd.MM.yyyy HH:mm`
pub fn format_date_time(iso: &str) -> Result<String, CoreError> {
    Ok(parse_iso(iso)?.format(DATE_TIME).to_string())
}

/// `HH:mm`
pub fn format_time(iso: &str) -> Result<String, CoreError> {
    Ok(parse_iso(iso)?.format(TIME).to_string())
}

/// Parse an ISO-8601 timestamp into local wall-clock time.
///
/// Accepts RFC 3339 with an offset, naive date-times (`T` or space
/// separated, optional seconds and fraction), and bare dates (midnight).
pub fn parse_iso(input: &str) -> Result<NaiveDateTime, CoreError> {
    let input = input.trim();

    let rfc3339 = match DateTime::parse_from_rfc3339(input) {
        Ok(dt) => return Ok(dt.with_timezone(&Local).naive_local()),
        Err(e) => e,
    };

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(CoreError::InvalidDate {
        input: input.to_owned(),
        reason: rfc3339.to_string(),
    })
}

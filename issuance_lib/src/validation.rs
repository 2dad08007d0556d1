use chrono::NaiveDate;
use issuance_api::DateRange;
use regex::Regex;

use crate::error::IssuanceError;

pub const MAX_REPORT_ID_LENGTH: usize = 64;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, IssuanceError> {
    if input.len() > max_len {
        return Err(IssuanceError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(IssuanceError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate a report id: enforce length, strip control chars, lowercase.
pub fn validate_report_id(input: &str) -> Result<String, IssuanceError> {
    Ok(sanitize_text(input, MAX_REPORT_ID_LENGTH)?.to_lowercase())
}

/// Parse a `YYYY-MM-DD` date.
pub fn validate_date(input: &str) -> Result<NaiveDate, IssuanceError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        IssuanceError::InvalidInput(format!(
            "invalid date '{}'. Use YYYY-MM-DD (e.g. 2024-03-01)",
            trimmed
        ))
    })
}

/// Validate an inclusive date range; `from` must not be after `to`.
pub fn validate_date_range(from: &str, to: &str) -> Result<DateRange, IssuanceError> {
    let from = validate_date(from)?;
    let to = validate_date(to)?;
    if from > to {
        return Err(IssuanceError::InvalidInput(format!(
            "start date {} is after end date {}",
            from, to
        )));
    }
    Ok(DateRange::new(from, to))
}

/// Reduce arbitrary text to `[A-Za-z0-9_-]` so it is safe inside a file name.
pub fn file_name_component(input: &str) -> String {
    let re = Regex::new(r"[^A-Za-z0-9_-]+").expect("static pattern");
    let cleaned = re.replace_all(input.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "report".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Export file name: `<reportId>_<from>_<to>.<extension>`.
pub fn export_file_name(report_id: &str, range: &DateRange, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        file_name_component(report_id),
        range.from.format("%Y-%m-%d"),
        range.to.format("%Y-%m-%d"),
        extension
    )
}

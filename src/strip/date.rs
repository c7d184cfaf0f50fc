//! Target date resolution

use crate::{DilbertError, Result};
use chrono::{NaiveDate, Utc};

/// Resolves the optional input date against `today`
///
/// An absent or blank input yields `today` as `YYYY-MM-DD`. Anything else is
/// trimmed and must be 10 characters with exactly three `-`-separated segments.
/// Month and day ranges are not checked.
pub fn resolve_date_on(input: Option<&str>, today: NaiveDate) -> Result<String> {
    match input.map(str::trim) {
        None | Some("") => Ok(format_date(today)),
        Some(date) => check_shape(date).map(|_| date.to_string()),
    }
}

fn check_shape(date: &str) -> Result<()> {
    if date.chars().count() != 10 || date.split('-').count() != 3 {
        return Err(DilbertError::InvalidDateFormat {
            input: date.to_string(),
        });
    }
    Ok(())
}

/// Renders a date the way strip keys and feed items expect it
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a resolved date for calendar arithmetic
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let date = input.trim();
    check_shape(date)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| DilbertError::InvalidDateFormat {
        input: date.to_string(),
    })
}

/// Resolves the optional input date, defaulting to the current UTC date
pub fn resolve_date(input: Option<&str>) -> Result<String> {
    resolve_date_on(input, Utc::now().date_naive())
}

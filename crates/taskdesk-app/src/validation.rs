// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;
use time::Date;
use time::macros::format_description;

pub const DATE_LAYOUT: &str = "YYYY-MM-DD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid date value; expected {DATE_LAYOUT}")]
    InvalidDate,
    #[error("invalid email address")]
    InvalidEmail,
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// The calendar part of a date or date-time string (`2026-03-01T00:00:00Z`
/// becomes `2026-03-01`).
pub fn date_part(value: &str) -> &str {
    let trimmed = value.trim();
    match trimmed.split_once('T') {
        Some((date, _)) => date,
        None => trimmed,
    }
}

pub fn parse_date(input: &str) -> ValidationResult<Date> {
    let candidate = date_part(input);
    Date::parse(candidate, &format_description!("[year]-[month]-[day]"))
        .map_err(|_| ValidationError::InvalidDate)
}

pub fn format_date(value: Date) -> String {
    value
        .format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| value.to_string())
}

/// Display form for a stored due date: the parsed calendar date when it
/// parses, else the raw value untouched.
pub fn display_date(value: &str) -> String {
    match parse_date(value) {
        Ok(date) => format_date(date),
        Err(_) => value.to_owned(),
    }
}

pub fn check_email(input: &str) -> ValidationResult<()> {
    let value = input.trim();
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    let Some((local, domain)) = value.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ValidationError, check_email, date_part, display_date, parse_date};
    use time::{Date, Month};

    #[test]
    fn parse_date_accepts_plain_and_timestamped_values() {
        let expected = Date::from_calendar_date(2026, Month::March, 1).expect("valid date");
        assert_eq!(parse_date("2026-03-01"), Ok(expected));
        assert_eq!(parse_date("2026-03-01T00:00:00.000Z"), Ok(expected));
        assert_eq!(parse_date(" 2026-03-01 "), Ok(expected));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        for input in ["", "03/01/2026", "2026-13-01", "2026-02-30", "tomorrow"] {
            assert_eq!(
                parse_date(input),
                Err(ValidationError::InvalidDate),
                "input {input}"
            );
        }
    }

    #[test]
    fn date_part_and_display() {
        assert_eq!(date_part("2026-01-02T10:00:00Z"), "2026-01-02");
        assert_eq!(date_part("2026-01-02"), "2026-01-02");
        assert_eq!(display_date("2026-01-02T10:00:00Z"), "2026-01-02");
        assert_eq!(display_date("someday"), "someday");
    }

    #[test]
    fn email_shape() {
        for ok in ["a@b.com", "first.last@example.co.uk", "x+tag@sub.domain.io"] {
            assert!(check_email(ok).is_ok(), "{ok}");
        }
        for bad in ["", "plain", "@b.com", "a@", "a@b", "a@b..com", "a b@c.com", "a@b@c.com"] {
            assert_eq!(check_email(bad), Err(ValidationError::InvalidEmail), "{bad}");
        }
    }
}

//! Field validators for the reservation dialogue.
//!
//! Every function here is total: bad input comes back as an `Err` carrying
//! the reason, never as a panic.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::num::IntErrorKind;
use thiserror::Error;

use crate::session::PartySize;

#[expect(clippy::expect_used, reason = "Pattern is a compile-time constant")]
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("valid date pattern"));

#[expect(clippy::expect_used, reason = "Pattern is a compile-time constant")]
static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid time pattern"));

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PartySizeError {
    #[error("not an integer")]
    NotANumber,

    #[error("{0} is outside {min}..={max}", min = PartySize::MIN, max = PartySize::MAX)]
    OutOfRange(i64),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DateError {
    #[error("expected a DD/MM/YYYY date")]
    Format,

    #[error("date is in the past")]
    InPast,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimeError {
    #[error("expected a 24h HH:MM time")]
    Format,

    #[error("time is outside business hours")]
    OutsideHours,
}

/// Parse a number of diners.
pub fn parse_party_size(text: &str) -> Result<PartySize, PartySizeError> {
    let n = match text.trim().parse::<i64>() {
        Ok(n) => n,
        Err(e) => {
            return match e.kind() {
                IntErrorKind::PosOverflow => Err(PartySizeError::OutOfRange(i64::MAX)),
                IntErrorKind::NegOverflow => Err(PartySizeError::OutOfRange(i64::MIN)),
                _ => Err(PartySizeError::NotANumber),
            };
        }
    };

    u8::try_from(n)
        .ok()
        .and_then(PartySize::new)
        .ok_or(PartySizeError::OutOfRange(n))
}

/// Parse a `DD/MM/YYYY` date no earlier than `today`.
///
/// Only the calendar date is compared, so same-day bookings are accepted at
/// any hour.
pub fn parse_date(text: &str, today: NaiveDate) -> Result<NaiveDate, DateError> {
    let text = text.trim();
    if !DATE_PATTERN.is_match(text) {
        return Err(DateError::Format);
    }

    let date = NaiveDate::parse_from_str(text, "%d/%m/%Y").map_err(|_| DateError::Format)?;
    if date < today {
        return Err(DateError::InPast);
    }
    Ok(date)
}

/// Parse a 24h `HH:MM` time within `[opens, closes]`.
pub fn parse_time(text: &str, opens: NaiveTime, closes: NaiveTime) -> Result<NaiveTime, TimeError> {
    let text = text.trim();
    if !TIME_PATTERN.is_match(text) {
        return Err(TimeError::Format);
    }

    let time = NaiveTime::parse_from_str(text, "%H:%M").map_err(|_| TimeError::Format)?;
    if time < opens || time > closes {
        return Err(TimeError::OutsideHours);
    }
    Ok(time)
}

/// Accept any non-blank text as the reservation name.
#[must_use]
pub fn parse_name(text: &str) -> Option<String> {
    let name = text.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

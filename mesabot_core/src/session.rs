//! Per-sender reservation dialogue state.
//!
//! A `Session` exists only while a reservation is being collected. Its
//! fields are filled strictly in stage order; the setters below refuse to
//! run at the wrong stage, so the "stage is the first unset field" rule
//! cannot be broken from outside this module.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::reservation::ReservationRecord;

/// Step of the reservation dialogue a sender is currently in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AwaitingPartySize,
    AwaitingDate,
    AwaitingTime,
    AwaitingName,
    /// All fields set; the session is about to be recorded and deleted.
    Completed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingPartySize => "awaiting_party_size",
            Self::AwaitingDate => "awaiting_date",
            Self::AwaitingTime => "awaiting_time",
            Self::AwaitingName => "awaiting_name",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Number of diners, guaranteed to lie in `MIN..=MAX`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct PartySize(u8);

impl PartySize {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    #[must_use]
    pub const fn new(n: u8) -> Option<Self> {
        if n >= Self::MIN && n <= Self::MAX {
            Some(Self(n))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PartySize {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n).ok_or_else(|| {
            format!(
                "party size {n} outside {}..={}",
                Self::MIN,
                Self::MAX
            )
        })
    }
}

impl From<PartySize> for u8 {
    fn from(size: PartySize) -> Self {
        size.0
    }
}

impl fmt::Display for PartySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot set {field} while session is at stage {actual}")]
    OutOfOrder { field: &'static str, actual: Stage },

    #[error("session is not complete (stage {0})")]
    Incomplete(Stage),
}

/// In-progress reservation dialogue for one sender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    sender_id: String,
    stage: Stage,
    party_size: Option<PartySize>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Start a dialogue at `AwaitingPartySize`.
    #[must_use]
    pub fn new(sender_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            sender_id: sender_id.into(),
            stage: Stage::AwaitingPartySize,
            party_size: None,
            date: None,
            time: None,
            name: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub const fn party_size(&self) -> Option<PartySize> {
        self.party_size
    }

    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    #[must_use]
    pub const fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Refresh the activity timestamp without changing any field.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn expect_stage(&self, stage: Stage, field: &'static str) -> Result<(), SessionError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(SessionError::OutOfOrder {
                field,
                actual: self.stage,
            })
        }
    }

    pub fn set_party_size(&mut self, size: PartySize) -> Result<(), SessionError> {
        self.expect_stage(Stage::AwaitingPartySize, "party_size")?;
        self.party_size = Some(size);
        self.stage = Stage::AwaitingDate;
        self.touch();
        Ok(())
    }

    pub fn set_date(&mut self, date: NaiveDate) -> Result<(), SessionError> {
        self.expect_stage(Stage::AwaitingDate, "date")?;
        self.date = Some(date);
        self.stage = Stage::AwaitingTime;
        self.touch();
        Ok(())
    }

    pub fn set_time(&mut self, time: NaiveTime) -> Result<(), SessionError> {
        self.expect_stage(Stage::AwaitingTime, "time")?;
        self.time = Some(time);
        self.stage = Stage::AwaitingName;
        self.touch();
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        self.expect_stage(Stage::AwaitingName, "name")?;
        self.name = Some(name.into());
        self.stage = Stage::Completed;
        self.touch();
        Ok(())
    }

    /// Snapshot the finished reservation.
    pub fn to_record(&self, recorded_at: NaiveDateTime) -> Result<ReservationRecord, SessionError> {
        match (
            self.stage,
            self.party_size,
            self.date,
            self.time,
            self.name.as_ref(),
        ) {
            (Stage::Completed, Some(party_size), Some(date), Some(time), Some(name)) => {
                Ok(ReservationRecord {
                    name: name.clone(),
                    party_size,
                    date,
                    time,
                    recorded_at,
                })
            }
            (stage, ..) => Err(SessionError::Incomplete(stage)),
        }
    }
}

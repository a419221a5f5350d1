use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::session::PartySize;

/// Immutable snapshot of a completed reservation, handed to the sink once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReservationRecord {
    pub name: String,
    pub party_size: PartySize,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Local wall-clock time at which the dialogue completed.
    pub recorded_at: NaiveDateTime,
}

impl ReservationRecord {
    /// Date as the diner typed it (`DD/MM/YYYY`).
    #[must_use]
    pub fn date_display(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }

    /// Time as the diner typed it (`HH:MM`).
    #[must_use]
    pub fn time_display(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

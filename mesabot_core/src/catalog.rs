//! Static, process-wide restaurant data: opening hours, menu, keywords.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

const TIME_FORMAT: &str = "%H:%M";

const DEFAULT_OPENS: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(t) => t,
    None => panic!("invalid default opening time"),
};

const DEFAULT_CLOSES: NaiveTime = match NaiveTime::from_hms_opt(23, 0, 0) {
    Some(t) => t,
    None => panic!("invalid default closing time"),
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HoursError {
    #[error("invalid time-of-day {0:?}, expected HH:MM")]
    Format(String),

    #[error("opening time {opens} is after closing time {closes}")]
    Inverted { opens: String, closes: String },
}

/// Opening and closing time-of-day, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHours", into = "RawHours")]
pub struct BusinessHours {
    opens: NaiveTime,
    closes: NaiveTime,
}

#[derive(Serialize, Deserialize)]
struct RawHours {
    opens: String,
    closes: String,
}

impl BusinessHours {
    pub fn new(opens: NaiveTime, closes: NaiveTime) -> Result<Self, HoursError> {
        if opens > closes {
            return Err(HoursError::Inverted {
                opens: opens.format(TIME_FORMAT).to_string(),
                closes: closes.format(TIME_FORMAT).to_string(),
            });
        }
        Ok(Self { opens, closes })
    }

    /// Parse a pair of `HH:MM` strings.
    pub fn parse(opens: &str, closes: &str) -> Result<Self, HoursError> {
        let parse = |s: &str| {
            NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
                .map_err(|_| HoursError::Format(s.to_string()))
        };
        Self::new(parse(opens)?, parse(closes)?)
    }

    #[must_use]
    pub const fn opens(&self) -> NaiveTime {
        self.opens
    }

    #[must_use]
    pub const fn closes(&self) -> NaiveTime {
        self.closes
    }

    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.opens <= time && time <= self.closes
    }

    #[must_use]
    pub fn opens_display(&self) -> String {
        self.opens.format(TIME_FORMAT).to_string()
    }

    #[must_use]
    pub fn closes_display(&self) -> String {
        self.closes.format(TIME_FORMAT).to_string()
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            opens: DEFAULT_OPENS,
            closes: DEFAULT_CLOSES,
        }
    }
}

impl TryFrom<RawHours> for BusinessHours {
    type Error = HoursError;

    fn try_from(raw: RawHours) -> Result<Self, Self::Error> {
        Self::parse(&raw.opens, &raw.closes)
    }
}

impl From<BusinessHours> for RawHours {
    fn from(hours: BusinessHours) -> Self {
        Self {
            opens: hours.opens_display(),
            closes: hours.closes_display(),
        }
    }
}

/// One dish on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub price: f64,
}

impl MenuItem {
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Read-only menu shown on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuCatalog {
    pub title: String,
    #[serde(default = "MenuCatalog::default_currency")]
    pub currency: String,
    pub items: Vec<MenuItem>,
}

impl MenuCatalog {
    fn default_currency() -> String {
        "€".to_string()
    }

    /// The exact text sent back for a menu request.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(64 + self.items.len() * 32);
        out.push_str(&self.title);
        out.push('\n');
        for (i, item) in self.items.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} - {}{}",
                i + 1,
                item.name,
                item.price,
                self.currency
            );
        }
        out
    }
}

impl Default for MenuCatalog {
    fn default() -> Self {
        Self {
            title: "🍕🍕 Menú del Restaurante inventado 🍕🍕".to_string(),
            currency: Self::default_currency(),
            items: vec![
                MenuItem::new("Margarita", 8.0),
                MenuItem::new("Pepperoni", 10.0),
                MenuItem::new("Hawaiana", 9.0),
                MenuItem::new("4 Quesos", 11.0),
                MenuItem::new("Ensalada César", 7.0),
            ],
        }
    }
}

/// Substrings that classify a message from a sender with no open session.
///
/// Matching is case-insensitive and substring-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keywords {
    #[serde(default = "Keywords::default_reservation")]
    pub reservation: Vec<String>,
    #[serde(default = "Keywords::default_greeting")]
    pub greeting: Vec<String>,
    #[serde(default = "Keywords::default_menu")]
    pub menu: Vec<String>,
}

impl Keywords {
    fn default_reservation() -> Vec<String> {
        vec!["reservar".to_string(), "mesa".to_string()]
    }

    fn default_greeting() -> Vec<String> {
        vec!["hola".to_string()]
    }

    fn default_menu() -> Vec<String> {
        vec!["menu".to_string(), "menú".to_string()]
    }

    fn any_in(words: &[String], lowered: &str) -> bool {
        words
            .iter()
            .any(|w| !w.is_empty() && lowered.contains(&w.to_lowercase()))
    }

    /// `lowered` must already be lower-cased.
    #[must_use]
    pub fn is_reservation(&self, lowered: &str) -> bool {
        Self::any_in(&self.reservation, lowered)
    }

    #[must_use]
    pub fn is_greeting(&self, lowered: &str) -> bool {
        Self::any_in(&self.greeting, lowered)
    }

    #[must_use]
    pub fn is_menu(&self, lowered: &str) -> bool {
        Self::any_in(&self.menu, lowered)
    }
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            reservation: Self::default_reservation(),
            greeting: Self::default_greeting(),
            menu: Self::default_menu(),
        }
    }
}

#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Durable destinations for confirmed reservations.

mod file_log;
mod retry;
mod retrying;

pub use file_log::{FileReservationLog, format_record};
pub use retry::retry_with_backoff;
pub use retrying::RetryingSink;

#![warn(
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

//! Table-reservation dialogue over a text channel.
//!
//! This crate drives each sender through party size, date, time and name,
//! keeping one session per sender until the reservation is recorded.
//!
//! # Key Features
//! - Explicit stage machine, one independent dialogue per sender
//! - Turns of the same sender are serialized; other senders never wait
//! - Completed reservations are appended to a sink before the session is dropped
//! - Optional eviction of abandoned dialogues

mod engine;
mod locks;
pub mod replies;
mod store;
mod sweeper;

pub use engine::{ConversationConfig, ConversationEngine, ReservationOutcome, TurnResult};
pub use locks::{SenderGuard, SenderLocks};
pub use store::InMemorySessionStore;
pub use sweeper::spawn_idle_sweeper;

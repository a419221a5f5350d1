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

//! Core types for the table-reservation dialogue.
//!
//! Everything here is storage- and transport-agnostic: the session model,
//! the field validators and the traits the conversation engine is wired
//! against.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub mod catalog;
pub mod clock;
pub mod reservation;
pub mod session;
pub mod validator;

pub use catalog::{BusinessHours, HoursError, Keywords, MenuCatalog, MenuItem};
pub use clock::{Clock, FixedClock, SystemClock};
pub use reservation::ReservationRecord;
pub use session::{PartySize, Session, SessionError, Stage};

/// Mapping from sender identity to the in-progress dialogue.
///
/// Implementations only need to make each single call atomic; the engine
/// serializes the read-modify-write of one sender on its own.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, sender_id: &str) -> anyhow::Result<Option<Session>>;
    async fn put(&self, sender_id: &str, session: Session) -> anyhow::Result<()>;
    async fn delete(&self, sender_id: &str) -> anyhow::Result<()>;

    /// Drop every session untouched for at least `idle_for`, returning how
    /// many were removed.
    async fn evict_idle(&self, idle_for: Duration) -> anyhow::Result<usize>;

    async fn count(&self) -> anyhow::Result<usize>;
}

/// Durable destination for completed reservations.
#[async_trait]
pub trait ReservationSink: Send + Sync {
    /// Append one record. Must not return `Ok` before the record is durable.
    async fn append(&self, record: &ReservationRecord) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get(&self, sender_id: &str) -> anyhow::Result<Option<Session>> {
        (**self).get(sender_id).await
    }

    async fn put(&self, sender_id: &str, session: Session) -> anyhow::Result<()> {
        (**self).put(sender_id, session).await
    }

    async fn delete(&self, sender_id: &str) -> anyhow::Result<()> {
        (**self).delete(sender_id).await
    }

    async fn evict_idle(&self, idle_for: Duration) -> anyhow::Result<usize> {
        (**self).evict_idle(idle_for).await
    }

    async fn count(&self) -> anyhow::Result<usize> {
        (**self).count().await
    }
}

#[async_trait]
impl<T: ReservationSink + ?Sized> ReservationSink for Arc<T> {
    async fn append(&self, record: &ReservationRecord) -> anyhow::Result<()> {
        (**self).append(record).await
    }
}

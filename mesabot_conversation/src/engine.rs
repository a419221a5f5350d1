//! Reservation dialogue state machine.
//!
//! `ConversationEngine` is the single entry point for inbound text. Each
//! call reads the sender's session, decides one transition, writes the
//! session back (or deletes it on completion) and returns exactly one
//! reply. Bad input never fails a call; it yields a corrective prompt and
//! leaves the stage where it was.

use mesabot_core::validator::{self, DateError, PartySizeError, TimeError};
use mesabot_core::{
    BusinessHours, Clock, Keywords, MenuCatalog, ReservationSink, Session, SessionError,
    SessionStore, Stage, SystemClock,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::locks::SenderLocks;
use crate::replies;

/// Static data the dialogue is driven by.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Name used in greetings and confirmations
    pub restaurant_name: String,
    /// Accepted reservation window
    pub hours: BusinessHours,
    /// Menu sent on request
    pub menu: MenuCatalog,
    /// Keyword sets recognized from senders with no session
    pub keywords: Keywords,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            restaurant_name: "Restaurante Inventado".to_string(),
            hours: BusinessHours::default(),
            menu: MenuCatalog::default(),
            keywords: Keywords::default(),
        }
    }
}

impl ConversationConfig {
    #[must_use]
    pub fn with_restaurant_name(mut self, name: String) -> Self {
        self.restaurant_name = name;
        self
    }

    #[must_use]
    pub const fn with_hours(mut self, hours: BusinessHours) -> Self {
        self.hours = hours;
        self
    }

    #[must_use]
    pub fn with_menu(mut self, menu: MenuCatalog) -> Self {
        self.menu = menu;
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: Keywords) -> Self {
        self.keywords = keywords;
        self
    }
}

/// What happened to the completed reservation, if the turn completed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    /// The sink accepted the record.
    Recorded,
    /// The sink failed; the diner was still sent the confirmation.
    SinkFailed(String),
}

/// Result of processing one inbound message.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Text to send back to the sender
    pub reply: String,
    /// Stage after the turn; `None` when the sender has no session
    pub stage: Option<Stage>,
    /// Set only on the turn that completes a reservation
    pub reservation: Option<ReservationOutcome>,
}

impl TurnResult {
    fn reply(reply: impl Into<String>, stage: Option<Stage>) -> Self {
        Self {
            reply: reply.into(),
            stage,
            reservation: None,
        }
    }
}

/// Decision taken for a sender that already has a session.
enum Step {
    /// Input accepted; the session moved one stage forward.
    Advance(String),
    /// Input rejected; stage unchanged.
    Stay(String),
    /// Name accepted; the reservation is ready to be recorded.
    Complete,
}

/// Multi-sender reservation dialogue.
pub struct ConversationEngine<S = Arc<dyn SessionStore>, R = Arc<dyn ReservationSink>>
where
    S: Send + Sync,
    R: Send + Sync,
{
    store: S,
    sink: R,
    config: ConversationConfig,
    clock: Arc<dyn Clock>,
    locks: SenderLocks,
    menu_text: String,
}

impl<S, R> ConversationEngine<S, R>
where
    S: SessionStore + Send + Sync,
    R: ReservationSink + Send + Sync,
{
    pub fn new(store: S, sink: R, config: ConversationConfig) -> Self {
        info!(
            "Creating conversation engine for {} (hours {}-{}, {} menu items)",
            config.restaurant_name,
            config.hours.opens_display(),
            config.hours.closes_display(),
            config.menu.items.len()
        );

        let menu_text = config.menu.render();
        Self {
            store,
            sink,
            config,
            clock: Arc::new(SystemClock),
            locks: SenderLocks::new(),
            menu_text,
        }
    }

    /// Replace the clock used for "today" and record timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ConversationConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Process one message and return the reply text.
    pub async fn handle(&self, sender_id: &str, text: &str) -> String {
        self.process_turn(sender_id, text).await.reply
    }

    /// Process one message, serialized against other turns of the same sender.
    pub async fn process_turn(&self, sender_id: &str, text: &str) -> TurnResult {
        let _guard = self.locks.acquire(sender_id).await;
        self.turn(sender_id, text.trim()).await
    }

    async fn turn(&self, sender_id: &str, text: &str) -> TurnResult {
        let session = match self.store.get(sender_id).await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to load session for {sender_id}: {e:#}");
                return TurnResult::reply(replies::INTERNAL_ERROR, None);
            }
        };

        match session {
            None => self.no_session(sender_id, text).await,
            Some(session) => self.in_session(sender_id, session, text).await,
        }
    }

    async fn no_session(&self, sender_id: &str, text: &str) -> TurnResult {
        let lowered = text.to_lowercase();
        let keywords = &self.config.keywords;

        if keywords.is_reservation(&lowered) {
            if let Err(e) = self.store.put(sender_id, Session::new(sender_id)).await {
                error!("Failed to create session for {sender_id}: {e:#}");
                return TurnResult::reply(replies::INTERNAL_ERROR, None);
            }
            info!("Started reservation dialogue for {sender_id}");
            TurnResult::reply(replies::ask_party_size(), Some(Stage::AwaitingPartySize))
        } else if keywords.is_greeting(&lowered) {
            TurnResult::reply(replies::greeting(&self.config.restaurant_name), None)
        } else if keywords.is_menu(&lowered) {
            TurnResult::reply(self.menu_text.clone(), None)
        } else {
            TurnResult::reply(replies::HELP, None)
        }
    }

    async fn in_session(&self, sender_id: &str, mut session: Session, text: &str) -> TurnResult {
        let from = session.stage();

        let step = match self.interpret(&mut session, text) {
            Ok(step) => step,
            Err(e) => {
                error!("Inconsistent session for {sender_id}: {e}");
                return TurnResult::reply(replies::INTERNAL_ERROR, Some(from));
            }
        };

        match step {
            Step::Advance(reply) => {
                if let Err(e) = self.store.put(sender_id, session.clone()).await {
                    error!("Failed to save session for {sender_id}: {e:#}");
                    return TurnResult::reply(replies::INTERNAL_ERROR, Some(from));
                }
                debug!("Session {sender_id}: {from} -> {}", session.stage());
                TurnResult::reply(reply, Some(session.stage()))
            }
            Step::Stay(reply) => {
                session.touch();
                if let Err(e) = self.store.put(sender_id, session).await {
                    warn!("Failed to refresh session for {sender_id}: {e:#}");
                }
                debug!("Session {sender_id}: rejected input at {from}");
                TurnResult::reply(reply, Some(from))
            }
            Step::Complete => self.complete(sender_id, &session).await,
        }
    }

    /// Apply `text` to the current stage. Mutates `session` only on valid input.
    fn interpret(&self, session: &mut Session, text: &str) -> Result<Step, SessionError> {
        let step = match session.stage() {
            Stage::AwaitingPartySize => match validator::parse_party_size(text) {
                Ok(size) => {
                    session.set_party_size(size)?;
                    Step::Advance(replies::ASK_DATE.to_string())
                }
                Err(PartySizeError::NotANumber) => Step::Stay(replies::party_size_invalid()),
                Err(PartySizeError::OutOfRange(_)) => Step::Stay(replies::party_size_too_large()),
            },
            Stage::AwaitingDate => match validator::parse_date(text, self.clock.today()) {
                Ok(date) => {
                    session.set_date(date)?;
                    Step::Advance(replies::ASK_TIME.to_string())
                }
                Err(DateError::Format) => Step::Stay(replies::DATE_FORMAT.to_string()),
                Err(DateError::InPast) => Step::Stay(replies::DATE_IN_PAST.to_string()),
            },
            Stage::AwaitingTime => {
                let hours = &self.config.hours;
                match validator::parse_time(text, hours.opens(), hours.closes()) {
                    Ok(time) => {
                        session.set_time(time)?;
                        Step::Advance(replies::ASK_NAME.to_string())
                    }
                    Err(TimeError::Format) => Step::Stay(replies::TIME_FORMAT.to_string()),
                    Err(TimeError::OutsideHours) => Step::Stay(replies::outside_hours(hours)),
                }
            }
            Stage::AwaitingName => match validator::parse_name(text) {
                Some(name) => {
                    session.set_name(name)?;
                    Step::Complete
                }
                None => Step::Stay(replies::NAME_EMPTY.to_string()),
            },
            Stage::Completed => Step::Complete,
        };
        Ok(step)
    }

    /// Record the reservation, then drop the session.
    ///
    /// The sink is written before the delete so a fault in between leaves
    /// the dialogue retryable instead of losing the reservation.
    async fn complete(&self, sender_id: &str, session: &Session) -> TurnResult {
        let record = match session.to_record(self.clock.now()) {
            Ok(record) => record,
            Err(e) => {
                error!("Cannot complete session for {sender_id}: {e}");
                return TurnResult::reply(replies::INTERNAL_ERROR, Some(session.stage()));
            }
        };

        let outcome = match self.sink.append(&record).await {
            Ok(()) => ReservationOutcome::Recorded,
            Err(e) => {
                error!(
                    target: "mesabot::ops",
                    sender = sender_id,
                    name = %record.name,
                    party_size = record.party_size.get(),
                    date = %record.date_display(),
                    time = %record.time_display(),
                    "Reservation could not be written to the log: {e:#}"
                );
                ReservationOutcome::SinkFailed(format!("{e:#}"))
            }
        };

        if let Err(e) = self.store.delete(sender_id).await {
            error!("Failed to delete completed session for {sender_id}: {e:#}");
        }

        info!(
            "Reservation confirmed for {sender_id}: {} x{} on {} at {}",
            record.name,
            record.party_size,
            record.date_display(),
            record.time_display()
        );

        TurnResult {
            reply: replies::confirmation(&record, &self.config.restaurant_name),
            stage: None,
            reservation: Some(outcome),
        }
    }
}

//! End-to-end dialogue tests.
//!
//! These tests verify that:
//! - Keywords are only honoured for senders with no session
//! - Each stage advances on valid input and stays put on invalid input
//! - A completed reservation is recorded exactly once and the session removed
//! - Sink and store faults never turn into a missing reply
//! - Concurrent senders never see each other's data

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
use mesabot_conversation::{
    ConversationConfig, ConversationEngine, InMemorySessionStore, ReservationOutcome, replies,
};
use mesabot_core::{
    BusinessHours, FixedClock, MenuCatalog, ReservationRecord, ReservationSink, Session,
    SessionStore, Stage,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<ReservationRecord>>,
}

#[async_trait]
impl ReservationSink for RecordingSink {
    async fn append(&self, record: &ReservationRecord) -> anyhow::Result<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}

struct BrokenSink {
    attempts: AtomicUsize,
}

#[async_trait]
impl ReservationSink for BrokenSink {
    async fn append(&self, _record: &ReservationRecord) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("disk full"))
    }
}

struct BrokenStore;

#[async_trait]
impl SessionStore for BrokenStore {
    async fn get(&self, _sender_id: &str) -> anyhow::Result<Option<Session>> {
        Err(anyhow!("store offline"))
    }

    async fn put(&self, _sender_id: &str, _session: Session) -> anyhow::Result<()> {
        Err(anyhow!("store offline"))
    }

    async fn delete(&self, _sender_id: &str) -> anyhow::Result<()> {
        Err(anyhow!("store offline"))
    }

    async fn evict_idle(&self, _idle_for: Duration) -> anyhow::Result<usize> {
        Err(anyhow!("store offline"))
    }

    async fn count(&self) -> anyhow::Result<usize> {
        Err(anyhow!("store offline"))
    }
}

/// Records the sender's stored stage at the moment a record is appended.
struct StageAtAppendSink {
    store: Arc<InMemorySessionStore>,
    sender: &'static str,
    seen: Mutex<Vec<Option<Stage>>>,
}

#[async_trait]
impl ReservationSink for StageAtAppendSink {
    async fn append(&self, _record: &ReservationRecord) -> anyhow::Result<()> {
        let stage = self.store.get(self.sender).await?.map(|s| s.stage());
        self.seen.lock().await.push(stage);
        Ok(())
    }
}

/// In-memory store whose `delete` always fails.
#[derive(Default)]
struct UndeletableStore {
    inner: InMemorySessionStore,
}

#[async_trait]
impl SessionStore for UndeletableStore {
    async fn get(&self, sender_id: &str) -> anyhow::Result<Option<Session>> {
        self.inner.get(sender_id).await
    }

    async fn put(&self, sender_id: &str, session: Session) -> anyhow::Result<()> {
        self.inner.put(sender_id, session).await
    }

    async fn delete(&self, _sender_id: &str) -> anyhow::Result<()> {
        Err(anyhow!("delete rejected"))
    }

    async fn evict_idle(&self, idle_for: Duration) -> anyhow::Result<usize> {
        self.inner.evict_idle(idle_for).await
    }

    async fn count(&self) -> anyhow::Result<usize> {
        self.inner.count().await
    }
}

type TestEngine = ConversationEngine<Arc<InMemorySessionStore>, Arc<RecordingSink>>;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
        .expect("valid date")
        .and_time(NaiveTime::from_hms_opt(21, 45, 0).expect("valid time"))
}

fn tomorrow() -> String {
    (now().date() + ChronoDuration::days(1))
        .format("%d/%m/%Y")
        .to_string()
}

fn setup() -> (TestEngine, Arc<InMemorySessionStore>, Arc<RecordingSink>) {
    let store = Arc::new(InMemorySessionStore::new());
    let sink = Arc::new(RecordingSink::default());
    let engine = ConversationEngine::new(
        Arc::clone(&store),
        Arc::clone(&sink),
        ConversationConfig::default(),
    )
    .with_clock(Arc::new(FixedClock(now())));
    (engine, store, sink)
}

async fn stage_of(store: &InMemorySessionStore, sender: &str) -> Option<Stage> {
    store
        .get(sender)
        .await
        .expect("in-memory store never fails")
        .map(|s| s.stage())
}

#[tokio::test]
async fn test_greeting_creates_no_session() {
    let (engine, store, _) = setup();

    let reply = engine.handle("A", "hola").await;

    assert!(reply.contains("Bienvenido"));
    assert!(reply.contains("Restaurante Inventado"));
    assert_eq!(stage_of(&store, "A").await, None);
}

#[tokio::test]
async fn test_menu_reply_is_configured_text() {
    let (engine, store, _) = setup();

    let reply = engine.handle("A", "menú").await;
    assert_eq!(reply, MenuCatalog::default().render());

    let reply = engine.handle("A", "MENU por favor").await;
    assert_eq!(reply, MenuCatalog::default().render());
    assert_eq!(stage_of(&store, "A").await, None);
}

#[tokio::test]
async fn test_unrecognized_text_gets_help() {
    let (engine, store, _) = setup();

    assert_eq!(engine.handle("A", "gracias").await, replies::HELP);
    assert_eq!(engine.handle("A", "").await, replies::HELP);
    assert_eq!(stage_of(&store, "A").await, None);
}

#[tokio::test]
async fn test_party_size_rejection_then_accept() {
    let (engine, store, _) = setup();

    engine.handle("B", "quiero reservar").await;
    assert_eq!(stage_of(&store, "B").await, Some(Stage::AwaitingPartySize));

    let reply = engine.handle("B", "5").await;
    assert!(reply.contains("Máximo 4"));
    assert_eq!(stage_of(&store, "B").await, Some(Stage::AwaitingPartySize));

    let reply = engine.handle("B", "tres").await;
    assert_eq!(reply, replies::party_size_invalid());
    assert_eq!(stage_of(&store, "B").await, Some(Stage::AwaitingPartySize));

    let reply = engine.handle("B", "3").await;
    assert_eq!(reply, replies::ASK_DATE);
    assert_eq!(stage_of(&store, "B").await, Some(Stage::AwaitingDate));
}

#[tokio::test]
async fn test_full_reservation_is_recorded_once() {
    let (engine, store, sink) = setup();
    let date = tomorrow();

    engine.handle("C", "mesa").await;
    engine.handle("C", "2").await;
    engine.handle("C", &date).await;
    engine.handle("C", "20:00").await;
    let turn = engine.process_turn("C", "Ana").await;

    assert!(turn.reply.starts_with("✅ ¡Reserva confirmada!"));
    assert!(turn.reply.contains("Nombre: Ana"));
    assert!(turn.reply.contains("Personas: 2"));
    assert!(turn.reply.contains(&format!("Fecha: {date}")));
    assert!(turn.reply.contains("Hora: 20:00"));
    assert_eq!(turn.stage, None);
    assert_eq!(turn.reservation, Some(ReservationOutcome::Recorded));

    let records = sink.records.lock().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Ana");
    assert_eq!(records[0].party_size.get(), 2);
    assert_eq!(records[0].date_display(), date);
    assert_eq!(records[0].time_display(), "20:00");
    assert_eq!(records[0].recorded_at, now());
    drop(records);

    assert!(store.get("C").await.expect("store").is_none());

    // A fresh message starts over from the keyword table.
    assert_eq!(engine.handle("C", "Ana").await, replies::HELP);
    assert_eq!(sink.records.lock().await.len(), 1);
}

#[tokio::test]
async fn test_time_outside_hours_quotes_hours() {
    let (engine, store, _) = setup();

    let date = tomorrow();
    for text in ["reservar", "1", date.as_str()] {
        engine.handle("D", text).await;
    }
    assert_eq!(stage_of(&store, "D").await, Some(Stage::AwaitingTime));

    let reply = engine.handle("D", "23:30").await;
    assert!(reply.contains("de 09:00 a 23:00"));
    assert_eq!(stage_of(&store, "D").await, Some(Stage::AwaitingTime));

    let reply = engine.handle("D", "8:30").await;
    assert_eq!(reply, replies::TIME_FORMAT);
    assert_eq!(stage_of(&store, "D").await, Some(Stage::AwaitingTime));
}

#[tokio::test]
async fn test_configured_hours_are_enforced() {
    let store = Arc::new(InMemorySessionStore::new());
    let hours = BusinessHours::parse("12:30", "16:00").expect("valid hours");
    let engine = ConversationEngine::new(
        Arc::clone(&store),
        Arc::new(RecordingSink::default()),
        ConversationConfig::default().with_hours(hours),
    )
    .with_clock(Arc::new(FixedClock(now())));

    let date = tomorrow();
    for text in ["reservar", "1", date.as_str()] {
        engine.handle("E", text).await;
    }
    let reply = engine.handle("E", "20:00").await;
    assert!(reply.contains("de 12:30 a 16:00"));

    let reply = engine.handle("E", "16:00").await;
    assert_eq!(reply, replies::ASK_NAME);
    assert_eq!(stage_of(&store, "E").await, Some(Stage::AwaitingName));
}

#[tokio::test]
async fn test_date_errors_keep_stage() {
    let (engine, store, _) = setup();
    engine.handle("F", "reservar").await;
    engine.handle("F", "2").await;

    assert_eq!(engine.handle("F", "17/10/2026").await, replies::DATE_IN_PAST);
    assert_eq!(engine.handle("F", "2026-10-20").await, replies::DATE_FORMAT);
    assert_eq!(stage_of(&store, "F").await, Some(Stage::AwaitingDate));
}

#[tokio::test]
async fn test_keywords_mid_flow_are_stage_input() {
    let (engine, store, _) = setup();

    engine.handle("G", "reservar").await;

    // Resending the intent keyword does not reset the dialogue.
    let reply = engine.handle("G", "mesa").await;
    assert_eq!(reply, replies::party_size_invalid());
    assert_eq!(stage_of(&store, "G").await, Some(Stage::AwaitingPartySize));

    engine.handle("G", "2").await;
    let reply = engine.handle("G", "menú").await;
    assert_eq!(reply, replies::DATE_FORMAT);

    engine.handle("G", &tomorrow()).await;
    engine.handle("G", "21:00").await;

    // At the name stage a greeting is just a name.
    let turn = engine.process_turn("G", "hola").await;
    assert!(turn.reply.contains("Nombre: hola"));
    assert_eq!(turn.reservation, Some(ReservationOutcome::Recorded));
}

#[tokio::test]
async fn test_sink_failure_still_confirms() {
    let store = Arc::new(InMemorySessionStore::new());
    let sink = Arc::new(BrokenSink {
        attempts: AtomicUsize::new(0),
    });
    let engine = ConversationEngine::new(
        Arc::clone(&store),
        Arc::clone(&sink),
        ConversationConfig::default(),
    )
    .with_clock(Arc::new(FixedClock(now())));

    let date = tomorrow();
    for text in ["reservar", "4", date.as_str(), "13:15"] {
        engine.handle("H", text).await;
    }
    let turn = engine.process_turn("H", "Marta").await;

    assert!(turn.reply.contains("Nombre: Marta"));
    assert!(matches!(
        turn.reservation,
        Some(ReservationOutcome::SinkFailed(ref reason)) if reason.contains("disk full")
    ));
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 1);
    assert!(store.get("H").await.expect("store").is_none());
}

#[tokio::test]
async fn test_record_is_appended_before_session_is_deleted() {
    let store = Arc::new(InMemorySessionStore::new());
    let sink = Arc::new(StageAtAppendSink {
        store: Arc::clone(&store),
        sender: "M",
        seen: Mutex::new(Vec::new()),
    });
    let engine = ConversationEngine::new(
        Arc::clone(&store),
        Arc::clone(&sink),
        ConversationConfig::default(),
    )
    .with_clock(Arc::new(FixedClock(now())));

    let date = tomorrow();
    for text in ["reservar", "2", date.as_str(), "20:00"] {
        engine.handle("M", text).await;
    }
    let turn = engine.process_turn("M", "Ana").await;

    assert_eq!(turn.reservation, Some(ReservationOutcome::Recorded));
    // The session was still stored while the record was being written.
    assert_eq!(*sink.seen.lock().await, vec![Some(Stage::AwaitingName)]);
    assert!(store.get("M").await.expect("store").is_none());
}

#[tokio::test]
async fn test_failed_delete_after_append_keeps_session_retryable() {
    let store = Arc::new(UndeletableStore::default());
    let sink = Arc::new(RecordingSink::default());
    let engine = ConversationEngine::new(
        Arc::clone(&store),
        Arc::clone(&sink),
        ConversationConfig::default(),
    )
    .with_clock(Arc::new(FixedClock(now())));

    let date = tomorrow();
    for text in ["reservar", "3", date.as_str(), "21:00"] {
        engine.handle("N", text).await;
    }
    let turn = engine.process_turn("N", "Luis").await;

    assert!(turn.reply.contains("Nombre: Luis"));
    assert_eq!(turn.reservation, Some(ReservationOutcome::Recorded));
    assert_eq!(sink.records.lock().await.len(), 1);

    let stored = store.get("N").await.expect("store").expect("session kept");
    assert_eq!(stored.stage(), Stage::AwaitingName);
    assert_eq!(stored.name(), None);

    // Resending the name records again: at-least-once.
    let again = engine.process_turn("N", "Luis").await;
    assert_eq!(again.reservation, Some(ReservationOutcome::Recorded));
    assert_eq!(sink.records.lock().await.len(), 2);
}

#[tokio::test]
async fn test_store_failure_yields_apology() {
    let engine = ConversationEngine::new(
        BrokenStore,
        Arc::new(RecordingSink::default()),
        ConversationConfig::default(),
    );

    let turn = engine.process_turn("I", "reservar").await;
    assert_eq!(turn.reply, replies::INTERNAL_ERROR);
    assert_eq!(turn.stage, None);
}

#[tokio::test]
async fn test_senders_are_independent() {
    let (engine, store, _) = setup();

    engine.handle("J", "reservar").await;
    engine.handle("K", "reservar").await;
    engine.handle("J", "9").await;
    engine.handle("K", "2").await;

    assert_eq!(stage_of(&store, "J").await, Some(Stage::AwaitingPartySize));
    assert_eq!(stage_of(&store, "K").await, Some(Stage::AwaitingDate));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dialogues_do_not_mix() {
    let (engine, store, sink) = setup();
    let engine = Arc::new(engine);
    let date = tomorrow();

    let run = |sender: &'static str, size: &'static str, time: &'static str, name: &'static str| {
        let engine = Arc::clone(&engine);
        let date = date.clone();
        tokio::spawn(async move {
            for text in ["reservar", size, date.as_str(), time] {
                engine.handle(sender, text).await;
                tokio::task::yield_now().await;
            }
            engine.process_turn(sender, name).await
        })
    };

    let (a, b) = tokio::join!(
        run("whatsapp:+341", "1", "10:00", "Ana"),
        run("whatsapp:+342", "4", "22:30", "Bruno")
    );
    let (a, b) = (a.expect("task a"), b.expect("task b"));

    assert!(a.reply.contains("Nombre: Ana") && a.reply.contains("Personas: 1"));
    assert!(a.reply.contains("Hora: 10:00"));
    assert!(b.reply.contains("Nombre: Bruno") && b.reply.contains("Personas: 4"));
    assert!(b.reply.contains("Hora: 22:30"));

    let records = sink.records.lock().await;
    assert_eq!(records.len(), 2);
    for record in records.iter() {
        match record.name.as_str() {
            "Ana" => assert_eq!(
                (record.party_size.get(), record.time_display().as_str()),
                (1, "10:00")
            ),
            "Bruno" => assert_eq!(
                (record.party_size.get(), record.time_display().as_str()),
                (4, "22:30")
            ),
            other => panic!("unexpected record {other}"),
        }
    }
    assert_eq!(store.count().await.expect("store"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_sender_burst_advances_one_stage_per_message() {
    let (engine, store, _) = setup();
    let engine = Arc::new(engine);
    engine.handle("L", "reservar").await;

    // Two party sizes arriving together: the first advances, the second is
    // read as a (malformed) date. The stage must never skip.
    let (x, y) = tokio::join!(
        {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.process_turn("L", "2").await })
        },
        {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.process_turn("L", "3").await })
        }
    );
    let stages = [
        x.expect("task x").stage,
        y.expect("task y").stage,
    ];

    assert!(stages.contains(&Some(Stage::AwaitingDate)));
    assert!(stages.iter().all(|s| *s == Some(Stage::AwaitingDate)));
    assert_eq!(stage_of(&store, "L").await, Some(Stage::AwaitingDate));
}

//! Integration tests for the session engine.
//!
//! These drive a real engine on a paused Tokio clock, so one-second ticks
//! are virtual and the long scenarios run instantly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pomotimer_core::{
    spawn_presenter, AlarmNotice, EngineOptions, Event, MemoryStore, Mode, NotificationPresenter,
    OngoingNotification, PersistenceStore, SqliteStore, TimerEngine, TimerState,
};

type Fired = Arc<Mutex<Vec<Mode>>>;

fn engine_with(store: Arc<dyn PersistenceStore>) -> (TimerEngine, Fired) {
    let fired: Fired = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    let alarm = move |mode: Mode| sink.lock().unwrap().push(mode);
    let engine = TimerEngine::new(store, Arc::new(alarm), EngineOptions::default()).unwrap();
    (engine, fired)
}

async fn advance_secs(n: u64) {
    tokio::time::sleep(Duration::from_millis(n * 1000 + 10)).await;
}

#[tokio::test(start_paused = true)]
async fn test_focus_session_scenario() {
    let store = Arc::new(MemoryStore::new());
    let (engine, fired) = engine_with(store.clone());
    let mut sub = engine.subscribe();
    // Drain continuously; 1500 ticks would overflow a parked subscriber.
    let collector = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = sub.recv().await {
            let completed = matches!(event, Event::Completed { .. });
            events.push(event);
            if completed {
                break;
            }
        }
        events
    });

    engine.start(Mode::Focus, 1500, "draft chapter").unwrap();
    advance_secs(1500).await;

    let events = collector.await.unwrap();
    let ticks: Vec<u64> = events
        .iter()
        .filter_map(Event::as_snapshot)
        .filter(|s| s.mode() == Some(Mode::Focus))
        .map(|s| s.remaining_secs())
        .collect();
    assert_eq!(ticks.first(), Some(&1500));
    assert!(ticks.windows(2).all(|w| w[1] == w[0] - 1));
    assert_eq!(ticks.last(), Some(&1));

    assert!(events.iter().any(|e| matches!(
        e,
        Event::Completed {
            mode: Mode::Focus,
            completed_focus_count: 1,
            ..
        }
    )));
    assert_eq!(*fired.lock().unwrap(), vec![Mode::Focus]);

    let snap = engine.resync();
    assert_eq!(snap.mode(), Some(Mode::ShortBreak));
    assert_eq!(snap.total_secs(), 300);
    assert_eq!(snap.state, TimerState::Paused);

    engine.flush().await;
    assert_eq!(store.completed_count().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fourth_focus_completion_yields_long_break() {
    let (engine, fired) = engine_with(Arc::new(MemoryStore::new()));

    let mut nexts = Vec::new();
    for _ in 0..4 {
        engine.start(Mode::Focus, 2, "").unwrap();
        advance_secs(2).await;
        nexts.push(engine.resync().mode());
    }

    assert_eq!(
        nexts,
        vec![
            Some(Mode::ShortBreak),
            Some(Mode::ShortBreak),
            Some(Mode::ShortBreak),
            Some(Mode::LongBreak)
        ]
    );
    assert_eq!(engine.resync().total_secs(), 900);
    assert_eq!(engine.completed_focus_count(), 4);
    assert_eq!(fired.lock().unwrap().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_break_then_focus_rotation_via_resume() {
    let (engine, _) = engine_with(Arc::new(MemoryStore::new()));
    engine.start(Mode::Focus, 1, "").unwrap();
    advance_secs(1).await;
    assert_eq!(engine.resync().mode(), Some(Mode::ShortBreak));

    // The next mode waits, held, until the host resumes it.
    engine.resume();
    advance_secs(300).await;
    let snap = engine.resync();
    assert_eq!(snap.mode(), Some(Mode::Focus));
    assert_eq!(snap.total_secs(), 1500);
    assert_eq!(snap.completed_focus_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_resync_matches_last_publication() {
    let (engine, _) = engine_with(Arc::new(MemoryStore::new()));
    let mut early = engine.subscribe();
    engine.start(Mode::Focus, 60, "").unwrap();
    advance_secs(7).await;
    engine.pause();

    let last_published = early
        .drain()
        .into_iter()
        .filter_map(|e| e.as_snapshot().cloned())
        .last()
        .unwrap();

    let late = engine.subscribe();
    assert_eq!(late.resync(), last_published);
    assert_eq!(engine.resync(), last_published);
    assert_eq!(last_published.remaining_secs(), 53);
}

#[tokio::test(start_paused = true)]
async fn test_total_is_conserved_across_pause_resume_and_ticks() {
    let (engine, _) = engine_with(Arc::new(MemoryStore::new()));
    let mut sub = engine.subscribe();
    engine.start(Mode::LongBreak, 40, "").unwrap();
    for _ in 0..5 {
        advance_secs(3).await;
        engine.pause();
        engine.pause();
        advance_secs(10).await;
        engine.resume();
        engine.resume();
    }
    let snaps: Vec<_> = sub
        .drain()
        .into_iter()
        .filter_map(|e| e.as_snapshot().cloned())
        .collect();
    assert!(snaps.iter().all(|s| s.total_secs() == 40));
    assert_eq!(engine.resync().remaining_secs(), 25);
}

#[tokio::test(start_paused = true)]
async fn test_counter_survives_engine_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pomotimer.db");

    {
        let store = Arc::new(SqliteStore::open_at(&path).unwrap());
        let (engine, _) = engine_with(store);
        engine.start(Mode::Focus, 10, "thesis").unwrap();
        engine.skip();
        engine.start(Mode::Focus, 10, "thesis").unwrap();
        engine.skip();
        engine.shutdown().await;
    }

    let store = Arc::new(SqliteStore::open_at(&path).unwrap());
    let (engine, _) = engine_with(store);
    assert_eq!(engine.completed_focus_count(), 2);
    assert_eq!(engine.last_task(), "thesis");
    assert_eq!(engine.state(), TimerState::Idle);
}

#[derive(Default)]
struct RecordingPresenter {
    presented: Mutex<Vec<OngoingNotification>>,
    dismissed: Mutex<u32>,
    alarms: Mutex<Vec<AlarmNotice>>,
}

impl NotificationPresenter for RecordingPresenter {
    fn present(&self, notification: &OngoingNotification) {
        self.presented.lock().unwrap().push(notification.clone());
    }

    fn dismiss(&self) {
        *self.dismissed.lock().unwrap() += 1;
    }

    fn alarm(&self, notice: &AlarmNotice) {
        self.alarms.lock().unwrap().push(notice.clone());
    }
}

#[tokio::test(start_paused = true)]
async fn test_presenter_follows_engine() {
    let (engine, _) = engine_with(Arc::new(MemoryStore::new()));
    let presenter = Arc::new(RecordingPresenter::default());
    let handle = spawn_presenter(&engine, presenter.clone(), true);

    engine.start(Mode::Focus, 3, "notes").unwrap();
    advance_secs(3).await;
    engine.stop();
    advance_secs(0).await;

    let presented = presenter.presented.lock().unwrap().clone();
    let titles: Vec<_> = presented.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Focus Session · 00:03",
            "Focus Session · 00:02",
            "Focus Session · 00:01",
            "Short Break · 05:00",
        ]
    );
    assert_eq!(presented.last().unwrap().primary_action, "Start");
    assert_eq!(presenter.alarms.lock().unwrap()[0].headline, "TIME'S UP");
    // Attaching while idle shows nothing, so the only dismiss is the stop.
    assert_eq!(*presenter.dismissed.lock().unwrap(), 1);

    drop(engine);
    handle.await.unwrap();
}

//! The tick path leaves event logging to the host's `EventLog`

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record};

use planets_arcade::Settings;
use planets_arcade::sim::{GameEvent, GameState, PresentationCatalog, TickInput, tick};
use planets_arcade::telemetry::EventLog;

static LINES: AtomicUsize = AtomicUsize::new(0);

struct Counter;

impl Log for Counter {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            LINES.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn flush(&self) {}
}

static COUNTER: Counter = Counter;

#[test]
fn events_are_logged_once_by_the_worker() {
    log::set_logger(&COUNTER).unwrap();
    log::set_max_level(LevelFilter::Debug);

    let settings = Settings {
        first_ufo_ms: 0,
        control_start_offset: 100.0,
        ..Settings::with_seed(7)
    };
    let mut state = GameState::new(settings, PresentationCatalog::standard()).unwrap();
    let tick_ms = state.settings().tick_ms();

    LINES.store(0, Ordering::SeqCst);
    let mut events = Vec::new();
    for n in 1..=30 {
        tick(&mut state, &TickInput::default(), n * tick_ms);
        events.extend(state.drain_events());
    }
    assert!(events.iter().any(|e| matches!(e, GameEvent::Spawned { .. })));
    assert_eq!(LINES.load(Ordering::SeqCst), 0);

    let log = EventLog::start(true).unwrap();
    let count = events.len();
    for event in events {
        log.record(event);
    }
    let stats = log.shutdown(std::time::Duration::from_secs(5));
    assert_eq!(stats.logged, Some(count));
    assert_eq!(LINES.load(Ordering::SeqCst), count);
}

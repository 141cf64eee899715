//! Planets Arcade headless runner
//!
//! Runs the simulation without a window: a scripted pilot steers the fighter
//! while events stream to the background log. Useful for replaying a seed.
//!
//! Usage: `planets-arcade [settings.json] [seconds]`

use std::time::Duration;

use planets_arcade::Settings;
use planets_arcade::sim::{GameEvent, GameState, PresentationCatalog, TickInput, tick};
use planets_arcade::telemetry::EventLog;

/// Default simulated run length
const DEFAULT_SECONDS: i64 = 120;
/// How long shutdown waits for queued log lines
const LOG_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> planets_arcade::Result<()> {
    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_SECONDS);

    log::info!("Planets Arcade (headless) starting, seed {}", settings.seed);

    let events = EventLog::start(settings.debug)?;
    let mut state = GameState::new(settings, PresentationCatalog::standard())?;
    let tick_ms = state.settings().tick_ms();
    let end = seconds * 1000;

    let mut collisions = 0usize;
    let mut time = 0;
    while time < end && !state.is_lost() {
        time += tick_ms;
        tick(&mut state, &pilot(time), time);
        for event in state.drain_events() {
            if matches!(event, GameEvent::Collision { .. }) {
                collisions += 1;
            }
            events.record(event);
        }
    }

    events.note(format!(
        "Stopped at {time} ms: {} entities, {collisions} collisions, {} lives left{}",
        state.entities().len(),
        state.lives_remaining(),
        if state.is_lost() { ", game lost" } else { "" }
    ));
    let stats = events.shutdown(LOG_DRAIN_TIMEOUT);
    if stats.dropped > 0 {
        log::warn!("{} events dropped by a full log queue", stats.dropped);
    }
    if stats.logged.is_none() {
        log::warn!("Some events were not logged");
    }
    Ok(())
}

/// Sweep left and right across the field, nudging forward now and then
fn pilot(time: i64) -> TickInput {
    let phase = (time / 2000) % 4;
    TickInput {
        left: phase == 0 || phase == 1,
        right: phase == 2 || phase == 3,
        up: phase == 1 && (time / 250) % 2 == 0,
        down: phase == 3 && (time / 250) % 2 == 0,
    }
}

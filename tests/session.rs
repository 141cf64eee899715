use std::sync::Arc;

use glam::DVec2;
use proptest::prelude::*;

use planets_arcade::Settings;
use planets_arcade::sim::{
    Animation, Category, GameEvent, GameState, Path, PlayerState, Presentation, PresentationCatalog,
    PresentationKind, SpawnOptions, TickInput, tick,
};

fn square(id: &str, kind: PresentationKind, len: u32) -> Arc<Presentation> {
    Arc::new(Presentation::new(id, kind, len, len, Animation::Static))
}

fn collisions(events: &[GameEvent]) -> Vec<&GameEvent> {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::Collision { .. }))
        .collect()
}

/// (time, name, x, y, x velocity sign, y velocity sign) of every UFO spawned
fn spawn_trace(seed: u64, ticks: i64) -> Vec<(i64, String, f64, f64, bool, bool)> {
    let settings = Settings {
        first_ufo_ms: 0,
        ufo_spawn_base_ms: 50,
        ufo_spawn_jitter_ms: 100,
        control_start_offset: 100.0,
        ..Settings::with_seed(seed)
    };
    let mut state = GameState::new(settings, PresentationCatalog::standard()).unwrap();
    let tick_ms = state.settings().tick_ms();

    let mut trace = Vec::new();
    for n in 1..=ticks {
        let time = n * tick_ms;
        tick(&mut state, &TickInput::default(), time);
        for event in state.drain_events() {
            let GameEvent::Spawned { id, name, .. } = event else {
                continue;
            };
            let Some(entity) = state.entity(id) else {
                continue;
            };
            if entity.category() == Category::Ufo {
                // Velocity signs are read back from the next tick's displacement
                trace.push((time, name, entity.pos().x, entity.pos().y, false, false));
            }
        }
        // Fill in velocity signs for UFOs spawned on the previous tick
        for entry in trace.iter_mut().filter(|t| t.0 == time - tick_ms) {
            if let Some(e) = state.entity_by_name(&entry.1) {
                entry.4 = e.pos().x > e.last_pos().x;
                entry.5 = e.pos().y > e.last_pos().y;
            }
        }
    }
    trace
}

#[test]
fn spawn_sequence_is_reproducible() {
    let a = spawn_trace(4242, 100);
    let b = spawn_trace(4242, 100);
    assert!(a.len() > 3, "expected several spawns, got {}", a.len());
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.0, y.0);
        assert_eq!(x.1, y.1);
        assert_eq!(x.2.to_bits(), y.2.to_bits());
        assert_eq!(x.3.to_bits(), y.3.to_bits());
        assert_eq!((x.4, x.5), (y.4, y.5));
    }
}

#[test]
fn different_seeds_diverge() {
    let a = spawn_trace(1, 100);
    let b = spawn_trace(2, 100);
    assert_ne!(a, b);
}

#[test]
fn converging_paths_collide_once() {
    let mut state = GameState::empty(Settings::default(), PresentationCatalog::standard()).unwrap();
    let tick_ms = state.settings().tick_ms();

    let planet = state.spawn(
        "Rogue",
        square("rogue", PresentationKind::Planet, 40),
        Path::linear(DVec2::new(600.0, 500.0), DVec2::new(-0.1, 0.0), 0),
        0,
        SpawnOptions::default(),
    );
    let rock = state.spawn(
        "Rock",
        square("rock", PresentationKind::Asteroid, 20),
        Path::linear(DVec2::new(400.0, 510.0), DVec2::new(0.1, 0.0), 0),
        0,
        SpawnOptions::default(),
    );
    state.drain_events();

    let mut all = Vec::new();
    for n in 1..=120 {
        let time = n * tick_ms;
        tick(&mut state, &TickInput::default(), time);
        let events = state.drain_events();

        if n == 53 {
            // First tick where the boxes are closer than the rock's width
            assert_eq!(collisions(&events).len(), 1);
            assert_eq!(state.collisions().target_of(rock), Some(planet));
            // Deactivated but still drawable this tick
            let snap = state.snapshot(time);
            assert!(snap.iter().any(|s| s.id == rock && !s.active));
        }
        if n == 54 {
            assert!(state.entity(rock).is_none());
        }
        all.extend(events);
    }

    let hits = collisions(&all);
    assert_eq!(hits.len(), 1);
    assert_eq!(
        hits[0],
        &GameEvent::Collision {
            time: 53 * tick_ms,
            initiator: "Rock".into(),
            target: "Rogue".into(),
        }
    );

    // The explosion rides along with the planet
    let explosion = state
        .entities()
        .iter()
        .find(|e| e.kind() == PresentationKind::Explosion)
        .unwrap();
    let planet_center = state.entity(planet).unwrap().hitbox().center();
    assert!((explosion.hitbox().center() - planet_center).length() < 1e-9);
}

#[test]
fn fighter_respawns_after_grace_period() {
    let settings = Settings {
        first_ufo_ms: i64::MAX / 2,
        control_start_offset: 100.0,
        ..Settings::default()
    };
    let mut state = GameState::new(settings, PresentationCatalog::standard()).unwrap();
    let tick_ms = state.settings().tick_ms();
    let PlayerState::Alive(fighter) = state.player() else {
        panic!("fighter should be in play");
    };
    let fighter_pos = state.entity(fighter).unwrap().pos();

    state.spawn(
        "Asteroid-0",
        square("rock", PresentationKind::Asteroid, 30),
        Path::stationary(fighter_pos + DVec2::splat(10.0)),
        0,
        SpawnOptions::default(),
    );

    tick(&mut state, &TickInput::default(), tick_ms);
    let events = state.drain_events();
    assert_eq!(collisions(&events).len(), 1);
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::PlayerHit { name, lives_used: 1, .. } if name == "Fighter-1"
    )));
    assert!(matches!(state.player(), PlayerState::GraceCountdown { .. }));
    assert_eq!(state.lives_remaining(), 3);

    let mut time = tick_ms;
    let mut respawned_at = None;
    while time < 5000 {
        time += tick_ms;
        tick(&mut state, &TickInput::default(), time);
        for event in state.drain_events() {
            if let GameEvent::PlayerRespawned { time, name } = event {
                assert_eq!(name, "Fighter-2");
                respawned_at = Some(time);
            }
        }
    }
    let respawned_at = respawned_at.expect("fighter should respawn");
    assert!(respawned_at >= tick_ms + 3000);
    assert!(respawned_at < tick_ms + 3000 + tick_ms);
    assert!(state.entity(fighter).is_none());
    assert!(matches!(state.player(), PlayerState::Alive(id) if id != fighter));
}

#[test]
fn losing_the_last_fighter_ends_the_game() {
    let settings = Settings {
        first_ufo_ms: i64::MAX / 2,
        max_lives: 1,
        control_start_offset: 100.0,
        ..Settings::default()
    };
    let mut state = GameState::new(settings, PresentationCatalog::standard()).unwrap();
    let PlayerState::Alive(fighter) = state.player() else {
        panic!("fighter should be in play");
    };
    let pos = state.entity(fighter).unwrap().pos();
    state.spawn(
        "Asteroid-0",
        square("rock", PresentationKind::Asteroid, 30),
        Path::stationary(pos),
        0,
        SpawnOptions::default(),
    );

    tick(&mut state, &TickInput::default(), 17);
    assert!(state.is_lost());
    for n in 2..400 {
        tick(&mut state, &TickInput::default(), n * 17);
    }
    assert!(state.is_lost());
    assert!(state.entity_by_name("Fighter-2").is_none());
}

proptest! {
    #[test]
    fn last_position_is_previous_position(
        vx in -0.5f64..0.5,
        vy in -0.5f64..0.5,
        ticks in 1usize..60,
    ) {
        let catalog = PresentationCatalog::standard();
        let mut state = GameState::empty(Settings::default(), catalog).unwrap();
        let id = state.spawn(
            "Drifter",
            square("drifter", PresentationKind::Moon, 10),
            Path::linear(DVec2::new(800.0, 600.0), DVec2::new(vx, vy), 0),
            0,
            SpawnOptions::default(),
        );
        let mut prev = state.entity(id).unwrap().pos();
        for n in 1..=ticks as i64 {
            state.update(n * 17);
            let e = state.entity(id).unwrap();
            prop_assert_eq!(e.last_pos(), prev);
            prev = e.pos();
        }
    }
}

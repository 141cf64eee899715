//! Game state and entity lifecycle
//!
//! [`GameState`] is the only owner of entities, their paths, the bucket sets
//! and the collision map. Everything that creates or destroys an entity goes
//! through it.

use std::fmt;
use std::sync::Arc;

use glam::DVec2;
use serde::Serialize;

use super::collision::{CollisionMap, Hitbox, clip};
use super::entity::{Entity, EntityId, EntitySnapshot};
use super::path::{ControlPath, Path};
use super::presentation::{Presentation, PresentationCatalog};
use super::rng::GameRng;
use crate::consts::*;
use crate::error::{Result, SimError};
use crate::settings::Settings;

/// Something the host may want to log, draw or play a sound for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Spawned {
        time: i64,
        id: EntityId,
        name: String,
    },
    Collision {
        time: i64,
        initiator: String,
        target: String,
    },
    Removed {
        time: i64,
        id: EntityId,
        name: String,
    },
    /// The fighter was destroyed; `lives_used` counts fighters so far
    PlayerHit {
        time: i64,
        name: String,
        lives_used: u32,
    },
    PlayerRespawned {
        time: i64,
        name: String,
    },
    GameLost {
        time: i64,
    },
}

impl GameEvent {
    pub fn time(&self) -> i64 {
        match self {
            GameEvent::Spawned { time, .. }
            | GameEvent::Collision { time, .. }
            | GameEvent::Removed { time, .. }
            | GameEvent::PlayerHit { time, .. }
            | GameEvent::PlayerRespawned { time, .. }
            | GameEvent::GameLost { time } => *time,
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::Spawned { time, name, .. } => write!(f, "[{time}] Created: {name}"),
            GameEvent::Collision {
                time,
                initiator,
                target,
            } => write!(f, "[{time}] Collision: {initiator} -> {target}"),
            GameEvent::Removed { time, name, .. } => write!(f, "[{time}] Removed: {name}"),
            GameEvent::PlayerHit {
                time,
                name,
                lives_used,
            } => write!(f, "[{time}] {name} destroyed, lives used: {lives_used}"),
            GameEvent::PlayerRespawned { time, name } => write!(f, "[{time}] {name} launched"),
            GameEvent::GameLost { time } => write!(f, "[{time}] You lost!"),
        }
    }
}

/// Fighter lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerState {
    /// A fighter is in play
    Alive(EntityId),
    /// Waiting for the replacement fighter
    GraceCountdown { respawn_at: i64 },
    /// No lives left
    Lost,
    /// Scripted session without a fighter
    Absent,
}

/// Per-entity creation flags
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnOptions {
    /// Collision target even though ephemeral (the fighter)
    pub protected: bool,
    pub inactive_if_out_of_bounds: bool,
}

/// Presentation ids the standard session needs, in lookup order
pub const SCENE_PRESENTATIONS: [&str; 5] = ["sun", "planet", "earth", "moon", "fighter"];

/// Complete simulation state
#[derive(Debug)]
pub struct GameState {
    settings: Settings,
    catalog: PresentationCatalog,
    rng: GameRng,
    /// Shuffled once at startup; spawn order depends on the seed
    ufo_kinds: Vec<Arc<Presentation>>,
    explosion_kinds: Vec<Arc<Presentation>>,
    /// Presentation for (re)spawned fighters; `None` in scripted sessions
    fighter: Option<Arc<Presentation>>,
    /// Arena in insertion order (sorted by id)
    entities: Vec<Entity>,
    /// `paths[i]` drives `entities[i]`
    paths: Vec<Path>,
    /// Planetary bodies and protected entities; collision targets
    long_lived: Vec<EntityId>,
    /// Unprotected ephemeral entities
    short_lived: Vec<EntityId>,
    /// Entities that initiate collision checks
    colliding: Vec<EntityId>,
    collisions: CollisionMap,
    next_ufo_tick: i64,
    player: PlayerState,
    /// Number of the current fighter, starting at 1
    lives_used: u32,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Standard session: sun, planet, earth, moon and the fighter
    ///
    /// Fails on the first missing id of [`SCENE_PRESENTATIONS`], in that
    /// order, then on an empty UFO set.
    pub fn new(settings: Settings, catalog: PresentationCatalog) -> Result<Self> {
        for id in SCENE_PRESENTATIONS {
            catalog.get(id)?;
        }
        let mut state = Self::empty(settings, catalog)?;
        if state.ufo_kinds.is_empty() {
            return Err(SimError::EmptyPresentationSet("ufos"));
        }
        state.fighter = Some(state.catalog.get("fighter")?);
        state.next_ufo_tick = state.settings.first_ufo_ms;
        state.create_scene()?;
        state.spawn_fighter(0);
        state.events.clear();
        Ok(state)
    }

    /// Session with no bodies, no fighter and no automatic UFOs, for scripted scenes
    pub fn empty(settings: Settings, catalog: PresentationCatalog) -> Result<Self> {
        settings.validate()?;
        let mut rng = GameRng::new(settings.seed);

        let mut ufo_kinds = catalog.ufos();
        rng.shuffle(&mut ufo_kinds);
        let mut explosion_kinds = catalog.explosions();
        rng.shuffle(&mut explosion_kinds);
        if explosion_kinds.is_empty() {
            return Err(SimError::EmptyPresentationSet("explosions"));
        }

        log::info!(
            "Game state created: {}x{} field, seed {}, {} presentations, {} UFO kinds",
            settings.width,
            settings.height,
            settings.seed,
            catalog.len(),
            ufo_kinds.len()
        );

        Ok(Self {
            settings,
            catalog,
            rng,
            ufo_kinds,
            explosion_kinds,
            fighter: None,
            entities: Vec::new(),
            paths: Vec::new(),
            long_lived: Vec::new(),
            short_lived: Vec::new(),
            colliding: Vec::new(),
            collisions: CollisionMap::new(),
            next_ufo_tick: i64::MAX,
            player: PlayerState::Absent,
            lives_used: 1,
            events: Vec::new(),
            next_id: 1,
        })
    }

    fn create_scene(&mut self) -> Result<()> {
        let center = self.field() / 2.0;

        let sun = self.catalog.get("sun")?;
        let sun_pos = center - sun.size() / 2.0;
        let sun_id = self.spawn("Sun", sun, Path::stationary(sun_pos), 0, SpawnOptions::default());

        let phase = self.rng.next_f64() * 0.0072;
        let planet = self.catalog.get("planet")?;
        self.spawn(
            "Planet",
            planet,
            Path::elliptical(150.0, 250.0, phase, -0.0011, sun_id),
            0,
            SpawnOptions::default(),
        );

        let phase = self.rng.next_f64() * 7.2;
        let earth = self.catalog.get("earth")?;
        let earth_id = self.spawn(
            "Earth",
            earth,
            Path::elliptical(500.0, 350.0, phase, 0.00073, sun_id),
            0,
            SpawnOptions::default(),
        );

        let phase = self.rng.next_f64() * 7.2;
        let moon = self.catalog.get("moon")?;
        self.spawn(
            "Moon",
            moon,
            Path::elliptical(45.0, 67.5, phase, 0.00377, earth_id),
            0,
            SpawnOptions::default(),
        );
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn field(&self) -> DVec2 {
        DVec2::new(self.settings.width, self.settings.height)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn long_lived(&self) -> &[EntityId] {
        &self.long_lived
    }

    pub fn short_lived(&self) -> &[EntityId] {
        &self.short_lived
    }

    pub fn colliding(&self) -> &[EntityId] {
        &self.colliding
    }

    pub fn collisions(&self) -> &CollisionMap {
        &self.collisions
    }

    pub fn player(&self) -> PlayerState {
        self.player
    }

    pub fn lives_used(&self) -> u32 {
        self.lives_used
    }

    /// Fighters still in reserve
    pub fn lives_remaining(&self) -> u32 {
        self.settings.max_lives.saturating_sub(self.lives_used)
    }

    pub fn is_lost(&self) -> bool {
        self.player == PlayerState::Lost
    }

    pub fn next_ufo_tick(&self) -> i64 {
        self.next_ufo_tick
    }

    /// Control path of the fighter in play, if any
    pub fn control_path_mut(&mut self) -> Option<&mut ControlPath> {
        let PlayerState::Alive(id) = self.player else {
            return None;
        };
        let idx = self.index_of(id)?;
        self.paths[idx].as_control_mut()
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drawable view of every entity still in the game, in insertion order
    pub fn snapshot(&self, time: i64) -> Vec<EntitySnapshot> {
        self.entities.iter().map(|e| e.snapshot(time)).collect()
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    fn hitbox_of(entities: &[Entity], id: EntityId) -> Option<Hitbox> {
        entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| entities[i].hitbox())
    }

    /// Queue an event for the host; logging happens wherever it is drained
    fn emit(&mut self, event: GameEvent) {
        log::trace!("{event}");
        self.events.push(event);
    }

    /// Add an entity, place it at its path's location for `time` and sort it
    /// into the buckets. Returns its id.
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        presentation: Arc<Presentation>,
        mut path: Path,
        time: i64,
        options: SpawnOptions,
    ) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let mut entity = Entity::new(id, name, presentation, time);
        if options.protected {
            entity = entity.protected();
        }
        if options.inactive_if_out_of_bounds {
            entity = entity.inactive_if_out_of_bounds();
        }

        let field = self.field();
        let location = path.location(time, &self.entities).unwrap_or(DVec2::ZERO);
        entity.update(time, location, field);

        let category = entity.category();
        if !category.is_ephemeral() || entity.protected {
            self.long_lived.push(id);
        } else {
            self.short_lived.push(id);
        }
        if category.initiates_collisions() {
            self.colliding.push(id);
        }

        let name = entity.name.clone();
        self.entities.push(entity);
        self.paths.push(path);
        self.emit(GameEvent::Spawned { time, id, name });
        id
    }

    /// Remove an entity from the arena, every bucket and the collision map
    pub fn remove(&mut self, id: EntityId, time: i64) -> Option<Entity> {
        let idx = self.index_of(id)?;
        let entity = self.entities.remove(idx);
        self.paths.remove(idx);
        self.long_lived.retain(|e| *e != id);
        self.short_lived.retain(|e| *e != id);
        self.colliding.retain(|e| *e != id);
        self.collisions.remove_entity(id);

        self.emit(GameEvent::Removed {
            time,
            id,
            name: entity.name.clone(),
        });
        Some(entity)
    }

    /// Move every entity along its path, parents first
    pub fn update(&mut self, time: i64) {
        let field = self.field();
        for i in 0..self.entities.len() {
            let location = self.paths[i].location(time, &self.entities);
            let entity = &mut self.entities[i];
            // Parent gone: hold position
            let location = location.unwrap_or_else(|| entity.pos());
            entity.update(time, location, field);
        }
    }

    /// Remove inactive entities and those whose animation has run out
    pub fn retire(&mut self, time: i64) {
        let expired: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|e| !e.is_active() || !e.has_frame(time))
            .map(|e| e.id)
            .collect();
        for id in expired {
            self.remove(id, time);
        }
    }

    /// Drop separated pairs, then look for new hits. Each initiator takes the
    /// first target in insertion order that it clips.
    pub fn resolve_collisions(&mut self, time: i64) {
        let entities = &self.entities;
        for (a, b) in self.collisions.prune(|id| Self::hitbox_of(entities, id)) {
            log::trace!("Separated: {a} -> {b}");
        }

        let initiators = self.colliding.clone();
        for a in initiators {
            if self.collisions.contains(a) {
                continue;
            }
            let Some(a_idx) = self.index_of(a) else {
                continue;
            };
            if !self.entities[a_idx].is_active() {
                continue;
            }
            let a_box = self.entities[a_idx].hitbox();

            let target = self.long_lived.iter().copied().find(|&b| {
                b != a
                    && self
                        .entity(b)
                        .is_some_and(|o| o.is_active() && clip(&a_box, &o.hitbox()))
            });
            if let Some(b) = target {
                self.on_collision(a, b, time);
            }
        }
    }

    fn on_collision(&mut self, a: EntityId, b: EntityId, time: i64) {
        self.collisions.record(a, b);

        let (a_name, a_ephemeral) = match self.entity(a) {
            Some(e) => (e.name.clone(), e.category().is_ephemeral()),
            None => return,
        };
        let b_name = match self.entity(b) {
            Some(e) => e.name.clone(),
            None => return,
        };
        self.emit(GameEvent::Collision {
            time,
            initiator: a_name.clone(),
            target: b_name.clone(),
        });

        if a_ephemeral {
            if let Some(idx) = self.index_of(a) {
                self.entities[idx].deactivate();
            }
        }

        self.spawn_explosion(time, &a_name, &b_name, b);

        if let PlayerState::Alive(player) = self.player {
            if player == a || player == b {
                self.player_hit(time);
            }
        }
    }

    fn spawn_explosion(&mut self, time: i64, a_name: &str, b_name: &str, target: EntityId) {
        let idx = self.rng.index(self.explosion_kinds.len());
        let presentation = self.explosion_kinds[idx].clone();
        let Some(parent) = self.entity(target) else {
            return;
        };
        let path = Path::piggyback(parent, presentation.size());
        self.spawn(
            format!("Explosion-{time}<{a_name}, {b_name}>"),
            presentation,
            path,
            time,
            SpawnOptions::default(),
        );
    }

    fn player_hit(&mut self, time: i64) {
        let PlayerState::Alive(id) = self.player else {
            return;
        };
        let name = match self.index_of(id) {
            Some(idx) => {
                self.entities[idx].deactivate();
                self.entities[idx].name.clone()
            }
            None => String::new(),
        };
        self.emit(GameEvent::PlayerHit {
            time,
            name,
            lives_used: self.lives_used,
        });

        if self.lives_used >= self.settings.max_lives {
            self.player = PlayerState::Lost;
            self.emit(GameEvent::GameLost { time });
        } else {
            self.lives_used += 1;
            self.player = PlayerState::GraceCountdown {
                respawn_at: time + self.settings.respawn_delay_ms,
            };
        }
    }

    /// Spawn a UFO once `time` passes the scheduled tick, then reschedule
    pub fn spawn_ufos(&mut self, time: i64) {
        if time <= self.next_ufo_tick || self.ufo_kinds.is_empty() {
            return;
        }
        let jitter = self.rng.below(self.settings.ufo_spawn_jitter_ms);
        self.next_ufo_tick = time + self.settings.ufo_spawn_base_ms + jitter;

        let idx = self.rng.index(self.ufo_kinds.len());
        let presentation = self.ufo_kinds[idx].clone();
        let path = self.ufo_path(time);
        self.spawn(
            format!("{}-{time}", presentation.kind.name_prefix()),
            presentation,
            path,
            time,
            SpawnOptions {
                inactive_if_out_of_bounds: true,
                ..SpawnOptions::default()
            },
        );
    }

    /// Straight line in from the top or left edge, each axis possibly mirrored
    fn ufo_path(&mut self, time: i64) -> Path {
        let field = self.field();
        let fraction = self.rng.next_f64();
        let mut start = if self.rng.next_bool() {
            DVec2::new(field.x * UFO_EDGE_SCALE * fraction, 0.0)
        } else {
            DVec2::new(0.0, field.y * UFO_EDGE_SCALE * fraction)
        };

        let mut velocity = DVec2::new(
            UFO_MIN_SPEED + UFO_SPEED_RANGE * self.rng.next_f64(),
            UFO_MIN_SPEED + UFO_SPEED_RANGE * self.rng.next_f64(),
        );
        if self.rng.next_bool() {
            start.x = field.x - start.x;
            velocity.x = -velocity.x;
        }
        if self.rng.next_bool() {
            start.y = field.y - start.y;
            velocity.y = -velocity.y;
        }
        Path::linear(start, velocity, time)
    }

    /// Launch the replacement fighter once the grace period is over
    pub fn respawn_player(&mut self, time: i64) {
        let PlayerState::GraceCountdown { respawn_at } = self.player else {
            return;
        };
        if time < respawn_at {
            return;
        }
        if let Some(id) = self.spawn_fighter(time) {
            if let Some(e) = self.entity(id) {
                let name = e.name.clone();
                self.emit(GameEvent::PlayerRespawned { time, name });
            }
        }
    }

    fn spawn_fighter(&mut self, time: i64) -> Option<EntityId> {
        let presentation = self.fighter.clone()?;
        let control = ControlPath::for_fighter(&self.settings, presentation.size());
        let id = self.spawn(
            format!("Fighter-{}", self.lives_used),
            presentation,
            Path::Control(control),
            time,
            SpawnOptions {
                protected: true,
                inactive_if_out_of_bounds: true,
            },
        );
        self.player = PlayerState::Alive(id);
        Some(id)
    }
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Tick time supplied by the host only
//! - Seeded RNG only, passed explicitly
//! - Stable iteration order (insertion order, by entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod entity;
pub mod path;
pub mod presentation;
pub mod rng;
pub mod state;
pub mod tick;

pub use collision::{CollisionMap, Hitbox, clip, clip_box, clip_circle};
pub use entity::{Entity, EntityId, EntitySnapshot};
pub use path::{ControlPath, Direction, Path};
pub use presentation::{Animation, Category, Presentation, PresentationCatalog, PresentationKind};
pub use rng::GameRng;
pub use state::{GameEvent, GameState, PlayerState, SpawnOptions};
pub use tick::{TickInput, tick};

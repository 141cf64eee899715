//! Simulated entities

use std::fmt;
use std::sync::Arc;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::Hitbox;
use super::presentation::{Category, Presentation, PresentationKind};

/// Stable entity identifier; allocated in increasing order, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mutable simulation record owned by the game state
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub presentation: Arc<Presentation>,
    /// Top-left corner of the sprite box
    pos: DVec2,
    /// Position from the previous update (NaN before the first one)
    last_pos: DVec2,
    active: bool,
    /// Deactivate as soon as the position leaves the field
    inactive_if_out_of_bounds: bool,
    /// Protected entities are collision targets even when ephemeral
    pub protected: bool,
    /// Tick time the entity was created (start of single-shot animations)
    pub born_at: i64,
    /// Tick time of the last path update
    updated_at: Option<i64>,
}

impl Entity {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        presentation: Arc<Presentation>,
        born_at: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            presentation,
            pos: DVec2::NAN,
            last_pos: DVec2::NAN,
            active: true,
            inactive_if_out_of_bounds: false,
            protected: false,
            born_at,
            updated_at: None,
        }
    }

    pub fn inactive_if_out_of_bounds(mut self) -> Self {
        self.inactive_if_out_of_bounds = true;
        self
    }

    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    pub fn category(&self) -> Category {
        self.presentation.category()
    }

    pub fn kind(&self) -> PresentationKind {
        self.presentation.kind
    }

    pub fn pos(&self) -> DVec2 {
        self.pos
    }

    pub fn last_pos(&self) -> DVec2 {
        self.last_pos
    }

    pub fn size(&self) -> DVec2 {
        self.presentation.size()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    /// Mark for removal. There is no way back.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Move to a freshly evaluated path location
    pub fn update(&mut self, time: i64, location: DVec2, field: DVec2) {
        self.last_pos = self.pos;
        self.pos = location;
        self.updated_at = Some(time);

        if self.inactive_if_out_of_bounds && !in_field(location, field) {
            self.active = false;
        }
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.pos, self.size())
    }

    /// Whether the sprite still has something to show at `time`
    pub fn has_frame(&self, time: i64) -> bool {
        self.presentation.animation.has_frame(self.born_at, time)
    }

    pub fn snapshot(&self, time: i64) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            name: self.name.clone(),
            category: self.category(),
            kind: self.kind(),
            presentation_id: self.presentation.id.clone(),
            x: self.pos.x,
            y: self.pos.y,
            last_x: self.last_pos.x,
            last_y: self.last_pos.y,
            width: self.presentation.width,
            height: self.presentation.height,
            active: self.active,
            frame: self.presentation.animation.frame_index(self.born_at, time, 0),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{{name={}, category={:?}, x={}, y={}, presentation={}}}",
            self.id,
            self.name,
            self.category(),
            self.pos.x.round(),
            self.pos.y.round(),
            self.presentation.id
        )
    }
}

fn in_field(p: DVec2, field: DVec2) -> bool {
    p.x >= 0.0 && p.y >= 0.0 && p.x <= field.x && p.y <= field.y
}

/// What the renderer needs to draw (and erase) one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub name: String,
    pub category: Category,
    pub kind: PresentationKind,
    pub presentation_id: String,
    pub x: f64,
    pub y: f64,
    pub last_x: f64,
    pub last_y: f64,
    pub width: u32,
    pub height: u32,
    pub active: bool,
    pub frame: u32,
}

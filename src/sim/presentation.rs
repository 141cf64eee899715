//! Presentation metadata: what an entity looks like, as far as the simulation
//! cares (box size and how long its frame sequence lasts).

use std::collections::HashMap;
use std::sync::Arc;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Entity category; fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Planetary,
    Ufo,
    User,
    Misc,
}

impl Category {
    /// Ephemeral entities come and go during play; planetary bodies are permanent
    pub fn is_ephemeral(self) -> bool {
        match self {
            Category::Ufo | Category::User | Category::Misc => true,
            Category::Planetary => false,
        }
    }

    /// Categories that initiate collision checks
    pub fn initiates_collisions(self) -> bool {
        matches!(self, Category::Ufo | Category::User)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresentationKind {
    Star,
    Planet,
    Moon,
    Asteroid,
    AlienShip,
    SpaceBlob,
    Explosion,
    Fighter,
}

impl PresentationKind {
    pub fn category(self) -> Category {
        match self {
            PresentationKind::Star | PresentationKind::Planet | PresentationKind::Moon => {
                Category::Planetary
            }
            PresentationKind::Asteroid
            | PresentationKind::AlienShip
            | PresentationKind::SpaceBlob => Category::Ufo,
            PresentationKind::Explosion => Category::Misc,
            PresentationKind::Fighter => Category::User,
        }
    }

    /// Prefix used when naming spawned entities
    pub fn name_prefix(self) -> &'static str {
        match self {
            PresentationKind::Star => "Star",
            PresentationKind::Planet => "Planet",
            PresentationKind::Moon => "Moon",
            PresentationKind::Asteroid => "Asteroid",
            PresentationKind::AlienShip => "AlienShip",
            PresentationKind::SpaceBlob => "SpaceBlob",
            PresentationKind::Explosion => "Explosion",
            PresentationKind::Fighter => "Fighter",
        }
    }
}

/// Frame timeline of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Animation {
    /// Single image
    Static,
    /// Cycles forever, phase taken from absolute time
    Loop { frame_ms: i64, frames: u32 },
    /// Plays once from the entity's creation time, then has no more frames
    SingleShot { frame_ms: i64, frames: u32 },
    /// Middle frame at rest, offset toward either end by a tilt value
    Tilt { frame_ms: i64, frames: u32 },
}

impl Animation {
    pub fn frame_count(&self) -> u32 {
        match *self {
            Animation::Static => 1,
            Animation::Loop { frames, .. }
            | Animation::SingleShot { frames, .. }
            | Animation::Tilt { frames, .. } => frames.max(1),
        }
    }

    /// Full length of one pass through the frames
    pub fn total_ms(&self) -> i64 {
        match *self {
            Animation::Static => 0,
            Animation::Loop { frame_ms, .. }
            | Animation::SingleShot { frame_ms, .. }
            | Animation::Tilt { frame_ms, .. } => frame_ms * self.frame_count() as i64,
        }
    }

    /// Whether there is still a frame to show at `time` for a sprite started at `start`
    pub fn has_frame(&self, start: i64, time: i64) -> bool {
        match self {
            Animation::SingleShot { .. } => time < start + self.total_ms(),
            _ => true,
        }
    }

    /// Frame to draw at `time`. `tilt` is only used by [`Animation::Tilt`].
    pub fn frame_index(&self, start: i64, time: i64, tilt: i64) -> u32 {
        let last = self.frame_count() as i64 - 1;
        match *self {
            Animation::Static => 0,
            Animation::Loop { frame_ms, .. } => {
                let total = self.total_ms().max(1);
                (time.rem_euclid(total) / frame_ms.max(1)) as u32
            }
            Animation::SingleShot { frame_ms, .. } => {
                ((time - start).max(0) / frame_ms.max(1)).min(last) as u32
            }
            Animation::Tilt { .. } => {
                let mid = self.frame_count() as i64 / 2;
                (mid + tilt).clamp(0, last) as u32
            }
        }
    }
}

/// Immutable size and animation metadata shared by many entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub id: String,
    pub kind: PresentationKind,
    pub width: u32,
    pub height: u32,
    pub animation: Animation,
}

impl Presentation {
    pub fn new(
        id: &str,
        kind: PresentationKind,
        width: u32,
        height: u32,
        animation: Animation,
    ) -> Self {
        Self {
            id: id.to_string(),
            kind,
            width,
            height,
            animation,
        }
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64)
    }
}

/// Registry of presentations keyed by id, in registration order
#[derive(Debug, Clone, Default)]
pub struct PresentationCatalog {
    by_id: HashMap<String, Arc<Presentation>>,
    order: Vec<Arc<Presentation>>,
}

impl PresentationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a presentation; a later registration with the same id replaces it
    pub fn register(&mut self, presentation: Presentation) -> Arc<Presentation> {
        let presentation = Arc::new(presentation);
        if let Some(old) = self.by_id.insert(presentation.id.clone(), presentation.clone()) {
            self.order.retain(|p| !Arc::ptr_eq(p, &old));
        }
        self.order.push(presentation.clone());
        presentation
    }

    pub fn get(&self, id: &str) -> Result<Arc<Presentation>> {
        self.by_id
            .get(id)
            .cloned()
            .ok_or_else(|| SimError::UnknownPresentation(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All presentations of the given category, in registration order
    pub fn by_category(&self, category: Category) -> Vec<Arc<Presentation>> {
        self.order
            .iter()
            .filter(|p| p.category() == category)
            .cloned()
            .collect()
    }

    /// Presentations UFOs are drawn from
    pub fn ufos(&self) -> Vec<Arc<Presentation>> {
        self.by_category(Category::Ufo)
    }

    pub fn explosions(&self) -> Vec<Arc<Presentation>> {
        self.order
            .iter()
            .filter(|p| p.kind == PresentationKind::Explosion)
            .cloned()
            .collect()
    }

    /// The sprites shipped with the game
    pub fn standard() -> Self {
        use Animation::*;
        use PresentationKind::*;

        let sprites = [
            ("sun", Star, 80, 80, Static),
            ("planet", Planet, 32, 32, Static),
            ("earth", Planet, 40, 40, Loop { frame_ms: 50, frames: 256 }),
            ("moon", Moon, 24, 24, Loop { frame_ms: 160, frames: 19 }),
            ("explosion1", Explosion, 256, 256, SingleShot { frame_ms: 50, frames: 48 }),
            ("explosion2", Explosion, 192, 192, SingleShot { frame_ms: 50, frames: 64 }),
            ("rock1", Asteroid, 34, 34, Loop { frame_ms: 100, frames: 16 }),
            ("rock2", Asteroid, 34, 34, Loop { frame_ms: 100, frames: 16 }),
            ("rock3", Asteroid, 32, 32, Loop { frame_ms: 100, frames: 16 }),
            ("rock4", Asteroid, 32, 32, Loop { frame_ms: 100, frames: 16 }),
            ("rock5", Asteroid, 36, 36, Loop { frame_ms: 70, frames: 48 }),
            ("rock6", Asteroid, 36, 36, Loop { frame_ms: 70, frames: 48 }),
            ("blob1", SpaceBlob, 42, 42, Loop { frame_ms: 50, frames: 60 }),
            ("blob2", SpaceBlob, 38, 38, Loop { frame_ms: 50, frames: 60 }),
            ("ship1", AlienShip, 39, 28, Loop { frame_ms: 100, frames: 6 }),
            ("fighter", Fighter, 64, 64, Tilt { frame_ms: 100, frames: 7 }),
        ];

        let mut catalog = Self::new();
        for (id, kind, width, height, animation) in sprites {
            catalog.register(Presentation::new(id, kind, width, height, animation));
        }
        catalog
    }
}

//! Motion paths: where an entity is at a given tick time
//!
//! All variants except [`ControlPath`] are pure functions of time and (for
//! parent-relative paths) the parent's position in the current tick. Parents
//! are referenced by [`EntityId`] and looked up in the entity arena, which is
//! kept in insertion order; a parent is always inserted, and therefore
//! updated, before its dependents.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId};
use crate::settings::Settings;
use crate::{centering_offset, consts::CONTROL_SIDE_MARGIN, ellipse_point};

/// Steering direction for the control path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Evaluation order inside [`ControlPath::location`]
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }

    /// Unit step in screen coordinates (y grows downward)
    pub fn step(self) -> DVec2 {
        match self {
            Direction::Left => DVec2::NEG_X,
            Direction::Right => DVec2::X,
            Direction::Up => DVec2::NEG_Y,
            Direction::Down => DVec2::Y,
        }
    }
}

/// User-steered path. Each direction carries a "move until" deadline that the
/// host pushes forward while the direction is held.
#[derive(Debug, Clone)]
pub struct ControlPath {
    pos: DVec2,
    /// Pixels per evaluated tick
    speed: f64,
    reaction_ms: i64,
    min: DVec2,
    max: DVec2,
    move_until: [i64; 4],
    last_eval: Option<i64>,
}

impl ControlPath {
    pub fn new(start: DVec2, speed: f64, reaction_ms: i64, min: DVec2, max: DVec2) -> Self {
        Self {
            pos: start.clamp(min, max.max(min)),
            speed,
            reaction_ms,
            min,
            max: max.max(min),
            move_until: [i64::MIN; 4],
            last_eval: None,
        }
    }

    /// Fighter path: starts centered near the bottom edge, may advance further
    /// up the field than it may retreat.
    pub fn for_fighter(settings: &Settings, size: DVec2) -> Self {
        let start = DVec2::new(
            settings.width / 2.0 - size.x / 2.0,
            settings.height - settings.control_start_offset,
        );
        let min = DVec2::new(
            CONTROL_SIDE_MARGIN,
            (start.y - settings.control_forward_range).max(0.0),
        );
        let max = DVec2::new(
            settings.width - size.x - CONTROL_SIDE_MARGIN,
            (start.y + settings.control_backward_range).min(settings.height - size.y),
        );
        Self::new(
            start,
            settings.control_speed_per_tick(),
            settings.control_reaction_ms,
            min,
            max,
        )
    }

    /// Keep moving `direction` until `time + reaction delay`. With ticks
    /// shorter than the delay the path coasts `ceil(delay / tick) - 1` ticks
    /// after the direction is released.
    pub fn set_delta_stop_time(&mut self, time: i64, direction: Direction) {
        self.move_until[direction.index()] = time + self.reaction_ms;
    }

    pub fn is_moving(&self, time: i64, direction: Direction) -> bool {
        time < self.move_until[direction.index()]
    }

    pub fn position(&self) -> DVec2 {
        self.pos
    }

    /// Advance once per tick; repeated calls with the same time do not move again
    pub fn location(&mut self, time: i64) -> DVec2 {
        if self.last_eval == Some(time) {
            return self.pos;
        }
        self.last_eval = Some(time);

        for direction in Direction::ALL {
            if self.is_moving(time, direction) {
                self.pos = (self.pos + direction.step() * self.speed).clamp(self.min, self.max);
            }
        }
        self.pos
    }
}

/// One path per entity
#[derive(Debug, Clone)]
pub enum Path {
    /// Fixed point
    Stationary { point: DVec2 },
    /// Constant velocity in pixels/ms from `start` at `start_time`
    Linear {
        start: DVec2,
        velocity: DVec2,
        start_time: i64,
    },
    /// Ellipse around the parent's live position
    Elliptical {
        a: f64,
        b: f64,
        phase: f64,
        /// Radians per ms
        angular_velocity: f64,
        parent: EntityId,
    },
    /// Keeps the entity's box centered on the parent's box
    Piggyback { parent: EntityId, offset: DVec2 },
    Control(ControlPath),
}

impl Path {
    pub fn stationary(point: DVec2) -> Self {
        Path::Stationary { point }
    }

    pub fn linear(start: DVec2, velocity: DVec2, start_time: i64) -> Self {
        Path::Linear {
            start,
            velocity,
            start_time,
        }
    }

    pub fn elliptical(a: f64, b: f64, phase: f64, angular_velocity: f64, parent: EntityId) -> Self {
        Path::Elliptical {
            a,
            b,
            phase,
            angular_velocity,
            parent,
        }
    }

    /// Follow `parent`, centering a box of `size` on it
    pub fn piggyback(parent: &Entity, size: DVec2) -> Self {
        Path::Piggyback {
            parent: parent.id,
            offset: centering_offset(parent.size(), size),
        }
    }

    pub fn parent(&self) -> Option<EntityId> {
        match self {
            Path::Elliptical { parent, .. } | Path::Piggyback { parent, .. } => Some(*parent),
            _ => None,
        }
    }

    pub fn as_control_mut(&mut self) -> Option<&mut ControlPath> {
        match self {
            Path::Control(control) => Some(control),
            _ => None,
        }
    }

    /// Location at `time`. `entities` is the arena in insertion order.
    ///
    /// Returns `None` when the parent no longer exists; the caller keeps the
    /// entity where it was.
    pub fn location(&mut self, time: i64, entities: &[Entity]) -> Option<DVec2> {
        match self {
            Path::Stationary { point } => Some(*point),
            Path::Linear {
                start,
                velocity,
                start_time,
            } => Some(*start + *velocity * (time - *start_time) as f64),
            Path::Elliptical {
                a,
                b,
                phase,
                angular_velocity,
                parent,
            } => {
                let center = parent_pos(*parent, time, entities)?;
                let theta = (time as f64 * *angular_velocity) % TAU + *phase;
                Some(ellipse_point(center, *a, *b, theta))
            }
            Path::Piggyback { parent, offset } => {
                parent_pos(*parent, time, entities).map(|p| p + *offset)
            }
            Path::Control(control) => Some(control.location(time)),
        }
    }
}

fn parent_pos(parent: EntityId, time: i64, entities: &[Entity]) -> Option<DVec2> {
    let idx = entities.binary_search_by_key(&parent, |e| e.id).ok()?;
    let parent = &entities[idx];
    debug_assert_eq!(
        parent.updated_at(),
        Some(time),
        "parent {parent} evaluated before its update in this tick"
    );
    Some(parent.pos())
}

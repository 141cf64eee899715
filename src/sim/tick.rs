//! Fixed tick orchestration
//!
//! One call to [`tick`] runs a complete simulation step; nothing is left half
//! done between calls.

use serde::{Deserialize, Serialize};

use super::path::Direction;
use super::state::GameState;

/// Held movement directions, polled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl TickInput {
    pub fn held(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.is_held(*d))
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }
}

/// Advance the game to `time` (milliseconds, monotonically increasing)
///
/// Order: input -> paths -> retirement -> collisions -> UFO spawn -> respawn.
pub fn tick(state: &mut GameState, input: &TickInput, time: i64) {
    if let Some(control) = state.control_path_mut() {
        for direction in input.held() {
            control.set_delta_stop_time(time, direction);
        }
    }

    state.update(time);
    state.retire(time);
    state.resolve_collisions(time);
    state.spawn_ufos(time);
    state.respawn_player(time);
}

//! Collision detection between sprite boxes
//!
//! Two phases: a cheap axis-aligned box test, then a circular test that trims
//! the corners of non-square sprites. A hit is recorded in a [`CollisionMap`]
//! and stays there until the boxes separate, so one overlap produces one event.

use std::collections::BTreeMap;

use glam::DVec2;

use super::entity::EntityId;

/// Axis-aligned sprite box, anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub pos: DVec2,
    pub size: DVec2,
}

impl Hitbox {
    pub fn new(pos: DVec2, size: DVec2) -> Self {
        Self { pos, size }
    }

    pub fn center(&self) -> DVec2 {
        self.pos + self.size / 2.0
    }

    /// Diameter of the circle used by [`clip_circle`]
    pub fn diameter(&self) -> f64 {
        self.size.x.max(self.size.y)
    }
}

/// Overlap along one axis. The box further along the axis is clipped when
/// the gap is smaller than the *nearer* box's extent.
#[inline]
fn axis_clips(a: f64, a_len: f64, b: f64, b_len: f64) -> bool {
    if a < b { b - a < a_len } else { a - b < b_len }
}

/// Bounding-box test; both axes must overlap
pub fn clip_box(a: &Hitbox, b: &Hitbox) -> bool {
    axis_clips(a.pos.x, a.size.x, b.pos.x, b.size.x)
        && axis_clips(a.pos.y, a.size.y, b.pos.y, b.size.y)
}

/// Circle test: each box is treated as a circle of diameter `max(w, h)`
pub fn clip_circle(a: &Hitbox, b: &Hitbox) -> bool {
    let reach = (a.diameter() + b.diameter()) / 2.0;
    a.center().distance_squared(b.center()) < reach * reach
}

/// Full test, box first
pub fn clip(a: &Hitbox, b: &Hitbox) -> bool {
    clip_box(a, b) && clip_circle(a, b)
}

/// Pairs currently judged "in collision": initiator -> struck entity.
///
/// An entry is dropped only when the pair's boxes no longer overlap (or one
/// side is removed from the game).
#[derive(Debug, Clone, Default)]
pub struct CollisionMap {
    pairs: BTreeMap<EntityId, EntityId>,
}

impl CollisionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, initiator: EntityId, target: EntityId) {
        self.pairs.insert(initiator, target);
    }

    /// Whether `initiator` is already clipping something
    pub fn contains(&self, initiator: EntityId) -> bool {
        self.pairs.contains_key(&initiator)
    }

    pub fn target_of(&self, initiator: EntityId) -> Option<EntityId> {
        self.pairs.get(&initiator).copied()
    }

    /// Drop every pair whose boxes stopped overlapping. `boxes` yields the
    /// current hitbox of an entity, or `None` when it no longer exists.
    /// Returns the dropped pairs.
    pub fn prune<F>(&mut self, mut boxes: F) -> Vec<(EntityId, EntityId)>
    where
        F: FnMut(EntityId) -> Option<Hitbox>,
    {
        let mut dropped = Vec::new();
        self.pairs.retain(|&a, &mut b| {
            let keep = match (boxes(a), boxes(b)) {
                (Some(ha), Some(hb)) => clip_box(&ha, &hb),
                _ => false,
            };
            if !keep {
                dropped.push((a, b));
            }
            keep
        });
        dropped
    }

    /// Forget an entity on either side of any pair
    pub fn remove_entity(&mut self, id: EntityId) {
        self.pairs.remove(&id);
        self.pairs.retain(|_, target| *target != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, len: f64) -> Hitbox {
        Hitbox::new(DVec2::new(x, y), DVec2::splat(len))
    }

    #[test]
    fn test_clip_box_overlap_and_separation() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        assert!(clip_box(&a, &b));
        assert!(clip_box(&b, &a));

        let b = square(11.0, 5.0, 10.0);
        assert!(!clip_box(&a, &b));
        assert!(!clip_box(&b, &a));
    }

    #[test]
    fn test_clip_box_uses_nearer_width() {
        // Wide box on the left reaches a narrow box on the right
        let wide = Hitbox::new(DVec2::new(0.0, 0.0), DVec2::new(50.0, 10.0));
        let narrow = Hitbox::new(DVec2::new(40.0, 0.0), DVec2::new(5.0, 10.0));
        assert!(clip_box(&wide, &narrow));
        assert!(clip_box(&narrow, &wide));

        // Narrow box on the left does not reach
        let narrow = Hitbox::new(DVec2::new(0.0, 0.0), DVec2::new(5.0, 10.0));
        let wide = Hitbox::new(DVec2::new(6.0, 0.0), DVec2::new(50.0, 10.0));
        assert!(!clip_box(&narrow, &wide));
    }

    #[test]
    fn test_clip_box_touching_edges_do_not_clip() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(10.0, 0.0, 10.0);
        assert!(!clip_box(&a, &b));
    }

    #[test]
    fn test_circle_trims_corners() {
        // Boxes overlap only at the corners
        let a = square(0.0, 0.0, 10.0);
        let b = square(9.0, 9.0, 10.0);
        assert!(clip_box(&a, &b));
        // Centers are 9*sqrt(2) ~ 12.7 apart, reach is 10
        assert!(!clip_circle(&a, &b));
        assert!(!clip(&a, &b));

        let b = square(5.0, 5.0, 10.0);
        assert!(clip(&a, &b));
    }

    #[test]
    fn test_collision_map_prune() {
        let mut map = CollisionMap::new();
        map.record(EntityId(1), EntityId(2));
        map.record(EntityId(3), EntityId(2));
        assert!(map.contains(EntityId(1)));
        assert!(!map.contains(EntityId(2)));

        let dropped = map.prune(|id| match id.0 {
            1 => Some(square(0.0, 0.0, 10.0)),
            2 => Some(square(5.0, 5.0, 10.0)),
            3 => Some(square(100.0, 100.0, 10.0)),
            _ => None,
        });
        assert_eq!(dropped, vec![(EntityId(3), EntityId(2))]);
        assert!(map.contains(EntityId(1)));
        assert!(!map.contains(EntityId(3)));
    }

    #[test]
    fn test_collision_map_prune_missing_entity() {
        let mut map = CollisionMap::new();
        map.record(EntityId(1), EntityId(2));
        let dropped = map.prune(|id| (id.0 == 1).then(|| square(0.0, 0.0, 10.0)));
        assert_eq!(dropped, vec![(EntityId(1), EntityId(2))]);
        assert!(!map.contains(EntityId(1)));
    }

    #[test]
    fn test_remove_entity_both_sides() {
        let mut map = CollisionMap::new();
        map.record(EntityId(1), EntityId(2));
        map.record(EntityId(3), EntityId(1));
        map.record(EntityId(4), EntityId(5));
        map.remove_entity(EntityId(1));
        assert!(!map.contains(EntityId(1)));
        assert!(!map.contains(EntityId(3)));
        assert_eq!(map.target_of(EntityId(4)), Some(EntityId(5)));
    }
}

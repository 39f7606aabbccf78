//! Capacity-bounded obstacle registry
//!
//! Populated once per level by the host; read every frame by visibility and
//! collision. Appends past capacity are dropped, and the batch report says how
//! many.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_OBSTACLES, OBSTACLE_STRIDE};

/// A world obstacle (tree, rock, pylon...)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Caller-assigned identity
    pub id: i32,
    /// World position (map units)
    pub pos: Vec2,
    pub radius: f32,
    pub height: f32,
    /// Host-defined sprite/kind tag
    pub kind: i32,
}

impl Obstacle {
    pub fn new(id: i32, pos: Vec2, radius: f32, height: f32, kind: i32) -> Self {
        Self {
            id,
            pos,
            radius,
            height,
            kind,
        }
    }

    /// Decode one `(x, y, radius, height, id, type)` record
    ///
    /// Id and type are stored as floats by the host and truncate toward zero.
    #[inline]
    pub fn from_record(record: &[f32; OBSTACLE_STRIDE]) -> Self {
        let [x, y, radius, height, id, kind] = *record;
        Self {
            id: id as i32,
            pos: Vec2::new(x, y),
            radius,
            height,
            kind: kind as i32,
        }
    }
}

/// Outcome of a batch append
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    /// Records offered by the caller
    pub requested: usize,
    /// Records stored
    pub accepted: usize,
}

impl BatchReport {
    /// Records dropped because the registry was full
    #[inline]
    pub fn dropped(&self) -> usize {
        self.requested - self.accepted
    }

    #[inline]
    pub fn truncated(&self) -> bool {
        self.accepted < self.requested
    }
}

/// Fixed-capacity obstacle storage
#[derive(Debug, Clone)]
pub struct ObstacleStore {
    obstacles: Vec<Obstacle>,
    capacity: usize,
}

impl Default for ObstacleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleStore {
    /// Store with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(MAX_OBSTACLES)
    }

    /// Store holding at most `capacity` obstacles, preallocated
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            obstacles: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Remove all obstacles (level start)
    pub fn reset(&mut self) {
        self.obstacles.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.obstacles.len()
    }

    /// Add one obstacle; returns false when full
    pub fn push(&mut self, obstacle: Obstacle) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        self.obstacles.push(obstacle);
        true
    }

    /// Append obstacles in order until full
    pub fn extend<I>(&mut self, obstacles: I) -> BatchReport
    where
        I: IntoIterator<Item = Obstacle>,
    {
        let mut report = BatchReport::default();
        for obstacle in obstacles {
            report.requested += 1;
            if self.push(obstacle) {
                report.accepted += 1;
            }
        }
        report
    }

    /// Append `count` flat records of stride 6
    ///
    /// `count` is clamped to the whole records present in `data`.
    pub fn append_batch(&mut self, data: &[f32], count: usize) -> BatchReport {
        let available = data.len() / OBSTACLE_STRIDE;
        if count > available {
            log::warn!(
                "Obstacle batch claims {} records but holds {}",
                count,
                available
            );
        }
        let requested = count.min(available);
        let accepted = requested.min(self.remaining());

        // Whole records only, so the cast cannot fail
        let records: &[[f32; OBSTACLE_STRIDE]] =
            bytemuck::cast_slice(&data[..accepted * OBSTACLE_STRIDE]);
        self.obstacles
            .extend(records.iter().map(Obstacle::from_record));

        let report = BatchReport {
            requested,
            accepted,
        };
        if report.truncated() {
            log::warn!(
                "Obstacle registry full ({}): dropped {} of {} records",
                self.capacity,
                report.dropped(),
                requested
            );
        }
        report
    }

    #[inline]
    pub fn as_slice(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Obstacle> {
        self.obstacles.iter()
    }

    /// Look up an obstacle by its caller-assigned id
    pub fn find(&self, id: i32) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }
}

impl<'a> IntoIterator for &'a ObstacleStore {
    type Item = &'a Obstacle;
    type IntoIter = std::slice::Iter<'a, Obstacle>;

    fn into_iter(self) -> Self::IntoIter {
        self.obstacles.iter()
    }
}

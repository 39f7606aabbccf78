//! World obstacles: registry, visibility and collision
//!
//! The map is a torus: every distance here takes the shortest path across
//! the wrap seams.

pub mod collision;
pub mod obstacle;
pub mod visibility;

pub use collision::{check_collision, first_collision, toroidal_offset};
pub use obstacle::{BatchReport, Obstacle, ObstacleStore};
pub use visibility::{ViewQuery, VisibilityProcessor, VisibleObstacle, VisibleSet, write_records};

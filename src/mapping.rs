//! Coordinate and geometry mapping between the tabletop frame and the scene frame.
//!
//! Source positions are measured in pixel-like units from the top-left corner
//! of the table, with `y` growing downwards. The scene frame is metric, `y` up,
//! and `-z` pointing towards the bottom edge of the table. Sizes in the source
//! are measured in grid cells.
//!
//! All functions here are pure and infallible.

use cgmath::{Vector2, Vector3};

/// Scene metres per source position unit (50 units make one grid cell).
pub const POSITION_SCALE: f32 = 0.02;

/// Scene metres per grid cell.
pub const SIZE_SCALE: f32 = 1.0;

/// Map a source position onto the scene plane (`y = 0`).
pub fn to_center_position(x: f32, y: f32) -> Vector3<f32> {
    Vector3::new(x * POSITION_SCALE, 0.0, -y * POSITION_SCALE)
}

/// Map a source size (grid cells) to a scene length.
pub fn to_uniform_scale(size: f32) -> f32 {
    size * SIZE_SCALE
}

/// Shift an edge-anchored position to the center of a `width` x `height`
/// footprint. The footprint is already in scene units.
///
/// Converters call this exactly once per object.
pub fn edge_to_center(position: Vector3<f32>, width: f32, height: f32) -> Vector3<f32> {
    position + Vector3::new(width / 2.0, 0.0, -height / 2.0)
}

/// Footprint of a `width` x `height` source rectangle in scene units.
pub fn footprint(width: f32, height: f32) -> Vector2<f32> {
    Vector2::new(to_uniform_scale(width), to_uniform_scale(height))
}

//! Model-space locations of sensors and mesh vertices, and the offsets applied to them.
//!
//! World axes: X across the skid, Y up, Z along the shaft line.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Unit direction of positive axial motion (along the shaft).
pub const AXIAL_PLUS: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);

/// Unit direction of positive vertical motion.
///
/// Vertical readings are taken positive downward, so this points against world up.
pub const VERTICAL_PLUS: Vector3<f64> = Vector3::new(0.0, -1.0, 0.0);

/// Unit direction of positive horizontal motion.
pub const HORIZONTAL_PLUS: Vector3<f64> = Vector3::new(1.0, 0.0, 0.0);

/// Location of a measurement point, anchor bolt or mesh vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Lateral offset from the shaft line.
    pub x: f64,
    /// Height above the skid base.
    pub y: f64,
    /// Position along the shaft line.
    pub z: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance, as used by the inverse-distance weights.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Footprint distance in the X-Z plane, ignoring height.
    ///
    /// Anchor bolts pin the base by footprint, so a vertex directly above a bolt is
    /// treated as sitting on it.
    #[must_use]
    pub fn plan_distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.z - other.z)
    }
}

/// Offset of a vertex from its rest pose, in model units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Displacement {
    /// Lateral offset.
    pub x: f64,
    /// Vertical offset, positive up.
    pub y: f64,
    /// Offset along the shaft line.
    pub z: f64,
}

impl Displacement {
    /// Create a [`Displacement`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The offset as a vector, for scaling and summing.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Length of the offset; drives the heat-map colour.
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.to_vector().norm()
    }
}

impl From<Vector3<f64>> for Displacement {
    fn from(value: Vector3<f64>) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

/// Shorthand for [`Point::new`], usable in `const` tables.
///
/// # Examples
/// ```
/// use odsx::point;
///
/// let motor_de = point(0.0, 1.95, 1.0);
/// assert_eq!(motor_de.y, 1.95);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64, z: f64) -> Point {
    Point::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::field::{ANCHOR_RADIUS, SKID_ANCHORS};

    #[test]
    fn vertex_above_a_bolt_sits_on_it_in_plan() {
        let bolt = SKID_ANCHORS[2];
        let above = point(bolt.x, 0.4, bolt.z);
        assert_relative_eq!(above.plan_distance_to(bolt), 0.0);
        assert_relative_eq!(above.distance_to(bolt), 0.4, epsilon = 1.0e-12);
    }

    #[test]
    fn edge_of_anchor_radius_along_the_shaft() {
        let bolt = SKID_ANCHORS[0];
        let edge = point(bolt.x, 0.0, bolt.z + ANCHOR_RADIUS);
        assert_relative_eq!(edge.plan_distance_to(bolt), ANCHOR_RADIUS);
        assert_relative_eq!(edge.distance_to(bolt), edge.plan_distance_to(bolt));
    }

    #[test]
    fn vertical_readings_move_the_mesh_down() {
        let offset = Displacement::from(VERTICAL_PLUS * 0.3);
        assert_relative_eq!(offset.y, -0.3);
        assert_relative_eq!(offset.magnitude(), 0.3);
        assert_eq!(Displacement::default().magnitude(), 0.0);
    }
}

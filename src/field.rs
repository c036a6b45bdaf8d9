//! Spatial displacement field used to deform the machine mesh.
//!
//! Point signals are blended with inverse-distance weighting. Geometry close to the
//! ground can additionally be pinned at the skid anchor bolts.

use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::geometry::{point, Displacement, Point, AXIAL_PLUS, HORIZONTAL_PLUS, VERTICAL_PLUS};
use crate::point::PointSet;
use crate::signal::{evaluate, Jitter};

/// Exponent of the inverse-distance weight.
pub const IDW_POWER: f64 = 3.5;
/// Regularizer added to the weighted distance so coincident points stay finite.
pub const IDW_EPSILON: f64 = 0.1;
/// Conversion from signal units to model-space displacement per unit gain.
pub const DISPLACEMENT_SCALE: f64 = 0.015;
/// Radius around an anchor bolt over which the base is stiffened.
pub const ANCHOR_RADIUS: f64 = 1.8;
/// Only geometry below this height is subject to anchoring.
pub const ANCHOR_HEIGHT_LIMIT: f64 = 0.5;
/// Above this vertex count the renderer should skip per-frame normal recomputation.
pub const NORMAL_RECOMPUTE_VERTEX_LIMIT: usize = 15_000;

/// Anchor bolt locations of the standard skid.
pub const SKID_ANCHORS: [Point; 6] = [
    point(1.4, 0.0, -1.5),
    point(-1.4, 0.0, -1.5),
    point(1.4, 0.0, 4.0),
    point(-1.4, 0.0, 4.0),
    point(1.4, 0.0, 9.5),
    point(-1.4, 0.0, 9.5),
];

/// Angular frequency in rad/s for a speed in RPM.
#[must_use]
pub fn angular_frequency(rpm: f64) -> f64 {
    rpm * 2.0 * PI / 60.0
}

/// Inverse-distance blend of a point set into a displacement at any location.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplacementField<'a> {
    /// Points whose signals are blended.
    points: &'a PointSet,
    /// Angular frequency of the animation in rad/s.
    omega: f64,
    /// User gain applied to every displacement.
    global_gain: f64,
    /// Noise perturbation policy.
    jitter: Jitter,
}

impl<'a> DisplacementField<'a> {
    /// Create a field over `points` animated at `animation_rpm`.
    #[must_use]
    pub fn new(points: &'a PointSet, animation_rpm: f64, global_gain: f64) -> Self {
        Self {
            points,
            omega: angular_frequency(animation_rpm),
            global_gain,
            jitter: Jitter::default(),
        }
    }

    /// Select how noise terms are perturbed.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Displacement at `position` and `time` without foundation anchoring.
    ///
    /// An empty point set yields the zero vector.
    ///
    /// # Examples
    /// ```
    /// use odsx::{point, DisplacementField, PointSet};
    ///
    /// let points = PointSet::motor_train();
    /// let field = DisplacementField::new(&points, 110.0, 10.0);
    /// let offset = field.displacement_at(point(0.0, 1.9, 1.0), 0.25);
    /// assert!(offset.magnitude() < 1.0);
    /// ```
    #[must_use]
    pub fn displacement_at(&self, position: Point, time: f64) -> Displacement {
        Displacement::from(self.blend(position, time) * self.global_gain * DISPLACEMENT_SCALE)
    }

    /// Displacement for base geometry bolted down at `anchors`.
    #[must_use]
    pub fn anchored_displacement_at(
        &self,
        position: Point,
        time: f64,
        anchors: &[Point],
    ) -> Displacement {
        let damping = anchor_damping(position, anchors);
        Displacement::from(
            self.blend(position, time) * self.global_gain * DISPLACEMENT_SCALE * damping,
        )
    }

    /// Weighted average of the axis signals before gain is applied.
    fn blend(&self, position: Point, time: f64) -> Vector3<f64> {
        let mut sum = Vector3::zeros();
        let mut total_weight = 0.0;
        for measurement in self.points {
            let distance = position.distance_to(measurement.position);
            let weight = 1.0 / (distance.powf(IDW_POWER) + IDW_EPSILON);
            let axial = evaluate(&measurement.axial, self.omega, time, self.jitter);
            let vertical = evaluate(&measurement.vertical, self.omega, time, self.jitter);
            let horizontal = evaluate(&measurement.horizontal, self.omega, time, self.jitter);
            sum += AXIAL_PLUS * (axial * weight)
                + VERTICAL_PLUS * (vertical * weight)
                + HORIZONTAL_PLUS * (horizontal * weight);
            total_weight += weight;
        }
        if total_weight > 0.0 {
            sum / total_weight
        } else {
            Vector3::zeros()
        }
    }
}

/// Stiffening factor in `[0, 1]` near anchor bolts.
///
/// Zero at a bolt centre, one beyond [`ANCHOR_RADIUS`] of every bolt or above
/// [`ANCHOR_HEIGHT_LIMIT`]. Distances are measured in the X-Z plane.
#[must_use]
pub fn anchor_damping(position: Point, anchors: &[Point]) -> f64 {
    if position.y >= ANCHOR_HEIGHT_LIMIT {
        return 1.0;
    }
    anchors
        .iter()
        .map(|anchor| {
            let d = (position.plan_distance_to(*anchor) / ANCHOR_RADIUS).clamp(0.0, 1.0);
            d * d * (3.0 - 2.0 * d)
        })
        .fold(1.0, f64::min)
}

/// Normalized heat-map intensity in `[0, 1]` for a displacement magnitude.
#[must_use]
pub fn heat_intensity(displacement: Displacement, global_gain: f64) -> f64 {
    let full_scale = (global_gain * 0.025).max(0.01);
    (displacement.magnitude() / full_scale).min(1.0)
}

/// Blue to red RGB color for a heat-map intensity.
///
/// The hue runs from 0.66 (blue) at zero to 0 (red) at full scale with full
/// saturation and half lightness.
#[must_use]
pub fn heat_color(intensity: f64) -> [f32; 3] {
    let t = intensity.clamp(0.0, 1.0);
    hsl_to_rgb(0.66 * (1.0 - t), 1.0, 0.5)
}

/// Standard HSL to RGB conversion with all channels in `[0, 1]`.
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [f32; 3] {
    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;
    let channel = |offset: f64| {
        let mut t = hue + offset;
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        let value = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        value as f32
    };
    [channel(1.0 / 3.0), channel(0.0), channel(-1.0 / 3.0)]
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::point::{MeasurementPoint, Rig};
    use crate::signal::VibrationComponent;

    fn single_point(horizontal: f64) -> PointSet {
        let mut measurement = MeasurementPoint::new("a", "A", point(0.0, 1.0, 0.0));
        measurement.horizontal = VibrationComponent::new(horizontal, 0.0);
        PointSet::new(Rig::Deflection, vec![measurement], "a").expect("unique ids")
    }

    #[test]
    fn empty_set_yields_zero() {
        let points = PointSet::new(Rig::Deflection, Vec::new(), "m-de").expect("no points");
        let field = DisplacementField::new(&points, 110.0, 10.0);
        for time in [0.0, 0.3, 17.0] {
            assert_eq!(
                field.displacement_at(point(1.0, 2.0, 3.0), time),
                Displacement::default()
            );
        }
    }

    #[test]
    fn single_point_field_is_uniform() {
        let points = single_point(4.0);
        let field = DisplacementField::new(&points, 60.0, 10.0).with_jitter(Jitter::Off);
        // A quarter revolution at 60 RPM puts the fundamental at its peak.
        let near = field.displacement_at(point(0.0, 1.0, 0.0), 0.25);
        let far = field.displacement_at(point(5.0, 3.0, -2.0), 0.25);
        assert_relative_eq!(near.x, 4.0 * 10.0 * DISPLACEMENT_SCALE, epsilon = 1.0e-12);
        assert_relative_eq!(far.x, near.x, epsilon = 1.0e-12);
        assert_eq!(near.y, 0.0);
    }

    #[test]
    fn vertical_signal_moves_down() {
        let mut measurement = MeasurementPoint::new("a", "A", point(0.0, 1.0, 0.0));
        measurement.vertical = VibrationComponent::new(2.0, 90.0);
        let points = PointSet::new(Rig::Deflection, vec![measurement], "a").expect("unique ids");
        let field = DisplacementField::new(&points, 60.0, 10.0).with_jitter(Jitter::Off);
        let offset = field.displacement_at(point(0.0, 1.0, 0.0), 0.0);
        assert!(offset.y < 0.0);
    }

    #[test]
    fn scales_linearly_with_gain() {
        let points = PointSet::motor_train();
        let position = point(0.3, 1.2, 2.0);
        let base = DisplacementField::new(&points, 110.0, 1.0)
            .with_jitter(Jitter::Off)
            .displacement_at(position, 0.4);
        let tripled = DisplacementField::new(&points, 110.0, 3.0)
            .with_jitter(Jitter::Off)
            .displacement_at(position, 0.4);
        assert_relative_eq!(tripled.x, base.x * 3.0, epsilon = 1.0e-12);
        assert_relative_eq!(tripled.y, base.y * 3.0, epsilon = 1.0e-12);
        assert_relative_eq!(tripled.z, base.z * 3.0, epsilon = 1.0e-12);
    }

    #[test]
    fn anchors_pin_the_base() {
        assert_relative_eq!(anchor_damping(point(1.4, 0.0, 4.0), &SKID_ANCHORS), 0.0);
        assert_relative_eq!(anchor_damping(point(0.0, 0.0, 20.0), &SKID_ANCHORS), 1.0);
        assert_relative_eq!(anchor_damping(point(1.4, 2.0, 4.0), &SKID_ANCHORS), 1.0);
        let halfway = anchor_damping(point(1.4, 0.0, 4.0 + ANCHOR_RADIUS / 2.0), &SKID_ANCHORS);
        assert_relative_eq!(halfway, 0.5, epsilon = 1.0e-12);

        let points = single_point(4.0);
        let field = DisplacementField::new(&points, 60.0, 10.0).with_jitter(Jitter::Off);
        let pinned = field.anchored_displacement_at(point(-1.4, 0.1, -1.5), 0.0, &SKID_ANCHORS);
        assert_eq!(pinned.magnitude(), 0.0);
    }

    #[test]
    fn heat_map_saturates_red() {
        assert_relative_eq!(heat_intensity(Displacement::new(1.0, 0.0, 0.0), 10.0), 1.0);
        assert_relative_eq!(heat_intensity(Displacement::new(0.125, 0.0, 0.0), 10.0), 0.5);
        let red = heat_color(1.0);
        assert_relative_eq!(red[0], 1.0, epsilon = 1.0e-6);
        assert_relative_eq!(red[2], 0.0, epsilon = 1.0e-6);
        let blue = heat_color(0.0);
        assert!(blue[2] > blue[0]);
    }
}

//! Phase reference engine.
//!
//! Horizontal phases carry the cross-machine timing relationship, so only they are
//! expressed relative to the reference point. Vertical and axial phases stay absolute.

use tracing::{debug, warn};

use crate::point::MeasurementPoint;

/// Identifier of the point used when the requested reference is absent.
pub const DEFAULT_REFERENCE_ID: &str = "m-de";

/// Wrap an angle in degrees into `[0, 360)`.
///
/// # Examples
/// ```
/// use odsx::wrap360;
///
/// assert_eq!(wrap360(-90.0), 270.0);
/// assert_eq!(wrap360(725.0), 5.0);
/// ```
#[must_use]
pub fn wrap360(degrees: f64) -> f64 {
    // The trailing `%` folds a tiny negative input that rounds to 360.0 back to zero.
    ((degrees % 360.0) + 360.0) % 360.0
}

/// Resolve the index of the reference point.
///
/// Falls back to [`DEFAULT_REFERENCE_ID`] and then to the first point; returns `None`
/// only for an empty slice.
#[must_use]
pub fn resolve_reference(points: &[MeasurementPoint], reference_id: &str) -> Option<usize> {
    if let Some(index) = points.iter().position(|p| p.id == reference_id) {
        return Some(index);
    }
    let fallback = points
        .iter()
        .position(|p| p.id == DEFAULT_REFERENCE_ID)
        .or(if points.is_empty() { None } else { Some(0) });
    if let Some(index) = fallback {
        warn!(
            requested = reference_id,
            fallback = points[index].id.as_str(),
            "phase reference not found, using fallback"
        );
    }
    fallback
}

/// Re-derive every relative phase against the reference point.
///
/// Returns the id of the reference that was actually used. Normalizing twice with the
/// same reference yields the same phases.
pub fn normalize(points: &mut [MeasurementPoint], reference_id: &str) -> Option<String> {
    let reference = resolve_reference(points, reference_id);
    let reference_phase = reference.map_or(0.0, |index| points[index].horizontal.measured_phase);
    for (index, point) in points.iter_mut().enumerate() {
        point.is_reference = Some(index) == reference;
        let horizontal = wrap360(point.horizontal.measured_phase - reference_phase);
        point.horizontal.set_relative_phase(horizontal);
        let vertical = wrap360(point.vertical.measured_phase);
        point.vertical.set_relative_phase(vertical);
        let axial = wrap360(point.axial.measured_phase);
        point.axial.set_relative_phase(axial);
    }
    reference.map(|index| points[index].id.clone())
}

/// Normalize a rig without a phase reference: every axis stays absolute.
pub fn normalize_absolute(points: &mut [MeasurementPoint]) {
    for point in points.iter_mut() {
        point.is_reference = false;
        for axis in crate::point::Axis::ALL {
            let component = point.component_mut(axis);
            let phase = wrap360(component.measured_phase);
            component.set_relative_phase(phase);
        }
    }
}

/// Permanently shift every horizontal measured phase so the new reference reads zero.
///
/// This rewrites the stored data rather than changing a view; callers must normalize
/// afterwards. Vertical and axial measured phases are left untouched.
pub fn rebase_reference(points: &mut [MeasurementPoint], reference_index: usize) {
    let offset = points[reference_index].horizontal.measured_phase;
    debug!(
        reference = points[reference_index].id.as_str(),
        offset, "rebasing horizontal measured phases"
    );
    for point in points.iter_mut() {
        point.horizontal.measured_phase = wrap360(point.horizontal.measured_phase - offset);
    }
}

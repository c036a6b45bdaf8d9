//! Measurement points and the point sets that make up each test rig.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::PointEditError;
use crate::geometry::{point, Point};
use crate::phase::{self, DEFAULT_REFERENCE_ID};
use crate::signal::VibrationComponent;

/// Identifier of the X proximity probe on the orbit rig.
pub const PROBE_X_ID: &str = "probe-x";
/// Identifier of the Y proximity probe on the orbit rig.
pub const PROBE_Y_ID: &str = "probe-y";
/// Identifier of the once-per-revolution keyphasor on the orbit rig.
pub const KEYPHASOR_ID: &str = "keyphasor";

/// Measurement direction at a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Vertical direction, positive downward.
    Vertical,
    /// Horizontal direction across the shaft.
    Horizontal,
    /// Direction along the shaft.
    Axial,
}

impl Axis {
    /// All axes in reporting order.
    pub const ALL: [Axis; 3] = [Axis::Vertical, Axis::Horizontal, Axis::Axial];

    /// Human readable name used in tables and reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Axis::Vertical => "Vertical",
            Axis::Horizontal => "Horizontal",
            Axis::Axial => "Axial",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which physical rig a point set describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rig {
    /// Motor, coupling and pump train used for deflection shapes.
    Deflection,
    /// Shaft with two orthogonal proximity probes and a keyphasor.
    Orbit,
}

/// A sensor location carrying one vibration signal per axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    /// Unique key within the point set.
    pub id: String,
    /// Display name.
    pub label: String,
    /// Location in model space.
    pub position: Point,
    /// Horizontal signal.
    pub horizontal: VibrationComponent,
    /// Vertical signal.
    pub vertical: VibrationComponent,
    /// Axial signal.
    pub axial: VibrationComponent,
    /// Set by the phase reference engine.
    #[serde(default)]
    pub(crate) is_reference: bool,
}

impl MeasurementPoint {
    /// Create a silent point at `position`.
    pub fn new(id: impl Into<String>, label: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            position,
            horizontal: VibrationComponent::default(),
            vertical: VibrationComponent::default(),
            axial: VibrationComponent::default(),
            is_reference: false,
        }
    }

    /// Whether this point is the active phase reference.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.is_reference
    }

    /// Signal along `axis`.
    #[must_use]
    pub fn component(&self, axis: Axis) -> &VibrationComponent {
        match axis {
            Axis::Vertical => &self.vertical,
            Axis::Horizontal => &self.horizontal,
            Axis::Axial => &self.axial,
        }
    }

    /// Mutable signal along `axis`.
    pub fn component_mut(&mut self, axis: Axis) -> &mut VibrationComponent {
        match axis {
            Axis::Vertical => &mut self.vertical,
            Axis::Horizontal => &mut self.horizontal,
            Axis::Axial => &mut self.axial,
        }
    }

    /// Builder used by the standard rigs.
    fn with_signals(
        mut self,
        horizontal: VibrationComponent,
        vertical: VibrationComponent,
        axial: VibrationComponent,
    ) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self.axial = axial;
        self
    }
}

/// Ordered collection of measurement points for one rig.
///
/// Every mutation goes through the set so relative phases are re-derived before the
/// next read.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSet {
    /// Rig the points belong to.
    rig: Rig,
    /// Points in display order.
    points: Vec<MeasurementPoint>,
    /// Id of the active phase reference.
    reference_id: String,
}

impl PointSet {
    /// Build a point set and normalize its phases.
    ///
    /// For the deflection rig `reference_id` selects the phase reference (with the usual
    /// fallbacks); the orbit rig ignores it.
    ///
    /// # Errors
    ///
    /// Returns [`PointEditError::DuplicatePoint`] when two points share an id.
    pub fn new(
        rig: Rig,
        points: Vec<MeasurementPoint>,
        reference_id: impl Into<String>,
    ) -> Result<Self, PointEditError> {
        let mut ids = HashSet::with_capacity(points.len());
        if let Some(duplicate) = points.iter().find(|p| !ids.insert(p.id.as_str())) {
            return Err(PointEditError::DuplicatePoint(duplicate.id.clone()));
        }
        Ok(Self::assemble(rig, points, reference_id))
    }

    /// Build from points whose ids are known to be unique.
    fn assemble(rig: Rig, points: Vec<MeasurementPoint>, reference_id: impl Into<String>) -> Self {
        let mut set = Self {
            rig,
            points,
            reference_id: reference_id.into(),
        };
        set.normalize();
        set
    }

    /// The standard motor-coupling-pump train with its nominal manual signals.
    ///
    /// # Examples
    /// ```
    /// use odsx::PointSet;
    ///
    /// let points = PointSet::motor_train();
    /// assert_eq!(points.len(), 8);
    /// assert_eq!(points.reference_id(), "m-de");
    /// ```
    #[must_use]
    pub fn motor_train() -> Self {
        let nominal = |id: &str, label: &str, position: Point| {
            MeasurementPoint::new(id, label, position).with_signals(
                VibrationComponent::new(0.2, 0.0),
                VibrationComponent::new(0.1, 0.0),
                VibrationComponent::new(0.1, 0.0),
            )
        };
        let points = vec![
            nominal("m-foot-de-l", "Motor Foot DE-L", point(0.6, 0.2, 0.8)),
            nominal("m-foot-de-r", "Motor Foot DE-R", point(-0.6, 0.2, 0.8)),
            nominal("m-foot-nde-l", "Motor Foot NDE-L", point(0.6, 0.2, -0.8)),
            nominal("m-foot-nde-r", "Motor Foot NDE-R", point(-0.6, 0.2, -0.8)),
            nominal("m-nde", "Motor NDE Brg", point(0.0, 1.95, -0.8)),
            nominal(DEFAULT_REFERENCE_ID, "Motor DE Brg", point(0.0, 1.95, 1.0)),
            nominal("p-de", "Pump Inboard Brg", point(0.0, 1.35, 5.5)),
            nominal("p-nde", "Pump Outboard Brg", point(0.0, 1.35, 6.5)),
        ];
        Self::assemble(Rig::Deflection, points, DEFAULT_REFERENCE_ID)
    }

    /// The shaft rig with two probes 90 degrees apart and a keyphasor.
    #[must_use]
    pub fn orbit_rig() -> Self {
        let silent = VibrationComponent::default;
        let points = vec![
            MeasurementPoint::new(PROBE_X_ID, "Probe X", point(1.0, 1.0, 0.0)).with_signals(
                VibrationComponent::new(10.0, 0.0),
                silent(),
                silent(),
            ),
            MeasurementPoint::new(PROBE_Y_ID, "Probe Y", point(-1.0, 1.0, 0.0)).with_signals(
                VibrationComponent::new(10.0, 90.0),
                silent(),
                silent(),
            ),
            MeasurementPoint::new(KEYPHASOR_ID, "Keyphasor", point(0.0, 1.5, -0.5)),
        ];
        Self::assemble(Rig::Orbit, points, "")
    }

    /// Rig described by this set.
    #[must_use]
    pub fn rig(&self) -> Rig {
        self.rig
    }

    /// Number of points in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in display order.
    #[must_use]
    pub fn points(&self) -> &[MeasurementPoint] {
        &self.points
    }

    /// Iterate over the points in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, MeasurementPoint> {
        self.points.iter()
    }

    /// Look up a point by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MeasurementPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    /// Id of the active phase reference; empty for the orbit rig.
    #[must_use]
    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    /// The point currently flagged as phase reference.
    #[must_use]
    pub fn reference(&self) -> Option<&MeasurementPoint> {
        self.points.iter().find(|p| p.is_reference)
    }

    /// Edit a single point and re-derive relative phases.
    ///
    /// Signals and the label may change. The edit is discarded if it touches the id or
    /// the position.
    ///
    /// # Errors
    ///
    /// Returns [`PointEditError::UnknownPoint`] when `id` is not part of this set and
    /// [`PointEditError::FixedField`] when the edit renames or moves the point.
    ///
    /// # Examples
    /// ```
    /// use odsx::PointSet;
    ///
    /// let mut points = PointSet::motor_train();
    /// points
    ///     .update_point("p-de", |p| p.horizontal.measured_phase = 400.0)
    ///     .expect("known point");
    /// let pump = points.get("p-de").expect("pump bearing");
    /// assert!((pump.horizontal.relative_phase() - 40.0).abs() < 1.0e-9);
    /// ```
    pub fn update_point<F>(&mut self, id: &str, edit: F) -> Result<(), PointEditError>
    where
        F: FnOnce(&mut MeasurementPoint),
    {
        let point = self
            .points
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PointEditError::UnknownPoint(id.to_string()))?;
        let mut edited = point.clone();
        edit(&mut edited);
        let fixed = if edited.id != point.id {
            Some("id")
        } else if edited.position != point.position {
            Some("position")
        } else {
            None
        };
        if let Some(field) = fixed {
            return Err(PointEditError::FixedField {
                id: id.to_string(),
                field,
            });
        }
        *point = edited;
        self.normalize();
        Ok(())
    }

    /// Make `id` the phase reference.
    ///
    /// Every horizontal measured phase is permanently shifted so the new reference reads
    /// zero, then relative phases are re-derived.
    ///
    /// # Errors
    ///
    /// Returns [`PointEditError::ReferenceNotSupported`] on the orbit rig and
    /// [`PointEditError::UnknownPoint`] when `id` is not part of this set.
    pub fn set_reference(&mut self, id: &str) -> Result<(), PointEditError> {
        if self.rig == Rig::Orbit {
            return Err(PointEditError::ReferenceNotSupported);
        }
        let index = self
            .points
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PointEditError::UnknownPoint(id.to_string()))?;
        phase::rebase_reference(&mut self.points, index);
        self.reference_id = id.to_string();
        self.normalize();
        debug!(reference = id, "phase reference changed");
        Ok(())
    }

    /// Re-derive every relative phase. Idempotent.
    pub fn normalize(&mut self) {
        match self.rig {
            Rig::Deflection => {
                if let Some(used) = phase::normalize(&mut self.points, &self.reference_id) {
                    self.reference_id = used;
                }
            }
            Rig::Orbit => phase::normalize_absolute(&mut self.points),
        }
    }

    /// Mutable access for bulk rewrites; callers must normalize afterwards.
    pub(crate) fn points_mut(&mut self) -> &mut [MeasurementPoint] {
        &mut self.points
    }

    /// Replace the reference id without rebasing; callers must normalize afterwards.
    pub(crate) fn reset_reference(&mut self, id: &str) {
        self.reference_id = id.to_string();
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a MeasurementPoint;
    type IntoIter = std::slice::Iter<'a, MeasurementPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn motor_train_has_single_reference() {
        let points = PointSet::motor_train();
        assert_eq!(points.iter().filter(|p| p.is_reference()).count(), 1);
        assert_eq!(points.reference().map(|p| p.id.as_str()), Some("m-de"));
    }

    #[test]
    fn unknown_point_edits_are_rejected() {
        let mut points = PointSet::motor_train();
        let error = points
            .update_point("gearbox", |p| p.horizontal.amplitude = 1.0)
            .expect_err("unknown point rejected");
        assert_eq!(error, PointEditError::UnknownPoint("gearbox".to_string()));
    }

    #[test]
    fn reference_change_rewrites_measured_phases() {
        let mut points = PointSet::motor_train();
        points
            .update_point("p-de", |p| p.horizontal.measured_phase = 120.0)
            .expect("known point");
        points
            .update_point("m-de", |p| p.horizontal.measured_phase = 30.0)
            .expect("known point");
        points.set_reference("p-de").expect("known point");

        let motor = points.get("m-de").expect("motor bearing");
        let pump = points.get("p-de").expect("pump bearing");
        assert_relative_eq!(pump.horizontal.measured_phase, 0.0);
        assert_relative_eq!(motor.horizontal.measured_phase, 270.0);
        assert_relative_eq!(pump.horizontal.relative_phase(), 0.0);
        assert_relative_eq!(motor.horizontal.relative_phase(), 270.0);
        assert!(pump.is_reference());
        assert!(!motor.is_reference());
    }

    #[test]
    fn orbit_rig_is_absolute_and_has_no_reference() {
        let mut points = PointSet::orbit_rig();
        assert!(points.reference().is_none());
        let probe_y = points.get(PROBE_Y_ID).expect("probe y");
        assert_relative_eq!(probe_y.horizontal.relative_phase(), 90.0);
        assert_eq!(
            points.set_reference(PROBE_X_ID),
            Err(PointEditError::ReferenceNotSupported)
        );
    }

    #[test]
    fn edits_cannot_rename_or_move_a_point() {
        let mut points = PointSet::motor_train();
        let before = points.clone();
        let renamed = points.update_point("p-de", |p| {
            p.id = "m-de".to_string();
            p.horizontal.amplitude = 9.0;
        });
        assert_eq!(
            renamed,
            Err(PointEditError::FixedField {
                id: "p-de".to_string(),
                field: "id"
            })
        );
        let moved = points.update_point("p-de", |p| p.position.z += 1.0);
        assert!(matches!(
            moved,
            Err(PointEditError::FixedField {
                field: "position",
                ..
            })
        ));
        assert_eq!(points, before);

        points
            .update_point("p-de", |p| p.label = "Pump DE".to_string())
            .expect("labels are editable");
        assert_eq!(points.get("p-de").map(|p| p.label.as_str()), Some("Pump DE"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut points = PointSet::motor_train().points().to_vec();
        points[1].id = points[0].id.clone();
        let error = PointSet::new(Rig::Deflection, points, "m-de").expect_err("duplicate id");
        assert_eq!(error, PointEditError::DuplicatePoint("m-foot-de-l".to_string()));
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut points = PointSet::motor_train();
        points
            .update_point("m-nde", |p| p.horizontal.measured_phase = -45.0)
            .expect("known point");
        let once = points.clone();
        points.normalize();
        assert_eq!(points, once);
    }
}

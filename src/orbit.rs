//! Shaft centerline orbit from two orthogonal proximity probes.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::errors::OrbitPathError;
use crate::point::{PointSet, KEYPHASOR_ID, PROBE_X_ID, PROBE_Y_ID};
use crate::signal::{evaluate_angle, Jitter, OrderFilter, VibrationComponent};

/// Conversion from probe units to model-space displacement at a gain of 10.
pub const PROBE_SCALE: f64 = 0.005;
/// Conversion from a normalized traced orbit to model space at a gain of 10.
pub const CUSTOM_ORBIT_SCALE: f64 = 2.0;
/// Number of revolutions kept in the live trail.
pub const TRAIL_CYCLES: f64 = 3.0;
/// Maximum number of samples kept in the live trail.
pub const TRAIL_CAPACITY: usize = 2000;

/// Model-space scale applied to probe readings for a given gain.
#[must_use]
pub fn probe_scale(global_gain: f64) -> f64 {
    PROBE_SCALE * (global_gain / 10.0)
}

/// Position of the shaft centre in the probe plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitSample {
    /// Reading along the X probe.
    pub x: f64,
    /// Reading along the Y probe.
    pub y: f64,
}

impl OrbitSample {
    /// Create a sample from both probe readings.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Multiply both readings by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// The two probe signals and the keyphasor offset of an orbit rig.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitProbes<'a> {
    /// Signal seen by the X probe.
    pub x: &'a VibrationComponent,
    /// Signal seen by the Y probe.
    pub y: &'a VibrationComponent,
    /// Keyphasor measured phase in degrees.
    pub keyphasor_phase: f64,
}

impl<'a> OrbitProbes<'a> {
    /// Extract the probes from an orbit point set.
    ///
    /// Returns `None` when either probe is missing. A missing keyphasor reads as zero.
    #[must_use]
    pub fn from_points(points: &'a PointSet) -> Option<Self> {
        let x = &points.get(PROBE_X_ID)?.horizontal;
        let y = &points.get(PROBE_Y_ID)?.horizontal;
        let keyphasor_phase = points
            .get(KEYPHASOR_ID)
            .map_or(0.0, |keyphasor| keyphasor.horizontal.measured_phase);
        Some(Self {
            x,
            y,
            keyphasor_phase,
        })
    }

    /// Unscaled probe readings at shaft angle `theta`.
    ///
    /// # Examples
    /// ```
    /// use odsx::{Jitter, OrbitProbes, OrderFilter, PointSet};
    ///
    /// let points = PointSet::orbit_rig();
    /// let probes = OrbitProbes::from_points(&points).expect("probes present");
    /// let sample = probes.reading(0.0, OrderFilter::None, Jitter::Off);
    /// assert!(sample.x.abs() < 1.0e-12);
    /// assert!((sample.y - 10.0).abs() < 1.0e-12);
    /// ```
    #[must_use]
    pub fn reading(&self, theta: f64, filter: OrderFilter, jitter: Jitter) -> OrbitSample {
        OrbitSample::new(
            evaluate_angle(self.x, theta, filter, jitter),
            evaluate_angle(self.y, theta, filter, jitter),
        )
    }

    /// Model-space shaft offset at `theta` for the given gain.
    #[must_use]
    pub fn displacement(
        &self,
        theta: f64,
        filter: OrderFilter,
        global_gain: f64,
        jitter: Jitter,
    ) -> OrbitSample {
        self.reading(theta, filter, jitter)
            .scaled(probe_scale(global_gain))
    }

    /// Shaft angle at which the keyphasor fires within a revolution.
    #[must_use]
    pub fn trigger_angle(&self) -> f64 {
        -self.keyphasor_phase.to_radians()
    }

    /// Unscaled orbit position marked by the once-per-revolution trigger.
    #[must_use]
    pub fn trigger_reading(&self, filter: OrderFilter, jitter: Jitter) -> OrbitSample {
        self.reading(self.trigger_angle(), filter, jitter)
    }

    /// Closed orbit trace over `cycles` revolutions with `samples + 1` points.
    #[must_use]
    pub fn trace(
        &self,
        filter: OrderFilter,
        cycles: f64,
        samples: usize,
        jitter: Jitter,
    ) -> Vec<OrbitSample> {
        let samples = samples.max(1);
        let span = cycles * TAU;
        (0..=samples)
            .map(|step| {
                let theta = step as f64 / samples as f64 * span;
                self.reading(theta, filter, jitter)
            })
            .collect()
    }

    /// Largest possible probe excursion, used to autoscale orbit plots.
    #[must_use]
    pub fn peak_amplitude(&self) -> f64 {
        self.x.peak_amplitude().max(self.y.peak_amplitude())
    }
}

/// Orbit traced by hand from an image or a drawing, normalized to `[-1, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomOrbit {
    /// Closed polyline in revolution order.
    path: Vec<OrbitSample>,
    /// Free-form description of the shape.
    description: String,
}

impl CustomOrbit {
    /// Validate and store a traced orbit.
    ///
    /// # Errors
    ///
    /// Returns [`OrbitPathError::Empty`] for an empty path and
    /// [`OrbitPathError::NonFinite`] when a coordinate is NaN or infinite.
    pub fn new(
        path: Vec<OrbitSample>,
        description: impl Into<String>,
    ) -> Result<Self, OrbitPathError> {
        if path.is_empty() {
            return Err(OrbitPathError::Empty);
        }
        if let Some(index) = path
            .iter()
            .position(|sample| !sample.x.is_finite() || !sample.y.is_finite())
        {
            return Err(OrbitPathError::NonFinite { index });
        }
        Ok(Self {
            path,
            description: description.into(),
        })
    }

    /// Points of the traced polyline.
    #[must_use]
    pub fn path(&self) -> &[OrbitSample] {
        &self.path
    }

    /// Description supplied with the trace.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Traced point reached at shaft angle `theta`, before scaling.
    #[must_use]
    pub fn reading(&self, theta: f64) -> OrbitSample {
        let len = self.path.len();
        let phase = (theta.abs() / TAU) % 1.0;
        let index = ((phase * len as f64).floor() as usize) % len;
        self.path[index]
    }

    /// Model-space shaft offset at `theta` for the given gain.
    #[must_use]
    pub fn displacement(&self, theta: f64, global_gain: f64) -> OrbitSample {
        self.reading(theta)
            .scaled(CUSTOM_ORBIT_SCALE * (global_gain / 10.0))
    }
}

/// A time-stamped trail sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailSample {
    /// Shaft position.
    pub position: OrbitSample,
    /// Simulation time of the sample in seconds.
    pub time: f64,
}

/// Rolling history of recent shaft positions.
///
/// # Examples
/// ```
/// use odsx::{OrbitSample, OrbitTrail};
///
/// let mut trail = OrbitTrail::default();
/// trail.push(OrbitSample::new(0.1, 0.0), 0.0, 0.0);
/// assert_eq!(trail.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitTrail {
    /// Samples ordered oldest first.
    samples: VecDeque<TrailSample>,
    /// Revolutions to keep.
    cycles: f64,
    /// Hard cap on stored samples.
    capacity: usize,
}

impl Default for OrbitTrail {
    fn default() -> Self {
        Self::new(TRAIL_CYCLES, TRAIL_CAPACITY)
    }
}

impl OrbitTrail {
    /// Create an empty trail keeping `cycles` revolutions and at most `capacity` samples.
    #[must_use]
    pub fn new(cycles: f64, capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(TRAIL_CAPACITY)),
            cycles,
            capacity,
        }
    }

    /// Seconds of history kept at `rpm`. Speeds below 1 RPM count as 1 RPM.
    #[must_use]
    pub fn duration_to_keep(&self, rpm: f64) -> f64 {
        self.cycles * 60.0 / rpm.max(1.0)
    }

    /// Append a sample and drop everything outside the rolling window.
    pub fn push(&mut self, position: OrbitSample, time: f64, rpm: f64) {
        self.samples.push_back(TrailSample { position, time });
        let cutoff = time - self.duration_to_keep(rpm);
        while self
            .samples
            .front()
            .is_some_and(|oldest| oldest.time < cutoff)
        {
            self.samples.pop_front();
        }
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Forget every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of stored samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the trail is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples ordered oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TrailSample> {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;

    use super::*;
    use crate::signal::Harmonic;

    fn probes<'a>(x: &'a VibrationComponent, y: &'a VibrationComponent) -> OrbitProbes<'a> {
        OrbitProbes {
            x,
            y,
            keyphasor_phase: 0.0,
        }
    }

    #[test]
    fn band_pass_matches_low_pass_for_pure_fundamental() {
        let x = VibrationComponent::new(30.0, 15.0);
        let y = VibrationComponent::new(20.0, 105.0);
        let probes = probes(&x, &y);
        for step in 0..36 {
            let theta = f64::from(step) * 0.2;
            let band = probes.reading(theta, OrderFilter::BandPass(1.0), Jitter::Off);
            let low = probes.reading(theta, OrderFilter::LowPass(1.0), Jitter::Off);
            assert_relative_eq!(band.x, low.x, epsilon = 1.0e-12);
            assert_relative_eq!(band.y, low.y, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn band_pass_removes_sub_synchronous_whirl() {
        let whirl = vec![Harmonic::new(0.45, 0.8, 90.0)];
        let x = VibrationComponent::new(30.0, 0.0).with_harmonics(whirl.clone());
        let y = VibrationComponent::new(30.0, 90.0).with_harmonics(whirl);
        let probes = probes(&x, &y);
        let reading = probes.reading(FRAC_PI_2, OrderFilter::BandPass(1.0), Jitter::Off);
        assert_relative_eq!(reading.x, 30.0, epsilon = 1.0e-9);
        assert_relative_eq!(reading.y, 0.0, epsilon = 1.0e-9);
    }

    #[test]
    fn trigger_uses_keyphasor_offset() {
        let x = VibrationComponent::new(10.0, 0.0);
        let y = VibrationComponent::new(10.0, 90.0);
        let probes = OrbitProbes {
            x: &x,
            y: &y,
            keyphasor_phase: 90.0,
        };
        assert_relative_eq!(probes.trigger_angle(), -FRAC_PI_2);
        let mark = probes.trigger_reading(OrderFilter::None, Jitter::Off);
        assert_relative_eq!(mark.x, -10.0, epsilon = 1.0e-12);
        assert_relative_eq!(mark.y, 0.0, epsilon = 1.0e-12);
    }

    #[test]
    fn trace_closes_after_whole_revolutions() {
        let x = VibrationComponent::new(10.0, 0.0);
        let y = VibrationComponent::new(5.0, 90.0);
        let trace = probes(&x, &y).trace(OrderFilter::None, 2.0, 720, Jitter::Off);
        assert_eq!(trace.len(), 721);
        let first = trace[0];
        let last = trace[720];
        assert_relative_eq!(first.x, last.x, epsilon = 1.0e-9);
        assert_relative_eq!(first.y, last.y, epsilon = 1.0e-9);
    }

    #[test]
    fn custom_orbit_indexes_by_revolution_fraction() {
        let path = vec![
            OrbitSample::new(1.0, 0.0),
            OrbitSample::new(0.0, 1.0),
            OrbitSample::new(-1.0, 0.0),
            OrbitSample::new(0.0, -1.0),
        ];
        let orbit = CustomOrbit::new(path, "circle").expect("valid path");
        assert_eq!(orbit.reading(0.0), OrbitSample::new(1.0, 0.0));
        assert_eq!(orbit.reading(-PI), OrbitSample::new(-1.0, 0.0));
        assert_eq!(orbit.reading(-1.6 * PI), OrbitSample::new(0.0, -1.0));
        assert_eq!(orbit.reading(-2.0 * PI), OrbitSample::new(1.0, 0.0));
        let scaled = orbit.displacement(0.0, 20.0);
        assert_relative_eq!(scaled.x, 4.0);
    }

    #[test]
    fn custom_orbit_rejects_bad_paths() {
        assert_eq!(
            CustomOrbit::new(Vec::new(), "nothing"),
            Err(OrbitPathError::Empty)
        );
        let path = vec![OrbitSample::new(0.0, 0.0), OrbitSample::new(f64::NAN, 0.0)];
        assert_eq!(
            CustomOrbit::new(path, "broken"),
            Err(OrbitPathError::NonFinite { index: 1 })
        );
    }

    #[test]
    fn trail_keeps_three_revolutions() {
        let mut trail = OrbitTrail::default();
        // 60 RPM keeps three seconds.
        for step in 0..=40 {
            trail.push(OrbitSample::default(), f64::from(step) * 0.125, 60.0);
        }
        let oldest = trail.iter().next().expect("samples present").time;
        assert_relative_eq!(oldest, 2.0);
        assert_eq!(trail.len(), 25);
    }

    #[test]
    fn trail_is_capped_and_survives_zero_rpm() {
        let mut trail = OrbitTrail::new(3.0, 10);
        assert_relative_eq!(trail.duration_to_keep(0.0), 180.0);
        for step in 0..25 {
            trail.push(OrbitSample::default(), f64::from(step) * 0.01, 0.0);
        }
        assert_eq!(trail.len(), 10);
        trail.clear();
        assert!(trail.is_empty());
    }
}

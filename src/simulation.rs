//! Frame driver tying the clock, both rigs and the orbit trail together.

use tracing::{debug, info};

use crate::clock::{Frame, SimulationClock};
use crate::config::SimulationConfig;
use crate::errors::{ConfigError, PointEditError, TableError};
use crate::field::DisplacementField;
use crate::orbit::{CustomOrbit, OrbitProbes, OrbitSample, OrbitTrail};
use crate::point::{MeasurementPoint, PointSet, Rig};
use crate::presets::{DeflectionFault, Fault, OrbitFault};
use crate::report::{render_orbit_inspection, render_summary};
use crate::signal::{Jitter, OrderFilter};
use crate::table::{import_table, ImportSummary};

/// Revolutions shown in a static orbit plot.
pub const ORBIT_PLOT_CYCLES: f64 = 2.0;
/// Samples in a static orbit plot.
pub const ORBIT_PLOT_SAMPLES: usize = 720;

/// Owned state of one interactive session.
///
/// [`Simulation::advance`] is the only place time moves; every consumer of a frame
/// reads the same [`Frame`] afterwards.
///
/// # Examples
/// ```
/// use odsx::{OrbitFault, Simulation};
///
/// let mut simulation = Simulation::default();
/// simulation.apply_orbit_fault(OrbitFault::Unbalance);
/// let frame = simulation.advance(1.0 / 60.0);
/// assert!(frame.angle < 0.0);
/// assert_eq!(simulation.trail().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Simulation {
    /// Validated settings.
    config: SimulationConfig,
    /// Shared time base.
    clock: SimulationClock,
    /// Motor-coupling-pump train.
    deflection: PointSet,
    /// Shaft probes and keyphasor.
    orbit: PointSet,
    /// Traced orbit shown instead of the probe signals.
    custom_orbit: Option<CustomOrbit>,
    /// Recent shaft positions.
    trail: OrbitTrail,
    /// Last preset applied to the train.
    deflection_fault: DeflectionFault,
    /// Last preset applied to the shaft.
    orbit_fault: OrbitFault,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::build(SimulationConfig::default())
    }
}

impl Simulation {
    /// Start a session from a configuration, applying its start-up presets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the configuration fails validation.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Assemble a session without validating the configuration.
    fn build(config: SimulationConfig) -> Self {
        let mut simulation = Self {
            clock: SimulationClock::new(),
            deflection: PointSet::motor_train(),
            orbit: PointSet::orbit_rig(),
            custom_orbit: None,
            trail: OrbitTrail::new(config.trail_cycles, config.trail_capacity),
            deflection_fault: config.deflection_fault,
            orbit_fault: config.orbit_fault,
            config,
        };
        // The standard rigs already carry the manual signals.
        if simulation.deflection_fault != DeflectionFault::Manual {
            let context = simulation.config.preset_context();
            simulation.deflection_fault.apply(&mut simulation.deflection, &context);
        }
        if simulation.orbit_fault != OrbitFault::Manual {
            simulation.orbit_fault.apply(&mut simulation.orbit);
        }
        simulation
    }

    /// Advance the clock by `delta` seconds and record one trail sample.
    ///
    /// Nothing is recorded while paused.
    pub fn advance(&mut self, delta: f64) -> Frame {
        let before = self.clock.frame();
        let frame = self.clock.advance(delta, self.config.animation_rpm);
        if frame.time > before.time {
            let position = self.shaft_position(frame.angle);
            self.trail
                .push(position, frame.time, self.config.animation_rpm);
        }
        frame
    }

    /// Current frame without advancing.
    #[must_use]
    pub fn frame(&self) -> Frame {
        self.clock.frame()
    }

    /// Shared clock.
    #[must_use]
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Freeze time and shaft angle.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Resume from the frozen frame.
    pub fn play(&mut self) {
        self.clock.play();
    }

    /// Switch between playing and paused.
    pub fn toggle_play(&mut self) {
        self.clock.toggle();
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Points of the motor-coupling-pump train.
    #[must_use]
    pub fn deflection(&self) -> &PointSet {
        &self.deflection
    }

    /// Points of the shaft orbit rig.
    #[must_use]
    pub fn orbit(&self) -> &PointSet {
        &self.orbit
    }

    /// Point set of `rig`.
    #[must_use]
    pub fn points(&self, rig: Rig) -> &PointSet {
        match rig {
            Rig::Deflection => &self.deflection,
            Rig::Orbit => &self.orbit,
        }
    }

    /// Recent shaft positions.
    #[must_use]
    pub fn trail(&self) -> &OrbitTrail {
        &self.trail
    }

    /// Order filter applied to the orbit probes.
    #[must_use]
    pub fn order_filter(&self) -> OrderFilter {
        self.config.order_filter
    }

    /// Hand-traced orbit replacing the probe signals, if any.
    #[must_use]
    pub fn custom_orbit(&self) -> Option<&CustomOrbit> {
        self.custom_orbit.as_ref()
    }

    /// Last fault applied to the deflection rig.
    #[must_use]
    pub fn deflection_fault(&self) -> DeflectionFault {
        self.deflection_fault
    }

    /// Last fault applied to the orbit rig.
    #[must_use]
    pub fn orbit_fault(&self) -> OrbitFault {
        self.orbit_fault
    }

    /// Mesh displacement field over the deflection rig.
    #[must_use]
    pub fn displacement_field(&self) -> DisplacementField<'_> {
        DisplacementField::new(
            &self.deflection,
            self.config.animation_rpm,
            self.config.global_gain,
        )
        .with_jitter(self.config.jitter)
    }

    /// Model-space shaft offset at shaft angle `theta`.
    ///
    /// A custom orbit takes precedence over the probe signals.
    #[must_use]
    pub fn shaft_position(&self, theta: f64) -> OrbitSample {
        let gain = self.config.global_gain;
        if let Some(custom) = &self.custom_orbit {
            return custom.displacement(theta, gain);
        }
        OrbitProbes::from_points(&self.orbit).map_or_else(OrbitSample::default, |probes| {
            probes.displacement(theta, self.config.order_filter, gain, self.config.jitter)
        })
    }

    /// Model-space position of the once-per-revolution trigger mark on the probe orbit.
    ///
    /// `None` while a custom orbit is shown, since a traced path has no keyphasor.
    #[must_use]
    pub fn trigger_position(&self) -> Option<OrbitSample> {
        if self.custom_orbit.is_some() {
            return None;
        }
        OrbitProbes::from_points(&self.orbit).map(|probes| {
            probes.displacement(
                probes.trigger_angle(),
                self.config.order_filter,
                self.config.global_gain,
                Jitter::Off,
            )
        })
    }

    /// Static orbit plot of the probes through the active filter, in probe units.
    ///
    /// Noise is left out so the plot shows the periodic shape.
    #[must_use]
    pub fn orbit_trace(&self) -> Vec<OrbitSample> {
        OrbitProbes::from_points(&self.orbit).map_or_else(Vec::new, |probes| {
            probes.trace(
                self.config.order_filter,
                ORBIT_PLOT_CYCLES,
                ORBIT_PLOT_SAMPLES,
                Jitter::Off,
            )
        })
    }

    /// Make `id` the deflection phase reference.
    ///
    /// # Errors
    ///
    /// Returns [`PointEditError::UnknownPoint`] when `id` is not a deflection point.
    pub fn set_reference(&mut self, id: &str) -> Result<(), PointEditError> {
        self.deflection.set_reference(id)
    }

    /// Edit one point of `rig`.
    ///
    /// # Errors
    ///
    /// Returns [`PointEditError::UnknownPoint`] when `id` is not part of the rig.
    pub fn update_point<F>(&mut self, rig: Rig, id: &str, edit: F) -> Result<(), PointEditError>
    where
        F: FnOnce(&mut MeasurementPoint),
    {
        match rig {
            Rig::Deflection => self.deflection.update_point(id, edit),
            Rig::Orbit => self.orbit.update_point(id, edit),
        }
    }

    /// Apply a fault to the rig it belongs to.
    pub fn apply_fault(&mut self, fault: Fault) {
        match fault {
            Fault::Deflection(fault) => self.apply_deflection_fault(fault),
            Fault::Orbit(fault) => self.apply_orbit_fault(fault),
        }
    }

    /// Overwrite the deflection rig with a fault signature.
    pub fn apply_deflection_fault(&mut self, fault: DeflectionFault) {
        fault.apply(&mut self.deflection, &self.config.preset_context());
        self.deflection_fault = fault;
        info!(fault = fault.name(), "deflection fault selected");
    }

    /// Overwrite the orbit probes with a fault signature and drop any custom orbit.
    pub fn apply_orbit_fault(&mut self, fault: OrbitFault) {
        fault.apply(&mut self.orbit);
        self.orbit_fault = fault;
        self.custom_orbit = None;
        self.trail.clear();
        info!(fault = fault.name(), "orbit fault selected");
    }

    /// Change the real machine speed and re-derive speed dependent orders.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a negative or non-finite speed.
    pub fn set_machine_rpm(&mut self, rpm: f64) -> Result<(), ConfigError> {
        self.update_config(|config| config.machine_rpm = rpm)?;
        self.retune();
        Ok(())
    }

    /// Change the electrical line frequency and re-derive speed dependent orders.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a negative or non-finite frequency.
    pub fn set_line_frequency(&mut self, hz: f64) -> Result<(), ConfigError> {
        self.update_config(|config| config.line_frequency_hz = hz)?;
        self.retune();
        Ok(())
    }

    /// Change the visual rotation speed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a negative or non-finite speed.
    pub fn set_animation_rpm(&mut self, rpm: f64) -> Result<(), ConfigError> {
        self.update_config(|config| config.animation_rpm = rpm)
    }

    /// Change the displacement gain. Recorded trail samples keep their old scale.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a negative or non-finite gain.
    pub fn set_global_gain(&mut self, gain: f64) -> Result<(), ConfigError> {
        self.update_config(|config| config.global_gain = gain)
    }

    /// Select the orbit order filter and restart the trail.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the filter order is not positive.
    pub fn set_order_filter(&mut self, filter: OrderFilter) -> Result<(), ConfigError> {
        self.update_config(|config| config.order_filter = filter)?;
        self.trail.clear();
        Ok(())
    }

    /// Replace the probe-driven orbit with a traced one, or restore the probes.
    pub fn set_custom_orbit(&mut self, orbit: Option<CustomOrbit>) {
        debug!(custom = orbit.is_some(), "custom orbit changed");
        self.custom_orbit = orbit;
        self.trail.clear();
    }

    /// Merge a measurement table into the deflection rig.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] when the table has no header or no `ID` column.
    pub fn import_table(&mut self, input: &str) -> Result<ImportSummary, TableError> {
        import_table(&mut self.deflection, input)
    }

    /// Plain-text measurement summary of `rig` for a diagnostic assistant.
    #[must_use]
    pub fn summary(&self, rig: Rig) -> String {
        let mut summary = String::new();
        if rig == Rig::Orbit {
            if let Some(custom) = &self.custom_orbit {
                summary.push_str(&render_orbit_inspection(custom));
            }
        }
        summary.push_str(&render_summary(self.points(rig)));
        summary
    }

    /// Apply a validated edit to the configuration, rolling back on failure.
    fn update_config<F>(&mut self, edit: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut SimulationConfig),
    {
        let mut next = self.config.clone();
        edit(&mut next);
        next.validate()?;
        self.config = next;
        Ok(())
    }

    /// Re-derive speed dependent preset orders.
    fn retune(&mut self) {
        self.deflection_fault
            .retune(&mut self.deflection, &self.config.preset_context());
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn quiet() -> Simulation {
        Simulation::new(SimulationConfig {
            jitter: Jitter::Off,
            ..SimulationConfig::default()
        })
        .expect("valid configuration")
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimulationConfig {
            global_gain: f64::NAN,
            ..SimulationConfig::default()
        };
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn paused_frames_do_not_grow_the_trail() {
        let mut simulation = quiet();
        simulation.advance(0.01);
        simulation.pause();
        let frozen = simulation.advance(0.01);
        assert_eq!(simulation.trail().len(), 1);
        simulation.play();
        let resumed = simulation.advance(0.01);
        assert!(resumed.time > frozen.time);
        assert_eq!(simulation.trail().len(), 2);
    }

    #[test]
    fn machine_speed_retunes_soft_foot() {
        let mut simulation = quiet();
        simulation.apply_deflection_fault(DeflectionFault::SoftFoot);
        simulation.set_machine_rpm(3000.0).expect("valid rpm");
        let foot = simulation.deflection().get("m-foot-de-r").expect("foot");
        assert_relative_eq!(foot.vertical.harmonics[0].order, 2.0);

        simulation.set_line_frequency(60.0).expect("valid frequency");
        let foot = simulation.deflection().get("m-foot-de-r").expect("foot");
        assert_relative_eq!(foot.vertical.harmonics[0].order, 2.4);
    }

    #[test]
    fn rejected_settings_leave_config_untouched() {
        let mut simulation = quiet();
        assert!(simulation.set_machine_rpm(-1.0).is_err());
        assert_relative_eq!(simulation.config().machine_rpm, 1480.0);
    }

    #[test]
    fn custom_orbit_overrides_probes_until_a_preset() {
        let mut simulation = quiet();
        let orbit = CustomOrbit::new(vec![OrbitSample::new(0.5, -0.5)], "dot").expect("valid path");
        simulation.set_custom_orbit(Some(orbit));
        let position = simulation.shaft_position(1.234);
        assert_relative_eq!(position.x, 1.0);
        assert_relative_eq!(position.y, -1.0);
        assert!(simulation.summary(Rig::Orbit).contains("VISUAL INSPECTION"));

        simulation.apply_orbit_fault(OrbitFault::Unbalance);
        assert!(simulation.custom_orbit().is_none());
        assert!(simulation.trail().is_empty());
    }

    #[test]
    fn trigger_mark_follows_keyphasor() {
        let mut simulation = quiet();
        simulation
            .update_point(Rig::Orbit, "keyphasor", |p| p.horizontal.measured_phase = 90.0)
            .expect("keyphasor present");
        // Probe X reads 10 sin(-pi/2), probe Y reads 10 sin(0).
        let mark = simulation.trigger_position().expect("probe orbit");
        assert_relative_eq!(mark.x, -10.0 * 0.005, epsilon = 1.0e-12);
        assert_relative_eq!(mark.y, 0.0, epsilon = 1.0e-12);

        let orbit = CustomOrbit::new(vec![OrbitSample::new(0.5, -0.5)], "dot").expect("valid path");
        simulation.set_custom_orbit(Some(orbit));
        assert!(simulation.trigger_position().is_none());
    }

    #[test]
    fn static_plot_leaves_noise_out() {
        let mut simulation = Simulation::default();
        simulation.apply_orbit_fault(OrbitFault::Rub);
        let first = simulation.orbit_trace();
        assert_eq!(first, simulation.orbit_trace());
        let probes = OrbitProbes::from_points(simulation.orbit()).expect("probes present");
        let clean = probes.trace(
            OrderFilter::None,
            ORBIT_PLOT_CYCLES,
            ORBIT_PLOT_SAMPLES,
            Jitter::Off,
        );
        assert_eq!(first, clean);
    }

    #[test]
    fn fault_dispatches_to_its_rig() {
        let mut simulation = quiet();
        simulation.apply_fault(Fault::Deflection(DeflectionFault::BentShaft));
        simulation.apply_fault(Fault::Orbit(OrbitFault::RotorBow));
        assert_eq!(simulation.deflection_fault(), DeflectionFault::BentShaft);
        assert_eq!(simulation.orbit_fault(), OrbitFault::RotorBow);
        let motor = simulation.deflection().get("m-nde").expect("motor nde");
        assert_relative_eq!(motor.axial.relative_phase(), 180.0);
    }

    #[test]
    fn orbit_trace_has_closing_sample() {
        let simulation = quiet();
        assert_eq!(simulation.orbit_trace().len(), ORBIT_PLOT_SAMPLES + 1);
    }
}

#![warn(clippy::pedantic)]

use std::f64::consts::FRAC_PI_2;

use approx::assert_relative_eq;
use odsx::{
    Jitter, OrbitFault, OrbitProbes, OrbitSample, OrbitTrail, OrderFilter, PointSet, Rig,
    Simulation, SimulationConfig,
};

fn quiet_config() -> SimulationConfig {
    SimulationConfig {
        jitter: Jitter::Off,
        ..SimulationConfig::default()
    }
}

#[test]
fn unbalance_traces_a_circle() {
    let mut points = PointSet::orbit_rig();
    OrbitFault::Unbalance.apply(&mut points);
    let probes = OrbitProbes::from_points(&points).expect("probes present");

    let start = probes.reading(0.0, OrderFilter::None, Jitter::Off);
    assert_relative_eq!(start.x, 0.0, epsilon = 1.0e-12);
    assert_relative_eq!(start.y, 40.0, epsilon = 1.0e-12);
    let quarter = probes.reading(FRAC_PI_2, OrderFilter::None, Jitter::Off);
    assert_relative_eq!(quarter.x, 40.0, epsilon = 1.0e-12);
    assert_relative_eq!(quarter.y, 0.0, epsilon = 1.0e-12);

    for sample in probes.trace(OrderFilter::None, 2.0, 720, Jitter::Off) {
        assert_relative_eq!(sample.x.hypot(sample.y), 40.0, epsilon = 1.0e-9);
    }
}

#[test]
fn filters_agree_without_harmonics() {
    let mut points = PointSet::orbit_rig();
    OrbitFault::Preload.apply(&mut points);
    let probes = OrbitProbes::from_points(&points).expect("probes present");
    let band = probes.trace(OrderFilter::BandPass(1.0), 1.0, 90, Jitter::Off);
    let low = probes.trace(OrderFilter::LowPass(1.0), 1.0, 90, Jitter::Off);
    for (b, l) in band.iter().zip(&low) {
        assert_relative_eq!(b.x, l.x, epsilon = 1.0e-12);
        assert_relative_eq!(b.y, l.y, epsilon = 1.0e-12);
    }
}

#[test]
fn oil_whip_is_mostly_sub_synchronous() {
    let mut points = PointSet::orbit_rig();
    OrbitFault::OilWhip.apply(&mut points);
    let probes = OrbitProbes::from_points(&points).expect("probes present");
    let whip = probes.trace(OrderFilter::LowPass(0.5), 2.0, 360, Jitter::Off);
    let synchronous = probes.trace(OrderFilter::BandPass(1.0), 2.0, 360, Jitter::Off);
    let peak = |trace: &[OrbitSample]| trace.iter().map(|s| s.x.abs()).fold(0.0, f64::max);
    assert!(peak(&whip) > peak(&synchronous));
    assert_relative_eq!(probes.peak_amplitude(), 125.0);
}

#[test]
fn zero_rpm_keeps_the_trail_finite() {
    let mut trail = OrbitTrail::default();
    assert_relative_eq!(trail.duration_to_keep(0.0), 180.0);
    trail.push(OrbitSample::new(0.1, 0.2), 0.0, 0.0);
    trail.push(OrbitSample::new(0.1, 0.2), 1.0, 0.0);
    assert_eq!(trail.len(), 2);

    let mut simulation = Simulation::new(SimulationConfig {
        animation_rpm: 0.0,
        ..quiet_config()
    })
    .expect("zero rpm is valid");
    for _ in 0..10 {
        let frame = simulation.advance(0.1);
        assert_eq!(frame.angle, 0.0);
    }
    assert_eq!(simulation.trail().len(), 10);
}

#[test]
fn one_frame_feeds_every_consumer() {
    let mut simulation = Simulation::new(quiet_config()).expect("valid configuration");
    simulation.apply_orbit_fault(OrbitFault::Unbalance);
    let frame = simulation.advance(0.05);
    let latest = simulation.trail().iter().last().expect("one sample");
    assert_relative_eq!(latest.time, frame.time);
    assert_eq!(latest.position, simulation.shaft_position(frame.angle));
}

#[test]
fn trail_spans_three_revolutions_at_speed() {
    let mut simulation = Simulation::new(SimulationConfig {
        animation_rpm: 600.0,
        ..quiet_config()
    })
    .expect("valid configuration");
    for _ in 0..120 {
        simulation.advance(1.0 / 60.0);
    }
    // 600 RPM keeps 0.3 s, i.e. 18 or 19 frames at 60 Hz.
    let len = simulation.trail().len();
    assert!((18..=19).contains(&len), "trail length {len}");
}

#[test]
fn summary_reports_the_probes() {
    let mut simulation = Simulation::new(quiet_config()).expect("valid configuration");
    simulation.apply_orbit_fault(OrbitFault::Misalignment);
    let summary = simulation.summary(Rig::Orbit);
    assert!(summary.contains("PROBE [Probe X]"));
    assert!(summary.contains("PROBE [Probe Y]"));
    assert!(summary.contains("2X: 14.00 µm"));
}

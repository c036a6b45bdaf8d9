//! Display-time derivations for waveform and spectrum plots.
//!
//! Nothing here holds state; every curve is recomputed from the current signals.

use std::f64::consts::{FRAC_PI_4, TAU};

use crate::phase::wrap360;
use crate::signal::{evaluate_angle, Jitter, OrderFilter, VibrationComponent};

/// Default number of spectrum bins.
pub const SPECTRUM_BINS: usize = 120;
/// Fraction of the neighbouring bin amplitude for a harmonic between bins.
pub const SPECTRAL_LEAKAGE: f64 = 0.7;
/// Width of the keyphasor pulse in radians.
pub const PULSE_WIDTH: f64 = FRAC_PI_4;

/// Bin index of the 1X line for a spectrum with `bins` bins.
#[must_use]
pub fn fundamental_bin(bins: usize) -> usize {
    (bins / 10).max(1)
}

/// Order represented by bin `index`.
#[must_use]
pub fn bin_order(index: usize, bins: usize) -> f64 {
    index as f64 / fundamental_bin(bins) as f64
}

/// Time waveform swept over `cycles` revolutions in `samples` steps.
///
/// # Examples
/// ```
/// use odsx::plot::waveform;
/// use odsx::{Jitter, VibrationComponent};
///
/// let curve = waveform(&VibrationComponent::new(3.0, 90.0), 2.0, 400, Jitter::Off);
/// assert_eq!(curve.len(), 400);
/// assert!((curve[0] - 3.0).abs() < 1.0e-12);
/// ```
#[must_use]
pub fn waveform(
    component: &VibrationComponent,
    cycles: f64,
    samples: usize,
    jitter: Jitter,
) -> Vec<f64> {
    sweep(cycles, samples)
        .map(|theta| evaluate_angle(component, theta, OrderFilter::None, jitter))
        .collect()
}

/// Once-per-revolution square pulse centred on `phase_deg`.
///
/// The pulse sits at `amplitude` within half of [`PULSE_WIDTH`] of the phase and at
/// a quarter of the amplitude below zero elsewhere.
#[must_use]
pub fn keyphasor_pulse(amplitude: f64, phase_deg: f64, cycles: f64, samples: usize) -> Vec<f64> {
    let centre = wrap360(phase_deg).to_radians();
    sweep(cycles, samples)
        .map(|theta| {
            let offset = (theta - centre).rem_euclid(TAU);
            let distance = offset.min(TAU - offset);
            if distance < PULSE_WIDTH / 2.0 {
                amplitude
            } else {
                -amplitude / 4.0
            }
        })
        .collect()
}

/// Closed-form order spectrum of a component.
///
/// The fundamental lands on [`fundamental_bin`], each harmonic on the nearest bin to
/// its order, and fractional orders leak into the adjacent bin. Noise raises a band
/// around 80% of the span. The result is deterministic.
#[must_use]
pub fn order_spectrum(component: &VibrationComponent, bins: usize) -> Vec<f64> {
    let first = fundamental_bin(bins);
    let amplitude = component.amplitude;
    let noise_centre = bins as f64 * 0.8;
    (0..bins)
        .map(|index| {
            let mut value = 0.0;
            if index == first {
                value = amplitude;
            }
            for harmonic in &component.harmonics {
                let exact = first as f64 * harmonic.order;
                let line = amplitude * harmonic.amplitude_ratio;
                if index as f64 == exact.round() {
                    value = line;
                } else if (index as f64 - exact).abs() < 1.0 {
                    value = f64::max(value, line * SPECTRAL_LEAKAGE);
                }
            }
            if component.noise_level > 0.0
                && index > first * 4
                && (index as f64 - noise_centre).abs() < 10.0
            {
                value += component.noise_level * 0.5;
            }
            value
        })
        .collect()
}

/// Spectrum of the keyphasor square pulse: odd orders only.
#[must_use]
pub fn keyphasor_spectrum(amplitude: f64, bins: usize) -> Vec<f64> {
    (0..bins)
        .map(|index| {
            let order = bin_order(index, bins);
            [(1.0, 0.63), (3.0, 0.21), (5.0, 0.12)]
                .into_iter()
                .find(|(line, _)| (order - line).abs() < 0.1)
                .map_or(0.0, |(_, fraction)| amplitude * fraction)
        })
        .collect()
}

/// Half-height of a waveform plot that keeps the whole curve visible.
#[must_use]
pub fn display_limit(component: &VibrationComponent) -> f64 {
    (component.peak_amplitude() * 1.2).max(2.0)
}

/// Shaft angles of `samples` evenly spaced steps over `cycles` revolutions.
fn sweep(cycles: f64, samples: usize) -> impl Iterator<Item = f64> {
    let span = cycles * TAU;
    (0..samples).map(move |step| step as f64 / samples as f64 * span)
}

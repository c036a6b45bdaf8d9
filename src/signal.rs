//! Harmonic phasor signals and their evaluation.
//!
//! Every consumer (mesh deformation, waveform plots, orbit plots) evaluates signals
//! through this module so the harmonic sum is defined in exactly one place.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Order of the broadband noise carrier relative to running speed.
pub const NOISE_ORDER: f64 = 25.0;

/// Tolerance used when matching a harmonic order against a filter order.
pub const ORDER_TOLERANCE: f64 = 0.01;

/// Order of the fundamental (once per revolution) term.
pub const FUNDAMENTAL_ORDER: f64 = 1.0;

/// An overtone riding on a component's fundamental.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    /// Multiple of running speed, e.g. `2.0` for 2X or `0.45` for oil whirl.
    pub order: f64,
    /// Amplitude relative to the fundamental amplitude.
    pub amplitude_ratio: f64,
    /// Phase offset in degrees added to the fundamental phase.
    pub phase_shift_deg: f64,
}

impl Harmonic {
    /// Create a [`Harmonic`] from its order, amplitude ratio and phase shift in degrees.
    #[must_use]
    pub const fn new(order: f64, amplitude_ratio: f64, phase_shift_deg: f64) -> Self {
        Self {
            order,
            amplitude_ratio,
            phase_shift_deg,
        }
    }
}

/// Vibration signal along a single measurement axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VibrationComponent {
    /// Fundamental amplitude in engineering units (mm/s or µm pp).
    pub amplitude: f64,
    /// Absolute phase in degrees as entered by the user.
    pub measured_phase: f64,
    /// Phase in degrees after normalization against the reference point.
    #[serde(default)]
    relative_phase: f64,
    /// Overtones summed on top of the fundamental.
    #[serde(default)]
    pub harmonics: Vec<Harmonic>,
    /// Broadband noise level; zero disables the noise term.
    #[serde(default)]
    pub noise_level: f64,
}

impl VibrationComponent {
    /// Create a pure 1X component.
    ///
    /// The relative phase starts equal to the wrapped measured phase and is kept in
    /// sync by the phase reference engine afterwards.
    #[must_use]
    pub fn new(amplitude: f64, measured_phase: f64) -> Self {
        Self {
            amplitude,
            measured_phase,
            relative_phase: crate::phase::wrap360(measured_phase),
            harmonics: Vec::new(),
            noise_level: 0.0,
        }
    }

    /// Attach overtones to the component.
    #[must_use]
    pub fn with_harmonics(mut self, harmonics: Vec<Harmonic>) -> Self {
        self.harmonics = harmonics;
        self
    }

    /// Attach a broadband noise level to the component.
    #[must_use]
    pub fn with_noise(mut self, noise_level: f64) -> Self {
        self.noise_level = noise_level;
        self
    }

    /// Phase in degrees used for evaluation.
    #[must_use]
    pub fn relative_phase(&self) -> f64 {
        self.relative_phase
    }

    /// Only the phase reference engine derives relative phases.
    pub(crate) fn set_relative_phase(&mut self, phase: f64) {
        self.relative_phase = phase;
    }

    /// Upper bound on the signal magnitude, used to autoscale plots.
    #[must_use]
    pub fn peak_amplitude(&self) -> f64 {
        let harmonic_sum: f64 = self
            .harmonics
            .iter()
            .map(|harmonic| self.amplitude * harmonic.amplitude_ratio)
            .sum();
        self.amplitude + harmonic_sum + self.noise_level
    }

    /// Evaluate the component at shaft angle `angle` (radians) through `filter`.
    ///
    /// `instant` only feeds the noise jitter source.
    fn synthesize(&self, angle: f64, filter: OrderFilter, jitter: Jitter, instant: f64) -> f64 {
        let phase = self.relative_phase.to_radians();
        let mut total = 0.0;
        if filter.passes(FUNDAMENTAL_ORDER) {
            total += self.amplitude * (angle + phase).sin();
        }
        for harmonic in &self.harmonics {
            if filter.passes(harmonic.order) {
                let harmonic_phase = phase + harmonic.phase_shift_deg.to_radians();
                total += self.amplitude
                    * harmonic.amplitude_ratio
                    * (angle * harmonic.order + harmonic_phase).sin();
            }
        }
        if self.noise_level > 0.0 && filter.passes_noise() {
            total +=
                self.noise_level * 0.5 * ((angle * NOISE_ORDER).sin() + jitter.sample(instant));
        }
        total
    }
}

/// Evaluate a component at wall-clock `time` for angular frequency `omega` (rad/s).
///
/// # Examples
/// ```
/// use odsx::{evaluate, Jitter, VibrationComponent};
///
/// let component = VibrationComponent::new(2.0, 90.0);
/// let value = evaluate(&component, 1.0, 0.0, Jitter::Off);
/// assert!((value - 2.0).abs() < 1.0e-12);
/// ```
#[must_use]
pub fn evaluate(component: &VibrationComponent, omega: f64, time: f64, jitter: Jitter) -> f64 {
    component.synthesize(omega * time, OrderFilter::None, jitter, time)
}

/// Evaluate a component directly at shaft angle `theta` (radians) through an order filter.
///
/// Orbit probes are phase-locked to rotation, so they are evaluated in the angle domain.
#[must_use]
pub fn evaluate_angle(
    component: &VibrationComponent,
    theta: f64,
    filter: OrderFilter,
    jitter: Jitter,
) -> f64 {
    component.synthesize(theta, filter, jitter, theta)
}

/// Source of the bounded perturbation added to the noise term.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jitter {
    /// Fresh random draw on every evaluation.
    #[default]
    Random,
    /// Deterministic draw derived from the seed and the evaluation instant.
    Seeded(u64),
    /// No perturbation.
    Off,
}

impl Jitter {
    /// Exclusive upper bound of a jitter draw.
    pub const MAX: f64 = 0.2;

    /// Draw a perturbation in `[0, MAX)`.
    #[must_use]
    pub fn sample(self, instant: f64) -> f64 {
        match self {
            Jitter::Random => rand::thread_rng().gen_range(0.0..Self::MAX),
            Jitter::Seeded(seed) => {
                StdRng::seed_from_u64(seed ^ instant.to_bits()).gen_range(0.0..Self::MAX)
            }
            Jitter::Off => 0.0,
        }
    }
}

/// Order-domain filter applied to angle-domain evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderFilter {
    /// Every term passes, including noise.
    #[default]
    None,
    /// Only the term within [`ORDER_TOLERANCE`] of the target order passes.
    BandPass(f64),
    /// Every term at or below the cutoff order passes.
    LowPass(f64),
}

impl OrderFilter {
    /// Whether a term of the given order contributes.
    #[must_use]
    pub fn passes(self, order: f64) -> bool {
        match self {
            OrderFilter::None => true,
            OrderFilter::BandPass(target) => (order - target).abs() < ORDER_TOLERANCE,
            OrderFilter::LowPass(cutoff) => order <= cutoff + ORDER_TOLERANCE,
        }
    }

    /// Noise only survives an unfiltered view.
    #[must_use]
    pub fn passes_noise(self) -> bool {
        matches!(self, OrderFilter::None)
    }
}

//! Simulation clock shared by every consumer of a frame.

use std::f64::consts::TAU;

use tracing::debug;

/// Whether the clock integrates time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayState {
    /// Time and shaft angle advance every frame.
    #[default]
    Playing,
    /// Time and shaft angle are frozen.
    Paused,
}

/// Frame-consistent view of the clock handed to consumers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    /// Simulation time in seconds.
    pub time: f64,
    /// Shaft angle in radians; decreases while the shaft turns.
    pub angle: f64,
}

/// Owned simulation time and shaft angle, advanced once per rendered frame.
///
/// # Examples
/// ```
/// use odsx::SimulationClock;
///
/// let mut clock = SimulationClock::new();
/// let frame = clock.advance(0.5, 60.0);
/// assert_eq!(frame.time, 0.5);
/// assert!((frame.angle + std::f64::consts::PI).abs() < 1.0e-12);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationClock {
    /// Seconds elapsed while playing.
    time: f64,
    /// Accumulated shaft angle in radians.
    angle: f64,
    /// Current play state.
    state: PlayState,
}

impl SimulationClock {
    /// Create a playing clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `delta` seconds at `rpm` and return the new frame.
    ///
    /// A paused clock returns the frozen frame unchanged. Negative or non-finite
    /// deltas are ignored so time stays monotonic.
    pub fn advance(&mut self, delta: f64, rpm: f64) -> Frame {
        if self.state == PlayState::Playing && delta.is_finite() && delta > 0.0 {
            self.angle -= delta * (rpm / 60.0) * TAU;
            self.time += delta;
        }
        self.frame()
    }

    /// The current frame without advancing.
    #[must_use]
    pub fn frame(&self) -> Frame {
        Frame {
            time: self.time,
            angle: self.angle,
        }
    }

    /// Current play state.
    #[must_use]
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Whether the clock is integrating time.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// Resume integration from the frozen values.
    pub fn play(&mut self) {
        self.set_state(PlayState::Playing);
    }

    /// Freeze time and shaft angle.
    pub fn pause(&mut self) {
        self.set_state(PlayState::Paused);
    }

    /// Switch between playing and paused.
    pub fn toggle(&mut self) {
        let next = match self.state {
            PlayState::Playing => PlayState::Paused,
            PlayState::Paused => PlayState::Playing,
        };
        self.set_state(next);
    }

    /// Switch state, logging transitions.
    fn set_state(&mut self, state: PlayState) {
        if self.state != state {
            debug!(?state, time = self.time, angle = self.angle, "clock state changed");
            self.state = state;
        }
    }
}

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod clock;
pub mod config;
pub mod errors;
pub mod field;
pub mod geometry;
pub mod orbit;
pub mod phase;
pub mod plot;
pub mod point;
pub mod presets;
pub mod report;
pub mod signal;
pub mod simulation;
pub mod table;

pub use clock::{Frame, PlayState, SimulationClock};
pub use config::SimulationConfig;
pub use errors::{ConfigError, OrbitPathError, PointEditError, TableError, UnknownFault};
pub use field::{anchor_damping, heat_color, heat_intensity, DisplacementField, SKID_ANCHORS};
pub use geometry::{point, Displacement, Point};
pub use orbit::{CustomOrbit, OrbitProbes, OrbitSample, OrbitTrail};
pub use phase::wrap360;
pub use point::{Axis, MeasurementPoint, PointSet, Rig};
pub use presets::{DeflectionFault, Fault, OrbitFault, PresetContext};
pub use report::render_summary;
pub use signal::{evaluate, evaluate_angle, Harmonic, Jitter, OrderFilter, VibrationComponent};
pub use simulation::Simulation;

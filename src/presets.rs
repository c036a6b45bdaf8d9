//! Library of deterministic fault signatures.
//!
//! Each fault is a static table of per-point, per-axis overrides applied on top of a
//! rig-specific baseline by a single routine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::UnknownFault;
use crate::phase::DEFAULT_REFERENCE_ID;
use crate::point::{Axis, MeasurementPoint, PointSet, Rig, KEYPHASOR_ID, PROBE_X_ID, PROBE_Y_ID};
use crate::signal::{Harmonic, VibrationComponent};
use Axis::{Axial as A, Horizontal as H, Vertical as V};
use Target::{All, Machine, Point as At};

/// Amplitude every deflection axis starts from before a fault is applied.
pub const DEFLECTION_BASELINE: f64 = 0.1;
/// Horizontal amplitude of the manual deflection baseline.
pub const MANUAL_HORIZONTAL: f64 = 0.2;
/// Probe amplitude of the orbit baseline.
pub const ORBIT_BASELINE: f64 = 10.0;

/// Machine state that some signatures depend on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresetContext {
    /// Real machine speed in RPM.
    pub machine_rpm: f64,
    /// Electrical supply frequency in Hz.
    pub line_frequency_hz: f64,
}

impl Default for PresetContext {
    fn default() -> Self {
        Self {
            machine_rpm: 1480.0,
            line_frequency_hz: 50.0,
        }
    }
}

impl PresetContext {
    /// Order of twice line frequency relative to running speed.
    #[must_use]
    pub fn twice_line_frequency_order(&self) -> f64 {
        2.0 * self.line_frequency_hz * 60.0 / self.machine_rpm.max(1.0)
    }
}

/// Harmonic order as stored in a preset table.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Order {
    /// Fixed multiple of running speed.
    Fixed(f64),
    /// Twice the electrical line frequency, which depends on machine speed.
    TwiceLineFrequency,
}

/// Harmonic row of a preset table.
#[derive(Clone, Copy, Debug, PartialEq)]
struct HarmonicRow {
    /// Multiple of running speed, possibly speed dependent.
    order: Order,
    /// Amplitude relative to the fundamental.
    amplitude_ratio: f64,
    /// Phase offset from the fundamental in degrees.
    phase_shift_deg: f64,
}

/// Points addressed by an override.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Target {
    /// A single point by id.
    Point(&'static str),
    /// Every motor and pump point.
    Machine,
    /// Every point in the set.
    All,
}

impl Target {
    /// Whether `point` is addressed by this target.
    fn matches(self, point: &MeasurementPoint) -> bool {
        match self {
            Target::Point(id) => point.id == id,
            Target::Machine => point.id.starts_with("m-") || point.id.starts_with("p-"),
            Target::All => true,
        }
    }
}

/// One row of a preset table.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Override {
    /// Points the row writes.
    target: Target,
    /// Axis the row writes.
    axis: Axis,
    /// Fundamental amplitude.
    amplitude: f64,
    /// Absolute measured phase in degrees.
    phase: f64,
    /// Harmonics added to the fundamental.
    harmonics: &'static [HarmonicRow],
    /// Random noise level.
    noise: f64,
}

impl Override {
    /// Whether any harmonic follows the line frequency.
    fn tracks_line_frequency(&self) -> bool {
        self.harmonics
            .iter()
            .any(|row| row.order == Order::TwiceLineFrequency)
    }

    /// Concrete harmonics for the current machine state.
    fn resolve_harmonics(&self, context: &PresetContext) -> Vec<Harmonic> {
        self.harmonics
            .iter()
            .map(|row| {
                let order = match row.order {
                    Order::Fixed(order) => order,
                    Order::TwiceLineFrequency => context.twice_line_frequency_order(),
                };
                Harmonic::new(order, row.amplitude_ratio, row.phase_shift_deg)
            })
            .collect()
    }
}

/// Row with a pure 1X signal.
const fn set(target: Target, axis: Axis, amplitude: f64, phase: f64) -> Override {
    Override {
        target,
        axis,
        amplitude,
        phase,
        harmonics: &[],
        noise: 0.0,
    }
}

/// Row with harmonics and noise.
const fn with(
    target: Target,
    axis: Axis,
    amplitude: f64,
    phase: f64,
    harmonics: &'static [HarmonicRow],
    noise: f64,
) -> Override {
    Override {
        target,
        axis,
        amplitude,
        phase,
        harmonics,
        noise,
    }
}

/// Fixed-order harmonic row.
const fn h(order: f64, amplitude_ratio: f64, phase_shift_deg: f64) -> HarmonicRow {
    HarmonicRow {
        order: Order::Fixed(order),
        amplitude_ratio,
        phase_shift_deg,
    }
}

/// Motor drive-end bearing.
const MOTOR_DE: Target = At(DEFAULT_REFERENCE_ID);
/// Motor non-drive-end bearing.
const MOTOR_NDE: Target = At("m-nde");
/// Pump inboard bearing.
const PUMP_DE: Target = At("p-de");
/// Pump outboard bearing.
const PUMP_NDE: Target = At("p-nde");

/// 2X from a loose foot.
const SECOND_ORDER_LOOSE: &[HarmonicRow] = &[h(2.0, 0.5, 0.0)];
/// 2X in anti-phase from a rocking base.
const SECOND_ORDER_ROCKING: &[HarmonicRow] = &[h(2.0, 0.5, 180.0)];
/// Sub-harmonic and integer orders of a loose fit.
const BEARING_FIT: &[HarmonicRow] = &[h(0.5, 0.3, 0.0), h(2.0, 0.6, 0.0), h(3.0, 0.4, 0.0)];
/// Outer race defect line and its second harmonic.
const BEARING_DEFECT: &[HarmonicRow] = &[h(3.56, 0.6, 0.0), h(7.12, 0.3, 0.0)];
/// Tooth mesh at the driving gear.
const TOOTH_MESH: &[HarmonicRow] = &[h(12.0, 1.5, 0.0)];
/// Tooth mesh transmitted to the outboard bearing.
const TOOTH_MESH_FAR: &[HarmonicRow] = &[h(12.0, 1.0, 0.0)];
/// Magnetic pull at twice line frequency.
const SOFT_FOOT_LINE: &[HarmonicRow] = &[HarmonicRow {
    order: Order::TwiceLineFrequency,
    amplitude_ratio: 1.2,
    phase_shift_deg: 180.0,
}];

/// Soft foot under the motor DE right foot.
const SOFT_FOOT_ROWS: &[Override] = &[with(At("m-foot-de-r"), V, 6.0, 0.0, SOFT_FOOT_LINE, 0.0)];

/// Preloaded 2X of a misaligned coupling.
const ORBIT_MISALIGNMENT: &[HarmonicRow] = &[h(2.0, 0.4, 45.0)];
/// Inner-loop 2X of a cracked shaft.
const ORBIT_CRACK: &[HarmonicRow] = &[h(2.0, 0.5, 180.0)];
/// Oil whirl near 0.45X.
const ORBIT_WHIRL: &[HarmonicRow] = &[h(0.45, 0.8, 90.0)];
/// Oil whip near 0.48X.
const ORBIT_WHIP: &[HarmonicRow] = &[h(0.48, 1.5, 80.0)];
/// Half order and truncation harmonics of a rub.
const ORBIT_RUB: &[HarmonicRow] = &[h(0.5, 0.3, 0.0), h(2.0, 0.3, 180.0), h(3.0, 0.2, 0.0)];
/// Integer harmonics of mechanical looseness.
const ORBIT_LOOSENESS: &[HarmonicRow] = &[h(2.0, 0.5, 0.0), h(3.0, 0.3, 0.0), h(4.0, 0.2, 0.0)];

/// Horizontal proximity probe.
const PROBE_X: Target = At(PROBE_X_ID);
/// Vertical proximity probe.
const PROBE_Y: Target = At(PROBE_Y_ID);

/// Whole train moving together at 1X.
const STATIC_UNBALANCE_ROWS: &[Override] = &[
    set(Machine, H, 6.0, 0.0),
    set(Machine, V, 6.0, 90.0),
];

/// Motor bearings in anti-phase.
const COUPLE_UNBALANCE_ROWS: &[Override] = &[
    set(MOTOR_DE, H, 6.0, 0.0),
    set(MOTOR_DE, V, 6.0, 90.0),
    set(MOTOR_NDE, H, 6.0, 180.0),
    set(MOTOR_NDE, V, 6.0, 270.0),
];

/// Motor bearings 90 degrees apart.
const DYNAMIC_UNBALANCE_ROWS: &[Override] = &[
    set(MOTOR_DE, H, 6.0, 0.0),
    set(MOTOR_DE, V, 6.0, 90.0),
    set(MOTOR_NDE, H, 6.0, 90.0),
    set(MOTOR_NDE, V, 6.0, 180.0),
];

/// Pump end dominant with axial motion.
const OVERHUNG_ROTOR_ROWS: &[Override] = &[
    set(MOTOR_DE, H, 2.0, 0.0),
    set(MOTOR_DE, V, 2.0, 90.0),
    set(PUMP_DE, H, 8.0, 0.0),
    set(PUMP_DE, V, 8.0, 90.0),
    set(PUMP_DE, A, 4.0, 0.0),
    set(PUMP_NDE, A, 4.0, 180.0),
];

/// Axial anti-phase across the coupling.
const ANGULAR_MISALIGNMENT_ROWS: &[Override] = &[
    set(MOTOR_DE, A, 8.0, 0.0),
    set(PUMP_DE, A, 8.0, 180.0),
];

/// Radial anti-phase across the coupling.
const PARALLEL_MISALIGNMENT_ROWS: &[Override] = &[
    set(MOTOR_DE, H, 7.0, 0.0),
    set(MOTOR_DE, V, 7.0, 90.0),
    set(PUMP_DE, H, 7.0, 180.0),
    set(PUMP_DE, V, 7.0, 270.0),
];

/// Radial and axial anti-phase across the coupling.
const COMBINED_MISALIGNMENT_ROWS: &[Override] = &[
    set(MOTOR_DE, V, 6.0, 90.0),
    set(MOTOR_DE, H, 6.0, 0.0),
    set(MOTOR_DE, A, 5.0, 0.0),
    set(PUMP_DE, V, 6.0, 270.0),
    set(PUMP_DE, H, 6.0, 180.0),
    set(PUMP_DE, A, 5.0, 180.0),
];

/// Axial anti-phase across the motor.
const BENT_SHAFT_ROWS: &[Override] = &[
    set(MOTOR_DE, A, 8.0, 0.0),
    set(MOTOR_NDE, A, 8.0, 180.0),
];

/// Directional vertical 1X at the motor.
const ECCENTRIC_ROTOR_ROWS: &[Override] = &[
    set(MOTOR_DE, H, 2.0, 0.0),
    set(MOTOR_DE, V, 8.0, 0.0),
];

/// Loose motor foot.
const STRUCTURAL_LOOSENESS_ROWS: &[Override] = &[
    with(At("m-foot-de-l"), V, 10.0, 0.0, SECOND_ORDER_LOOSE, 0.0),
];

/// Rocking motor base.
const ROCKING_LOOSENESS_ROWS: &[Override] = &[
    with(MOTOR_DE, H, 8.0, 0.0, SECOND_ORDER_ROCKING, 0.0),
    set(MOTOR_DE, V, 2.0, 90.0),
];

/// Loose motor DE bearing fit.
const LOOSE_BEARING_FIT_ROWS: &[Override] = &[
    with(MOTOR_DE, H, 5.0, 0.0, BEARING_FIT, 0.0),
    with(MOTOR_DE, V, 4.0, 90.0, BEARING_FIT, 0.0),
];

/// Worn motor bearings.
const BEARING_WEAR_ROWS: &[Override] = &[
    with(MOTOR_NDE, V, 3.0, 0.0, BEARING_DEFECT, 2.0),
    with(MOTOR_DE, V, 2.0, 0.0, &[], 1.5),
];

/// Tooth mesh at the pump.
const GEAR_MESH_ROWS: &[Override] = &[
    with(PUMP_DE, H, 2.0, 0.0, TOOTH_MESH, 0.5),
    with(PUMP_NDE, H, 1.5, 0.0, TOOTH_MESH_FAR, 0.0),
];

/// Vertical resonance of the whole skid.
const VERTICAL_RESONANCE_ROWS: &[Override] = &[
    set(All, V, 8.0, 0.0),
    set(All, H, 1.0, 0.0),
];

/// Circular 1X.
const ORBIT_UNBALANCE_ROWS: &[Override] = &[
    set(PROBE_X, H, 40.0, 0.0),
    set(PROBE_Y, H, 40.0, 90.0),
];

/// Banana-shaped orbit.
const ORBIT_MISALIGNMENT_ROWS: &[Override] = &[
    with(PROBE_X, H, 35.0, 0.0, ORBIT_MISALIGNMENT, 0.0),
    with(PROBE_Y, H, 20.0, 120.0, ORBIT_MISALIGNMENT, 0.0),
];

/// 1X with an inner 2X loop.
const ORBIT_SHAFT_CRACK_ROWS: &[Override] = &[
    with(PROBE_X, H, 35.0, 0.0, ORBIT_CRACK, 0.0),
    with(PROBE_Y, H, 35.0, 90.0, ORBIT_CRACK, 0.0),
];

/// Large circular 1X.
const ORBIT_ROTOR_BOW_ROWS: &[Override] = &[
    set(PROBE_X, H, 60.0, 0.0),
    set(PROBE_Y, H, 60.0, 90.0),
];

/// Whirl dominated orbit.
const ORBIT_OIL_WHIRL_ROWS: &[Override] = &[
    with(PROBE_X, H, 30.0, 0.0, ORBIT_WHIRL, 0.0),
    with(PROBE_Y, H, 30.0, 90.0, ORBIT_WHIRL, 0.0),
];

/// Whip dominated orbit.
const ORBIT_OIL_WHIP_ROWS: &[Override] = &[
    with(PROBE_X, H, 50.0, 0.0, ORBIT_WHIP, 0.0),
    with(PROBE_Y, H, 50.0, 90.0, ORBIT_WHIP, 0.0),
];

/// Flattened ellipse.
const ORBIT_PRELOAD_ROWS: &[Override] = &[
    set(PROBE_X, H, 45.0, 0.0),
    set(PROBE_Y, H, 10.0, 90.0),
];

/// Rub with noise.
const ORBIT_RUB_ROWS: &[Override] = &[
    with(PROBE_X, H, 30.0, 0.0, ORBIT_RUB, 10.0),
    with(PROBE_Y, H, 30.0, 90.0, ORBIT_RUB, 10.0),
];

/// Looseness harmonics.
const ORBIT_LOOSENESS_ROWS: &[Override] = &[
    with(PROBE_X, H, 25.0, 0.0, ORBIT_LOOSENESS, 0.0),
    with(PROBE_Y, H, 30.0, 90.0, ORBIT_LOOSENESS, 0.0),
];

/// Large 1X with shifted phase.
const ORBIT_RESONANCE_ROWS: &[Override] = &[
    set(PROBE_X, H, 80.0, 180.0),
    set(PROBE_Y, H, 80.0, 270.0),
];

/// Fault signatures of the motor-coupling-pump train.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeflectionFault {
    /// Nominal low-level vibration everywhere.
    Manual,
    /// In-phase 1X across the whole train.
    StaticUnbalance,
    /// Motor bearings 180 degrees apart.
    CoupleUnbalance,
    /// Motor bearings 90 degrees apart.
    DynamicUnbalance,
    /// Pump rotor outside its bearings.
    OverhungRotor,
    /// Axial motion out of phase across the coupling.
    AngularMisalignment,
    /// Radial motion out of phase across the coupling.
    ParallelMisalignment,
    /// Angular and parallel misalignment together.
    CombinedMisalignment,
    /// Axial motion out of phase across the motor.
    BentShaft,
    /// Vertical and horizontal in phase at the drive end.
    EccentricRotor,
    /// A loose motor foot with 2X.
    StructuralLooseness,
    /// Rocking motor with 2X.
    RockingLooseness,
    /// Sub-harmonics and 2X/3X at a loose bearing.
    LooseBearingFit,
    /// Twice line frequency at a distorted foot.
    SoftFoot,
    /// Non-synchronous defect frequencies and broadband noise.
    BearingWear,
    /// Tooth meshing frequency at the pump.
    GearMesh,
    /// Dominant vertical 1X everywhere.
    VerticalResonance,
}

impl DeflectionFault {
    /// Every deflection fault in menu order.
    pub const ALL: [DeflectionFault; 17] = [
        DeflectionFault::Manual,
        DeflectionFault::StaticUnbalance,
        DeflectionFault::CoupleUnbalance,
        DeflectionFault::DynamicUnbalance,
        DeflectionFault::OverhungRotor,
        DeflectionFault::AngularMisalignment,
        DeflectionFault::ParallelMisalignment,
        DeflectionFault::CombinedMisalignment,
        DeflectionFault::BentShaft,
        DeflectionFault::EccentricRotor,
        DeflectionFault::StructuralLooseness,
        DeflectionFault::RockingLooseness,
        DeflectionFault::LooseBearingFit,
        DeflectionFault::SoftFoot,
        DeflectionFault::BearingWear,
        DeflectionFault::GearMesh,
        DeflectionFault::VerticalResonance,
    ];

    /// Stable machine-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DeflectionFault::Manual => "manual",
            DeflectionFault::StaticUnbalance => "static-unbalance",
            DeflectionFault::CoupleUnbalance => "couple-unbalance",
            DeflectionFault::DynamicUnbalance => "dynamic-unbalance",
            DeflectionFault::OverhungRotor => "overhung-rotor",
            DeflectionFault::AngularMisalignment => "angular-misalignment",
            DeflectionFault::ParallelMisalignment => "parallel-misalignment",
            DeflectionFault::CombinedMisalignment => "combined-misalignment",
            DeflectionFault::BentShaft => "bent-shaft",
            DeflectionFault::EccentricRotor => "eccentric-rotor",
            DeflectionFault::StructuralLooseness => "structural-looseness",
            DeflectionFault::RockingLooseness => "rocking-looseness",
            DeflectionFault::LooseBearingFit => "loose-bearing-fit",
            DeflectionFault::SoftFoot => "soft-foot",
            DeflectionFault::BearingWear => "bearing-wear",
            DeflectionFault::GearMesh => "gear-mesh",
            DeflectionFault::VerticalResonance => "vertical-resonance",
        }
    }

    /// Display title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            DeflectionFault::Manual => "Manual Analysis",
            DeflectionFault::StaticUnbalance => "Static Unbalance",
            DeflectionFault::CoupleUnbalance => "Couple Unbalance",
            DeflectionFault::DynamicUnbalance => "Dynamic Unbalance",
            DeflectionFault::OverhungRotor => "Overhung Rotor",
            DeflectionFault::AngularMisalignment => "Angular Misalignment",
            DeflectionFault::ParallelMisalignment => "Parallel Misalignment",
            DeflectionFault::CombinedMisalignment => "Combined Misalignment",
            DeflectionFault::BentShaft => "Bent Shaft",
            DeflectionFault::EccentricRotor => "Eccentric Rotor",
            DeflectionFault::StructuralLooseness => "Structural Looseness",
            DeflectionFault::RockingLooseness => "Rocking Looseness",
            DeflectionFault::LooseBearingFit => "Loose Bearing Fit",
            DeflectionFault::SoftFoot => "Soft Foot",
            DeflectionFault::BearingWear => "Bearing Wear",
            DeflectionFault::GearMesh => "Gear Mesh Issue",
            DeflectionFault::VerticalResonance => "Vertical Resonance",
        }
    }

    /// Rows written by this fault.
    fn overrides(self) -> &'static [Override] {
        match self {
            DeflectionFault::Manual => &[],
            DeflectionFault::StaticUnbalance => STATIC_UNBALANCE_ROWS,
            DeflectionFault::CoupleUnbalance => COUPLE_UNBALANCE_ROWS,
            DeflectionFault::DynamicUnbalance => DYNAMIC_UNBALANCE_ROWS,
            DeflectionFault::OverhungRotor => OVERHUNG_ROTOR_ROWS,
            DeflectionFault::AngularMisalignment => ANGULAR_MISALIGNMENT_ROWS,
            DeflectionFault::ParallelMisalignment => PARALLEL_MISALIGNMENT_ROWS,
            DeflectionFault::CombinedMisalignment => COMBINED_MISALIGNMENT_ROWS,
            DeflectionFault::BentShaft => BENT_SHAFT_ROWS,
            DeflectionFault::EccentricRotor => ECCENTRIC_ROTOR_ROWS,
            DeflectionFault::StructuralLooseness => STRUCTURAL_LOOSENESS_ROWS,
            DeflectionFault::RockingLooseness => ROCKING_LOOSENESS_ROWS,
            DeflectionFault::LooseBearingFit => LOOSE_BEARING_FIT_ROWS,
            DeflectionFault::SoftFoot => SOFT_FOOT_ROWS,
            DeflectionFault::BearingWear => BEARING_WEAR_ROWS,
            DeflectionFault::GearMesh => GEAR_MESH_ROWS,
            DeflectionFault::VerticalResonance => VERTICAL_RESONANCE_ROWS,
        }
    }

    /// Overwrite every signal of a deflection rig with this fault's signature.
    ///
    /// Positions and ids are untouched. The phase reference returns to the default
    /// point and all relative phases are re-derived. Applying to another rig is a no-op.
    pub fn apply(self, points: &mut PointSet, context: &PresetContext) {
        if points.rig() != Rig::Deflection {
            warn!(fault = self.name(), "deflection preset ignored on orbit rig");
            return;
        }
        let baseline = match self {
            DeflectionFault::Manual => [
                (Axis::Horizontal, MANUAL_HORIZONTAL),
                (Axis::Vertical, DEFLECTION_BASELINE),
                (Axis::Axial, DEFLECTION_BASELINE),
            ],
            _ => Axis::ALL.map(|axis| (axis, DEFLECTION_BASELINE)),
        };
        for point in points.points_mut() {
            for (axis, amplitude) in baseline {
                *point.component_mut(axis) = VibrationComponent::new(amplitude, 0.0);
            }
        }
        apply_overrides(points, self.overrides(), context);
        points.reset_reference(DEFAULT_REFERENCE_ID);
        points.normalize();
        debug!(fault = self.name(), "deflection preset applied");
    }

    /// Re-derive speed dependent orders after machine speed or line frequency change.
    ///
    /// Only rows carrying a line-frequency order are touched, and only their amplitude
    /// and harmonics; phase and noise edits made since the preset was applied survive.
    pub fn retune(self, points: &mut PointSet, context: &PresetContext) {
        if points.rig() != Rig::Deflection {
            return;
        }
        let rows = self.overrides().iter().filter(|row| row.tracks_line_frequency());
        let mut changed = false;
        for row in rows {
            let harmonics = row.resolve_harmonics(context);
            for point in points.points_mut() {
                if row.target.matches(point) {
                    let component = point.component_mut(row.axis);
                    component.amplitude = row.amplitude;
                    component.harmonics = harmonics.clone();
                    changed = true;
                }
            }
        }
        if changed {
            points.normalize();
            debug!(fault = self.name(), "line frequency order re-derived");
        }
    }
}

/// Fault signatures of the shaft orbit rig.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrbitFault {
    /// Equal circular motion at the baseline amplitude.
    Manual,
    /// Circular 1X orbit.
    Unbalance,
    /// Banana or elliptical orbit with 2X.
    Misalignment,
    /// 1X with a 2X inner loop.
    ShaftCrack,
    /// Large circular 1X.
    RotorBow,
    /// Sub-synchronous whirl near 0.45X.
    OilWhirl,
    /// Dominant sub-synchronous whip near 0.48X.
    OilWhip,
    /// Flattened orbit from a radial load.
    Preload,
    /// Half order with integer harmonics and noise.
    Rub,
    /// Integer harmonics up to 4X.
    Looseness,
    /// Large 1X with shifted phase.
    Resonance,
}

impl OrbitFault {
    /// Every orbit fault in menu order.
    pub const ALL: [OrbitFault; 11] = [
        OrbitFault::Manual,
        OrbitFault::Unbalance,
        OrbitFault::Misalignment,
        OrbitFault::ShaftCrack,
        OrbitFault::RotorBow,
        OrbitFault::OilWhirl,
        OrbitFault::OilWhip,
        OrbitFault::Preload,
        OrbitFault::Rub,
        OrbitFault::Looseness,
        OrbitFault::Resonance,
    ];

    /// Stable machine-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OrbitFault::Manual => "manual",
            OrbitFault::Unbalance => "unbalance",
            OrbitFault::Misalignment => "misalignment",
            OrbitFault::ShaftCrack => "shaft-crack",
            OrbitFault::RotorBow => "rotor-bow",
            OrbitFault::OilWhirl => "oil-whirl",
            OrbitFault::OilWhip => "oil-whip",
            OrbitFault::Preload => "preload",
            OrbitFault::Rub => "rub",
            OrbitFault::Looseness => "looseness",
            OrbitFault::Resonance => "resonance",
        }
    }

    /// Display title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            OrbitFault::Manual => "Manual Config",
            OrbitFault::Unbalance => "Unbalance (1X Circle)",
            OrbitFault::Misalignment => "Misalignment (Banana/Ellipse)",
            OrbitFault::ShaftCrack => "Shaft Crack (1X + 2X Loop)",
            OrbitFault::RotorBow => "Rotor Bow (High 1X)",
            OrbitFault::OilWhirl => "Oil Whirl",
            OrbitFault::OilWhip => "Oil Whip",
            OrbitFault::Preload => "Radial Preload",
            OrbitFault::Rub => "Rub",
            OrbitFault::Looseness => "Mechanical Looseness",
            OrbitFault::Resonance => "Resonance",
        }
    }

    /// Rows written by this fault on top of the probe baseline.
    fn overrides(self) -> &'static [Override] {
        match self {
            OrbitFault::Manual => &[],
            OrbitFault::Unbalance => ORBIT_UNBALANCE_ROWS,
            OrbitFault::Misalignment => ORBIT_MISALIGNMENT_ROWS,
            OrbitFault::ShaftCrack => ORBIT_SHAFT_CRACK_ROWS,
            OrbitFault::RotorBow => ORBIT_ROTOR_BOW_ROWS,
            OrbitFault::OilWhirl => ORBIT_OIL_WHIRL_ROWS,
            OrbitFault::OilWhip => ORBIT_OIL_WHIP_ROWS,
            OrbitFault::Preload => ORBIT_PRELOAD_ROWS,
            OrbitFault::Rub => ORBIT_RUB_ROWS,
            OrbitFault::Looseness => ORBIT_LOOSENESS_ROWS,
            OrbitFault::Resonance => ORBIT_RESONANCE_ROWS,
        }
    }

    /// Overwrite the probe signals of an orbit rig with this fault's signature.
    ///
    /// The keyphasor is never modified. Applying to another rig is a no-op.
    pub fn apply(self, points: &mut PointSet) {
        if points.rig() != Rig::Orbit {
            warn!(fault = self.name(), "orbit preset ignored on deflection rig");
            return;
        }
        for point in points.points_mut() {
            if point.id == KEYPHASOR_ID {
                continue;
            }
            point.horizontal = VibrationComponent::new(ORBIT_BASELINE, 0.0);
            point.vertical = VibrationComponent::default();
            point.axial = VibrationComponent::default();
        }
        apply_overrides(points, self.overrides(), &PresetContext::default());
        points.normalize();
        debug!(fault = self.name(), "orbit preset applied");
    }
}

/// Write table rows into matching points. Later rows win.
fn apply_overrides(points: &mut PointSet, rows: &[Override], context: &PresetContext) {
    for row in rows {
        let harmonics = row.resolve_harmonics(context);
        for point in points.points_mut() {
            if row.target.matches(point) {
                *point.component_mut(row.axis) = VibrationComponent::new(row.amplitude, row.phase)
                    .with_harmonics(harmonics.clone())
                    .with_noise(row.noise);
            }
        }
    }
}

/// Any fault preset, on either rig.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fault {
    /// A fault of the motor-coupling-pump train.
    Deflection(DeflectionFault),
    /// A fault of the shaft orbit rig.
    Orbit(OrbitFault),
}

impl fmt::Display for DeflectionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl fmt::Display for OrbitFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Deflection(fault) => fault.fmt(f),
            Fault::Orbit(fault) => fault.fmt(f),
        }
    }
}

impl FromStr for DeflectionFault {
    type Err = UnknownFault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        DeflectionFault::ALL
            .into_iter()
            .find(|fault| fault.name() == wanted)
            .ok_or_else(|| UnknownFault(s.to_string()))
    }
}

impl FromStr for OrbitFault {
    type Err = UnknownFault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        OrbitFault::ALL
            .into_iter()
            .find(|fault| fault.name() == wanted)
            .ok_or_else(|| UnknownFault(s.to_string()))
    }
}

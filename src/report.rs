//! Plain-text reports of the current measurements.

use std::fmt::Write;

use crate::orbit::CustomOrbit;
use crate::point::{Axis, PointSet, Rig, PROBE_X_ID, PROBE_Y_ID};
use crate::signal::VibrationComponent;

/// Render the plain-text measurement summary handed to a diagnostic assistant.
///
/// Deflection points list all three axes in mm/s with the reference point marked.
/// The orbit rig lists both probes in µm peak-to-peak. Phases are the absolute
/// measured values the analyst entered.
///
/// # Examples
/// ```
/// use odsx::{render_summary, PointSet};
///
/// let summary = render_summary(&PointSet::motor_train());
/// assert!(summary.contains("POINT [Motor DE Brg (ID: m-de)] <<REFERENCE PHASE>>"));
/// assert!(summary.contains("  - HORIZONTAL: 0.20 mm/s @ 0° | Dominant 1X"));
/// ```
#[must_use]
pub fn render_summary(points: &PointSet) -> String {
    let mut output = String::new();
    match points.rig() {
        Rig::Deflection => {
            for point in points {
                let marker = if point.is_reference() {
                    " <<REFERENCE PHASE>>"
                } else {
                    ""
                };
                writeln!(
                    &mut output,
                    "\nPOINT [{} (ID: {})]{marker}",
                    point.label, point.id
                )
                .expect("writing to string cannot fail");
                for axis in Axis::ALL {
                    let component = point.component(axis);
                    write!(
                        &mut output,
                        "  - {}: {:.2} mm/s @ {:.0}°",
                        axis.label().to_uppercase(),
                        component.amplitude,
                        component.measured_phase
                    )
                    .expect("writing to string cannot fail");
                    let spectrum = match harmonic_list(component, "mm/s") {
                        Some(list) => format!(" | Harmonics: [{list}]"),
                        None => " | Dominant 1X".to_string(),
                    };
                    writeln!(&mut output, "{spectrum}").expect("writing to string cannot fail");
                }
            }
        }
        Rig::Orbit => {
            // Only the probes carry shaft motion; the keyphasor is a timing mark.
            for probe in [PROBE_X_ID, PROBE_Y_ID].into_iter().filter_map(|id| points.get(id)) {
                let component = &probe.horizontal;
                writeln!(&mut output, "\nPROBE [{}]", probe.label)
                    .expect("writing to string cannot fail");
                writeln!(
                    &mut output,
                    "  - Amplitude: {:.2} µm pp (Peak-to-Peak)",
                    component.amplitude
                )
                .expect("writing to string cannot fail");
                writeln!(&mut output, "  - Phase: {:.0}°", component.measured_phase)
                    .expect("writing to string cannot fail");
                let spectrum = match harmonic_list(component, "µm") {
                    Some(list) => format!("Spectrum Peaks: [{list}]"),
                    None => "Spectrum: Dominant 1X".to_string(),
                };
                writeln!(&mut output, "  - {spectrum}").expect("writing to string cannot fail");
            }
        }
    }
    output
}

/// Render the note describing a hand-traced orbit shape.
#[must_use]
pub fn render_orbit_inspection(orbit: &CustomOrbit) -> String {
    format!(
        "\n\n**VISUAL INSPECTION (CUSTOM ORBIT):**\n\
         The user has identified and traced the following orbit shape: \"{}\".\n",
        orbit.description()
    )
}

/// Harmonic lines as absolute amplitudes, or `None` for a pure 1X signal.
fn harmonic_list(component: &VibrationComponent, unit: &str) -> Option<String> {
    if component.harmonics.is_empty() {
        return None;
    }
    let lines: Vec<String> = component
        .harmonics
        .iter()
        .map(|harmonic| {
            format!(
                "{}X: {:.2} {unit}",
                harmonic.order,
                harmonic.amplitude_ratio * component.amplitude
            )
        })
        .collect();
    Some(lines.join(", "))
}

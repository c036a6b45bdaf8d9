//! Tabular export and import of measured amplitudes and phases.
//!
//! The table carries absolute measured phases only. Harmonics and noise are not part of
//! the format: export omits them and import leaves whatever the points already carry.

use std::collections::HashSet;
use std::io::{self, Write};

use tracing::{debug, warn};

use crate::errors::TableError;
use crate::point::{Axis, PointSet};

/// Header of the identifier column.
pub const ID_COLUMN: &str = "ID";
/// Header of the label column.
pub const LABEL_COLUMN: &str = "Label";

/// Every column in export order.
pub const COLUMNS: [&str; 8] = [
    ID_COLUMN,
    LABEL_COLUMN,
    "Vertical Amp",
    "Vertical Phase",
    "Horizontal Amp",
    "Horizontal Phase",
    "Axial Amp",
    "Axial Phase",
];

/// Outcome of a successful import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Points whose values were replaced.
    pub updated: usize,
    /// Rows without an id, with an unknown id, or repeating an earlier id.
    pub skipped: usize,
}

/// Header of the amplitude column for `axis`.
fn amplitude_column(axis: Axis) -> String {
    format!("{} Amp", axis.label())
}

/// Header of the phase column for `axis`.
fn phase_column(axis: Axis) -> String {
    format!("{} Phase", axis.label())
}

/// Write `points` as CSV, one row per point in display order.
///
/// # Errors
///
/// Returns any error produced by `writer`.
pub fn write_table<W: Write>(points: &PointSet, mut writer: W) -> io::Result<()> {
    writeln!(writer, "{}", COLUMNS.join(","))?;
    for point in points {
        write!(writer, "{},{}", quote(&point.id), quote(&point.label))?;
        for axis in Axis::ALL {
            let component = point.component(axis);
            write!(writer, ",{},{}", component.amplitude, component.measured_phase)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Render `points` as a CSV string.
///
/// # Examples
/// ```
/// use odsx::table::to_csv;
/// use odsx::PointSet;
///
/// let csv = to_csv(&PointSet::orbit_rig());
/// assert!(csv.starts_with("ID,Label,Vertical Amp"));
/// assert!(csv.contains("probe-y,Probe Y,0,0,10,90,0,0"));
/// ```
#[must_use]
pub fn to_csv(points: &PointSet) -> String {
    let mut bytes = Vec::new();
    write_table(points, &mut bytes).expect("writing to a vec cannot fail");
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Merge a CSV table into `points`, matching rows by id.
///
/// Rows without an id or naming an unknown point are skipped. Cells that are missing
/// or not numeric read as zero. Labels are never imported. Relative phases are
/// recomputed once at the end.
///
/// # Errors
///
/// Returns [`TableError::Empty`] when there is no header line and
/// [`TableError::MissingColumn`] when the header has no `ID` column.
pub fn import_table(points: &mut PointSet, input: &str) -> Result<ImportSummary, TableError> {
    let mut lines = input.lines().filter(|line| !line.trim().is_empty());
    let header = split_row(lines.next().ok_or(TableError::Empty)?);
    let column = |name: &str| header.iter().position(|cell| cell.trim() == name);
    let id_index =
        column(ID_COLUMN).ok_or_else(|| TableError::MissingColumn(ID_COLUMN.to_string()))?;

    let mut value_indices = Vec::with_capacity(Axis::ALL.len());
    for axis in Axis::ALL {
        let amplitude = amplitude_column(axis);
        let phase = phase_column(axis);
        for name in [&amplitude, &phase] {
            if column(name).is_none() {
                warn!(column = %name, "column missing from table; values read as 0");
            }
        }
        value_indices.push((axis, column(&amplitude), column(&phase)));
    }

    let mut summary = ImportSummary::default();
    let mut seen = HashSet::new();
    for (line_number, line) in lines.enumerate() {
        let row = split_row(line);
        let id = row.get(id_index).map_or("", |cell| cell.trim());
        if id.is_empty() || !seen.insert(id.to_string()) {
            summary.skipped += 1;
            continue;
        }
        let values: Vec<(Axis, f64, f64)> = value_indices
            .iter()
            .map(|&(axis, amplitude, phase)| {
                (
                    axis,
                    read_cell(&row, amplitude, line_number),
                    read_cell(&row, phase, line_number),
                )
            })
            .collect();
        let updated = points.update_point(id, |point| {
            for (axis, amplitude, phase) in values {
                let component = point.component_mut(axis);
                component.amplitude = amplitude;
                component.measured_phase = phase;
            }
        });
        match updated {
            Ok(()) => summary.updated += 1,
            Err(error) => {
                debug!(%error, "table row skipped");
                summary.skipped += 1;
            }
        }
    }
    points.normalize();
    debug!(updated = summary.updated, skipped = summary.skipped, "table imported");
    Ok(summary)
}

/// Parse a numeric cell, falling back to zero.
fn read_cell(row: &[String], index: Option<usize>, line_number: usize) -> f64 {
    let Some(cell) = index.and_then(|index| row.get(index)) else {
        return 0.0;
    };
    let cell = cell.trim();
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            if !cell.is_empty() {
                warn!(row = line_number + 1, cell, "non-numeric cell read as 0");
            }
            0.0
        }
    }
}

/// Quote a field when it contains a delimiter, quote or line break.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one CSV line, honouring double-quoted fields.
fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', _) => quoted = !quoted,
            (',', false) => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::signal::Harmonic;

    #[test]
    fn export_writes_one_row_per_point() {
        let points = PointSet::motor_train();
        let csv = to_csv(&points);
        assert_eq!(csv.lines().count(), points.len() + 1);
        assert!(csv.contains("m-de,Motor DE Brg,0.1,0,0.2,0,0.1,0"));

        let mut bytes = Vec::new();
        write_table(&points, &mut bytes).expect("writing to vec");
        assert_eq!(String::from_utf8(bytes).expect("utf8"), csv);
    }

    #[test]
    fn import_skips_unknown_and_blank_ids() {
        let mut points = PointSet::motor_train();
        let input = "ID,Label,Vertical Amp,Vertical Phase,Horizontal Amp,Horizontal Phase,Axial Amp,Axial Phase\n\
                     p-de,Pump,3,45,4,60,1,10\n\
                     gearbox,Gear,1,1,1,1,1,1\n\
                     ,Blank,1,1,1,1,1,1\n";
        let summary = import_table(&mut points, input).expect("valid table");
        assert_eq!(summary, ImportSummary { updated: 1, skipped: 2 });
        let pump = points.get("p-de").expect("pump");
        assert_relative_eq!(pump.vertical.amplitude, 3.0);
        assert_relative_eq!(pump.horizontal.measured_phase, 60.0);
        assert_relative_eq!(pump.axial.measured_phase, 10.0);
        assert_eq!(pump.label, "Pump Inboard Brg");
    }

    #[test]
    fn import_reads_bad_cells_as_zero() {
        let mut points = PointSet::motor_train();
        let input = "ID,Vertical Amp,Horizontal Amp,Horizontal Phase\nm-nde,abc,2.5,\n";
        let summary = import_table(&mut points, input).expect("valid table");
        assert_eq!(summary.updated, 1);
        let motor = points.get("m-nde").expect("motor nde");
        assert_eq!(motor.vertical.amplitude, 0.0);
        assert_relative_eq!(motor.horizontal.amplitude, 2.5);
        assert_eq!(motor.axial.amplitude, 0.0);
    }

    #[test]
    fn import_keeps_harmonics_and_recomputes_phases() {
        let mut points = PointSet::motor_train();
        points
            .update_point("p-nde", |p| {
                p.horizontal.harmonics = vec![Harmonic::new(2.0, 0.5, 0.0)];
                p.horizontal.noise_level = 1.0;
            })
            .expect("known point");
        let input = "ID,Horizontal Amp,Horizontal Phase\nm-de,1,100\np-nde,2,130\n";
        import_table(&mut points, input).expect("valid table");
        let pump = points.get("p-nde").expect("pump");
        assert_eq!(pump.horizontal.harmonics.len(), 1);
        assert_relative_eq!(pump.horizontal.noise_level, 1.0);
        assert_relative_eq!(pump.horizontal.relative_phase(), 30.0);
    }

    #[test]
    fn import_requires_an_id_column() {
        let mut points = PointSet::motor_train();
        assert_eq!(import_table(&mut points, ""), Err(TableError::Empty));
        assert_eq!(
            import_table(&mut points, "Label,Vertical Amp\nx,1\n"),
            Err(TableError::MissingColumn("ID".to_string()))
        );
    }

    #[test]
    fn quoted_labels_survive() {
        assert_eq!(quote("Brg, inboard"), "\"Brg, inboard\"");
        assert_eq!(
            split_row("a,\"Brg, \"\"inboard\"\"\",3"),
            vec!["a".to_string(), "Brg, \"inboard\"".to_string(), "3".to_string()]
        );
    }
}

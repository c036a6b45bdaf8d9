//! Error types produced while editing point sets, importing tables or loading configuration.
//!
//! Signal evaluation itself never fails; these errors only appear at the edges where
//! user input or external data enters the engine.

use thiserror::Error;

/// Error returned when editing a [`PointSet`](crate::PointSet) with an unknown identifier.
///
/// # Examples
///
/// ```
/// use odsx::{PointEditError, PointSet};
///
/// let mut points = PointSet::motor_train();
/// let error = points
///     .set_reference("gearbox")
///     .expect_err("unknown point is rejected");
/// assert_eq!(error, PointEditError::UnknownPoint("gearbox".to_string()));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PointEditError {
    /// Returned when a point id cannot be found in the set.
    #[error("point {0:?} does not exist in this point set")]
    UnknownPoint(String),
    /// Returned when the phase reference is changed on a rig that has no reference.
    #[error("the orbit rig has no user-settable phase reference")]
    ReferenceNotSupported,
    /// Returned when a point set is built with two points sharing an id.
    #[error("point id {0:?} appears more than once")]
    DuplicatePoint(String),
    /// Returned when an edit changes the id or position of a point.
    #[error("the {field} of point {id:?} cannot be edited")]
    FixedField {
        /// Id of the point that was edited.
        id: String,
        /// Name of the field the edit tried to change.
        field: &'static str,
    },
}

/// Error returned when a fault preset name cannot be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown fault preset {0:?}")]
pub struct UnknownFault(pub String);

/// Error returned when a measurement table cannot be imported at all.
///
/// Problems confined to a single row never produce this error; such rows are skipped
/// and counted in the [`ImportSummary`](crate::table::ImportSummary).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// Returned when the input has no header line.
    #[error("table is empty")]
    Empty,
    /// Returned when a required column is absent from the header.
    #[error("table header is missing column {0:?}")]
    MissingColumn(String),
}

/// Error returned when a custom traced orbit is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum OrbitPathError {
    /// Returned when the traced polyline has no points.
    #[error("custom orbit path has no points")]
    Empty,
    /// Returned when a coordinate is NaN or infinite.
    #[error("custom orbit point {index} is not finite")]
    NonFinite {
        /// Position of the offending sample in the path.
        index: usize,
    },
}

/// Error returned when loading or validating a [`SimulationConfig`](crate::SimulationConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when the configuration file cannot be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// Returned when the configuration is not valid JSON for the expected schema.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// Returned when a value is outside of its physical range.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the constraint that was violated.
        reason: String,
    },
}

//! Error types for the post-processing pipeline.

use std::path::PathBuf;

/// Error type for all fallible pipeline operations.
///
/// Resolution errors (`NotFound`, `UndefinedDestinationGrid`,
/// `MissingArgument`, invalid ROI or grid hints) are caller-configuration
/// problems and abort the run. Data-sufficiency conditions and unsupported
/// output formats are not errors; they are only logged.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Returned when no registered processor has the requested name.
    #[error("no post processor with name {name} found")]
    NotFound {
        /// Name that was looked up.
        name: String,
    },

    /// Returned when a non-WGS84 ROI grid is given without a destination grid.
    #[error("cannot derive destination grid for roi grid {roi_grid}, please specify a destination grid")]
    UndefinedDestinationGrid {
        /// The ROI grid hint as given by the caller.
        roi_grid: String,
    },

    /// Returned when a required run argument was not supplied.
    #[error("missing argument '{argument}' required by post processor {processor}")]
    MissingArgument {
        /// Name of the missing argument.
        argument: &'static str,
        /// Processor that needs it.
        processor: String,
    },

    #[error("invalid region of interest: {reason}")]
    InvalidRoi { reason: String },

    #[error("spatial resolution must be a positive number, got {value}")]
    InvalidResolution { value: f64 },

    #[error("invalid spatial reference '{hint}': {reason}")]
    InvalidSpatialReference { hint: String, reason: String },

    /// Returned when an indicator array does not fit the destination grid.
    #[error("array for {} has shape {got:?}, destination grid is {expected:?}", .path.display())]
    ShapeMismatch {
        path: PathBuf,
        /// `(rows, cols)` of the destination grid.
        expected: (usize, usize),
        /// `(rows, cols)` of the offending array.
        got: (usize, usize),
    },

    /// Returned by a processor implementation that cannot compute its indicators.
    #[error("post processor {processor} failed: {reason}")]
    Processor { processor: String, reason: String },

    #[error("file discovery failed: {reason}")]
    Discovery { reason: String },

    #[error(transparent)]
    Gdal(#[from] gdal::errors::GdalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<glob::PatternError> for PipelineError {
    fn from(e: glob::PatternError) -> Self {
        PipelineError::Discovery {
            reason: e.to_string(),
        }
    }
}

impl From<walkdir::Error> for PipelineError {
    fn from(e: walkdir::Error) -> Self {
        PipelineError::Discovery {
            reason: e.to_string(),
        }
    }
}

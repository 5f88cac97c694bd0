//! Derivation of the destination grid from a region of interest.
//!
//! The rules deciding which reference systems are used when grid hints are
//! missing:
//!
//! | roi grid   | destination grid | result                                   |
//! |------------|------------------|------------------------------------------|
//! | none       | none             | ROI in WGS84, output in UTM of centroid  |
//! | none       | given            | ROI already in the destination grid      |
//! | WGS84      | none             | output in UTM of centroid                |
//! | other      | none             | error                                    |
//! | given      | given            | both used as given                       |

pub mod reprojection;
pub mod roi;
pub mod srs;

pub use reprojection::{DestinationGrid, Reprojection, read_band, write_band};
pub use roi::{Bbox, Roi};

use crate::error::{PipelineError, Result};

/// Resolves the reprojection from the ROI onto the destination grid.
pub fn resolve(
    spatial_resolution: f64,
    roi: &Roi,
    roi_grid: Option<&str>,
    destination_grid: Option<&str>,
) -> Result<Reprojection> {
    let bounds = roi.bounds()?;
    let center = roi.centroid()?;

    let roi_srs = srs::reference_system(roi_grid)?;
    let destination_srs = srs::reference_system(destination_grid)?;

    let (roi_srs, destination_srs) = match (roi_srs, destination_srs) {
        (None, None) => (srs::wgs84()?, srs::projected_srs(center)?),
        (None, Some(destination_srs)) => (destination_srs.clone(), destination_srs),
        (Some(roi_srs), None) => {
            if roi_srs == srs::wgs84()? {
                let destination_srs = srs::projected_srs(center)?;
                (roi_srs, destination_srs)
            } else {
                return Err(PipelineError::UndefinedDestinationGrid {
                    roi_grid: roi_grid.unwrap_or_default().to_string(),
                });
            }
        }
        (Some(roi_srs), Some(destination_srs)) => (roi_srs, destination_srs),
    };

    Reprojection::new(
        bounds,
        spatial_resolution,
        spatial_resolution,
        destination_srs,
        roi_srs,
    )
}

/// Everything needed to derive the destination grid of a run.
#[derive(Debug, Clone)]
pub struct GridRequest {
    pub roi: Roi,
    pub spatial_resolution: f64,
    pub roi_grid: Option<String>,
    pub destination_grid: Option<String>,
}

impl GridRequest {
    pub fn new(roi: impl Into<Roi>, spatial_resolution: f64) -> Self {
        Self {
            roi: roi.into(),
            spatial_resolution,
            roi_grid: None,
            destination_grid: None,
        }
    }

    pub fn with_roi_grid(mut self, roi_grid: impl Into<String>) -> Self {
        self.roi_grid = Some(roi_grid.into());
        self
    }

    pub fn with_destination_grid(mut self, destination_grid: impl Into<String>) -> Self {
        self.destination_grid = Some(destination_grid.into());
        self
    }

    pub fn reprojection(&self) -> Result<Reprojection> {
        resolve(
            self.spatial_resolution,
            &self.roi,
            self.roi_grid.as_deref(),
            self.destination_grid.as_deref(),
        )
    }
}

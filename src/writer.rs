//! Persisting indicator rasters.
//!
//! Output geometry never depends on the data being written: it is taken from
//! a fixed global reference raster reprojected onto the destination grid, so
//! every raster of a run shares width, height and geotransform.

use chrono::NaiveDateTime;
use gdal::{Dataset, DriverManager};
use ndarray::Array2;
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::indicator::IndicatorRaster;
use crate::spatial::{GridRequest, srs, write_band};

const DATE_FORMAT: &str = "%Y%m%d";

// 1 degree global raster, rows cover 90N to 0
const REFERENCE_WIDTH: usize = 360;
const REFERENCE_HEIGHT: usize = 90;
const REFERENCE_GEO_TRANSFORM: [f64; 6] = [-180.0, 1.0, 0.0, 90.0, 0.0, -1.0];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    GeoTiff,
    Unsupported(String),
}

/// Every name other than `GeoTiff` or `GTiff` (any case) is unsupported.
impl From<&str> for OutputFormat {
    fn from(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "geotiff" | "gtiff" => OutputFormat::GeoTiff,
            _ => OutputFormat::Unsupported(name.to_string()),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(OutputFormat::from(s))
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::GeoTiff => write!(f, "GeoTiff"),
            OutputFormat::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

/// `{indicator}_{YYYYMMDD}.tif`
pub fn single_date_file_name(indicator: &str, date: NaiveDateTime) -> String {
    format!("{}_{}.tif", indicator, date.format(DATE_FORMAT))
}

/// `{indicator}_{YYYYMMDD}_{YYYYMMDD}.tif`
pub fn date_range_file_name(indicator: &str, start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!(
        "{}_{}_{}.tif",
        indicator,
        start.format(DATE_FORMAT),
        end.format(DATE_FORMAT)
    )
}

/// Writes `rasters` on the destination grid of `grid`.
///
/// Returns the written files. Formats other than GeoTIFF are reported and
/// skipped.
pub fn write(
    rasters: &[IndicatorRaster],
    grid: &GridRequest,
    format: &OutputFormat,
) -> Result<Vec<PathBuf>> {
    let reprojection = grid.reprojection()?;

    if let OutputFormat::Unsupported(name) = format {
        warn!(
            "Writing of {} not supported. Can not write post-processing results.",
            name
        );
        return Ok(Vec::new());
    }

    let reprojected = reprojection.reproject(&reference_dataset()?)?;
    let (width, height) = reprojected.raster_size();
    let geo_transform = reprojected.geo_transform()?;
    let projection = reprojection.destination_srs().to_wkt()?;

    for raster in rasters {
        if raster.data.dim() != (height, width) {
            return Err(PipelineError::ShapeMismatch {
                path: raster.file_name.clone(),
                expected: (height, width),
                got: raster.data.dim(),
            });
        }
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut written = Vec::with_capacity(rasters.len());
    for raster in rasters {
        if let Some(parent) = raster.file_name.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut dataset =
            driver.create_with_band_type::<f32, _>(&raster.file_name, width, height, 1)?;
        dataset.set_geo_transform(&geo_transform)?;
        dataset.set_projection(&projection)?;
        write_band(&dataset, &raster.data)?;

        info!("✓ Saved {}", raster.file_name.display());
        written.push(raster.file_name.clone());
    }

    Ok(written)
}

fn reference_dataset() -> Result<Dataset> {
    let driver = DriverManager::get_driver_by_name("MEM")?;
    let mut dataset =
        driver.create_with_band_type::<f32, _>("", REFERENCE_WIDTH, REFERENCE_HEIGHT, 1)?;
    dataset.set_geo_transform(&REFERENCE_GEO_TRANSFORM)?;
    dataset.set_projection(&srs::wgs84()?.to_wkt()?)?;
    write_band(
        &dataset,
        &Array2::ones((REFERENCE_HEIGHT, REFERENCE_WIDTH)),
    )?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::read_band;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    const ROI: &str = "POLYGON((9.0 48.5, 9.1 48.5, 9.1 48.6, 9.0 48.6, 9.0 48.5))";

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            single_date_file_name("SMA", day(2020, 3, 4)),
            "SMA_20200304.tif"
        );
        assert_eq!(
            date_range_file_name("BurnSeverity", day(2020, 1, 1), day(2020, 1, 16)),
            "BurnSeverity_20200101_20200116.tif"
        );
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("GeoTiff".parse::<OutputFormat>().unwrap(), OutputFormat::GeoTiff);
        assert_eq!("GTiff".parse::<OutputFormat>().unwrap(), OutputFormat::GeoTiff);
        assert_eq!(OutputFormat::from("gtiff"), OutputFormat::GeoTiff);
        assert_eq!(
            OutputFormat::from("Zarr"),
            OutputFormat::Unsupported("Zarr".to_string())
        );
        assert_eq!(
            "NetCDF".parse::<OutputFormat>().unwrap(),
            OutputFormat::Unsupported("NetCDF".to_string())
        );
    }

    #[test]
    fn test_all_outputs_share_grid_geometry() {
        let dir = tempdir().unwrap();
        let grid = GridRequest::new(ROI, 0.01).with_roi_grid("EPSG:4326").with_destination_grid("EPSG:4326");
        let (width, height) = {
            let g = grid.reprojection().unwrap().grid();
            (g.width, g.height)
        };

        let rasters: Vec<IndicatorRaster> = (0..3)
            .map(|i| IndicatorRaster {
                file_name: dir.path().join(format!("I{}_20200101.tif", i)),
                data: Array2::from_elem((height, width), i as f32),
            })
            .collect();

        let written = write(&rasters, &grid, &OutputFormat::GeoTiff).unwrap();
        assert_eq!(written.len(), 3);

        let datasets: Vec<Dataset> = written.iter().map(|p| Dataset::open(p).unwrap()).collect();
        let first = &datasets[0];
        for dataset in &datasets {
            assert_eq!(dataset.raster_size(), (width, height));
            assert_eq!(dataset.geo_transform().unwrap(), first.geo_transform().unwrap());
        }
        assert_eq!(read_band(&datasets[2], 1).unwrap()[[0, 0]], 2.0);
    }

    #[test]
    fn test_unsupported_format_writes_nothing() {
        let dir = tempdir().unwrap();
        let grid = GridRequest::new(ROI, 100.0);
        let rasters = vec![IndicatorRaster {
            file_name: dir.path().join("SMA_20200304.tif"),
            data: Array2::zeros((1, 1)),
        }];

        let written = write(
            &rasters,
            &grid,
            &OutputFormat::Unsupported("NetCDF".to_string()),
        )
        .unwrap();

        assert!(written.is_empty());
        assert!(!dir.path().join("SMA_20200304.tif").exists());
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let dir = tempdir().unwrap();
        let grid = GridRequest::new(ROI, 100.0);
        let rasters = vec![IndicatorRaster {
            file_name: dir.path().join("SMA_20200304.tif"),
            data: Array2::zeros((1, 1)),
        }];
        assert!(matches!(
            write(&rasters, &grid, &OutputFormat::GeoTiff),
            Err(PipelineError::ShapeMismatch { .. })
        ));
    }
}

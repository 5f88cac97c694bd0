use std::fmt;

use gdal::raster::Buffer;
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use gdal::{Dataset, DriverManager, GeoTransform};
use ndarray::Array2;
use tracing::debug;

use super::roi::Bbox;
use super::srs::traditional_order;
use crate::error::{PipelineError, Result};

// Extra points sampled along each edge when transforming the ROI bounds
const DENSIFY_POINTS: i32 = 21;

/// Pixel geometry of the destination grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestinationGrid {
    pub width: usize,
    pub height: usize,
    pub geo_transform: GeoTransform,
}

/// Maps rasters from their own grid onto one destination grid.
///
/// The destination grid is the ROI bounding box, transformed from the
/// source reference system into the destination one, cut into pixels of
/// `pixel_size_x` by `pixel_size_y`.
pub struct Reprojection {
    bounds: Bbox,
    pixel_size_x: f64,
    pixel_size_y: f64,
    destination_srs: SpatialRef,
    source_srs: SpatialRef,
    grid: DestinationGrid,
}

impl Reprojection {
    pub fn new(
        bounds: Bbox,
        pixel_size_x: f64,
        pixel_size_y: f64,
        destination_srs: SpatialRef,
        source_srs: SpatialRef,
    ) -> Result<Self> {
        for value in [pixel_size_x, pixel_size_y] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PipelineError::InvalidResolution { value });
            }
        }

        let transform = CoordTransform::new(&source_srs, &destination_srs)?;
        let [xmin, ymin, xmax, ymax] = transform.transform_bounds(
            &[bounds.xmin, bounds.ymin, bounds.xmax, bounds.ymax],
            DENSIFY_POINTS,
        )?;

        let width = ((xmax - xmin) / pixel_size_x).round().max(1.0) as usize;
        let height = ((ymax - ymin) / pixel_size_y).round().max(1.0) as usize;
        let grid = DestinationGrid {
            width,
            height,
            geo_transform: [xmin, pixel_size_x, 0.0, ymax, 0.0, -pixel_size_y],
        };

        Ok(Self {
            bounds,
            pixel_size_x,
            pixel_size_y,
            destination_srs,
            source_srs,
            grid,
        })
    }

    pub fn bounds(&self) -> Bbox {
        self.bounds
    }

    pub fn pixel_size(&self) -> (f64, f64) {
        (self.pixel_size_x, self.pixel_size_y)
    }

    pub fn destination_srs(&self) -> &SpatialRef {
        &self.destination_srs
    }

    pub fn source_srs(&self) -> &SpatialRef {
        &self.source_srs
    }

    pub fn grid(&self) -> DestinationGrid {
        self.grid
    }

    /// Samples band `band_index` of `dataset` onto the destination grid.
    ///
    /// Each destination pixel takes the value of the source pixel containing
    /// its centre. Pixels outside the source raster, source nodata and rows
    /// whose coordinates cannot be transformed are NaN. Only the source
    /// window covering the destination grid is read.
    pub fn reproject_band(&self, dataset: &Dataset, band_index: usize) -> Result<Array2<f32>> {
        let (source_cols, source_rows) = dataset.raster_size();
        let source_gt = dataset.geo_transform()?;
        let source_srs = traditional_order(dataset.spatial_ref()?);
        let to_source = CoordTransform::new(&self.destination_srs, &source_srs)?;

        let DestinationGrid {
            width,
            height,
            geo_transform: gt,
        } = self.grid;
        let mut output = Array2::from_elem((height, width), f32::NAN);

        let mut lookup = Array2::<Option<(usize, usize)>>::from_elem((height, width), None);
        for row in 0..height {
            let y = gt[3] + (row as f64 + 0.5) * gt[5];
            let mut xs: Vec<f64> = (0..width)
                .map(|col| gt[0] + (col as f64 + 0.5) * gt[1])
                .collect();
            let mut ys = vec![y; width];
            let mut zs = vec![0.0; width];
            if let Err(e) = to_source.transform_coords(&mut xs, &mut ys, &mut zs) {
                debug!("Row {} of the destination grid left empty: {}", row, e);
                continue;
            }

            for col in 0..width {
                lookup[[row, col]] = pixel_of(&source_gt, xs[col], ys[col], source_rows, source_cols);
            }
        }

        let Some(window) = SourceWindow::covering(lookup.iter().flatten()) else {
            return Ok(output);
        };
        let source = read_window(dataset, band_index, window.offset(), window.size())?;

        for ((row, col), pixel) in lookup.indexed_iter() {
            if let Some((r, c)) = pixel {
                output[[row, col]] = source[[r - window.row, c - window.col]];
            }
        }

        Ok(output)
    }

    /// Reprojects the first band of `dataset` into an in-memory dataset on
    /// the destination grid.
    pub fn reproject(&self, dataset: &Dataset) -> Result<Dataset> {
        let data = self.reproject_band(dataset, 1)?;
        let wkt = self.destination_srs.to_wkt()?;
        let driver = DriverManager::get_driver_by_name("MEM")?;
        let mut target = driver.create_with_band_type::<f32, _>(
            "",
            self.grid.width,
            self.grid.height,
            1,
        )?;
        target.set_geo_transform(&self.grid.geo_transform)?;
        target.set_projection(&wkt)?;
        write_band(&target, &data)?;
        Ok(target)
    }
}

impl fmt::Debug for Reprojection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reprojection")
            .field("bounds", &self.bounds)
            .field("pixel_size_x", &self.pixel_size_x)
            .field("pixel_size_y", &self.pixel_size_y)
            .field("destination_srs", &self.destination_srs.auth_code().ok())
            .field("source_srs", &self.source_srs.auth_code().ok())
            .field("grid", &self.grid)
            .finish()
    }
}

/// Reads a whole band as a `(rows, cols)` array, nodata as NaN.
pub fn read_band(dataset: &Dataset, band_index: usize) -> Result<Array2<f32>> {
    read_window(dataset, band_index, (0, 0), dataset.raster_size())
}

/// Reads `size` (cols, rows) pixels from `offset` (col, row), nodata as NaN.
pub fn read_window(
    dataset: &Dataset,
    band_index: usize,
    offset: (isize, isize),
    size: (usize, usize),
) -> Result<Array2<f32>> {
    let band = dataset.rasterband(band_index)?;
    let buffer = band.read_as::<f32>(offset, size, size, None)?;
    let (cols, rows) = size;
    let mut data = Array2::from_shape_vec((rows, cols), buffer.data().to_vec())?;

    let missing_value = band.no_data_value();
    if let Some(mv) = missing_value.map(|mv| mv as f32)
        && !mv.is_nan()
    {
        data.mapv_inplace(|v| if v == mv { f32::NAN } else { v });
    }
    Ok(data)
}

// Smallest block of source pixels holding every sampled pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceWindow {
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
}

impl SourceWindow {
    fn covering<'a>(pixels: impl Iterator<Item = &'a (usize, usize)>) -> Option<Self> {
        let mut bounds: Option<(usize, usize, usize, usize)> = None;
        for &(r, c) in pixels {
            bounds = Some(match bounds {
                None => (r, r, c, c),
                Some((r0, r1, c0, c1)) => (r0.min(r), r1.max(r), c0.min(c), c1.max(c)),
            });
        }
        bounds.map(|(r0, r1, c0, c1)| SourceWindow {
            row: r0,
            col: c0,
            rows: r1 - r0 + 1,
            cols: c1 - c0 + 1,
        })
    }

    fn offset(&self) -> (isize, isize) {
        (self.col as isize, self.row as isize)
    }

    fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }
}

/// Writes `data` into band 1 of `dataset`, which must have the same size.
pub fn write_band(dataset: &Dataset, data: &Array2<f32>) -> Result<()> {
    let (rows, cols) = data.dim();
    let mut band = dataset.rasterband(1)?;
    let mut buffer = Buffer::new((cols, rows), data.iter().copied().collect());
    band.write((0, 0), (cols, rows), &mut buffer)?;
    Ok(())
}

// Inverse of the affine geotransform, truncated to the containing pixel
fn pixel_of(
    gt: &GeoTransform,
    x: f64,
    y: f64,
    rows: usize,
    cols: usize,
) -> Option<(usize, usize)> {
    let det = gt[1] * gt[5] - gt[2] * gt[4];
    if det == 0.0 || !x.is_finite() || !y.is_finite() {
        return None;
    }
    let dx = x - gt[0];
    let dy = y - gt[3];
    let col = ((gt[5] * dx - gt[2] * dy) / det).floor();
    let row = ((gt[1] * dy - gt[4] * dx) / det).floor();

    if col < 0.0 || row < 0.0 || col >= cols as f64 || row >= rows as f64 {
        return None;
    }
    Some((row as usize, col as usize))
}

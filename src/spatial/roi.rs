use gdal::vector::Geometry as GdalGeometry;
use geo::{BoundingRect, Centroid, Point, Polygon};

use crate::error::{PipelineError, Result};

/// Axis-aligned bounds of a region, in the units of its reference system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bbox {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        if ![xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite()) {
            return Err(invalid("bounds must be finite"));
        }

        if xmin > xmax || ymin > ymax {
            return Err(invalid("min values must be <= max values"));
        }

        Ok(Bbox {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }
}

/// Region of interest, either as well-known text or as a polygon.
#[derive(Debug, Clone, PartialEq)]
pub enum Roi {
    Wkt(String),
    Polygon(Polygon<f64>),
}

impl From<&str> for Roi {
    fn from(wkt: &str) -> Self {
        Roi::Wkt(wkt.to_string())
    }
}

impl From<String> for Roi {
    fn from(wkt: String) -> Self {
        Roi::Wkt(wkt)
    }
}

impl From<Polygon<f64>> for Roi {
    fn from(polygon: Polygon<f64>) -> Self {
        Roi::Polygon(polygon)
    }
}

impl Roi {
    pub fn polygon(&self) -> Result<Polygon<f64>> {
        match self {
            Roi::Polygon(polygon) => Ok(polygon.clone()),
            Roi::Wkt(wkt) => {
                let geometry = GdalGeometry::from_wkt(wkt.trim())
                    .and_then(|g| g.to_geo())
                    .map_err(|e| invalid(&format!("cannot parse '{}': {}", wkt, e)))?;
                match geometry {
                    geo::Geometry::Polygon(polygon) => Ok(polygon),
                    other => Err(invalid(&format!(
                        "expected a POLYGON, got {}",
                        geometry_kind(&other)
                    ))),
                }
            }
        }
    }

    pub fn bounds(&self) -> Result<Bbox> {
        let rect = self
            .polygon()?
            .bounding_rect()
            .ok_or_else(|| invalid("polygon is empty"))?;
        Bbox::new(rect.min().x, rect.max().x, rect.min().y, rect.max().y)
    }

    pub fn centroid(&self) -> Result<Point<f64>> {
        self.polygon()?
            .centroid()
            .ok_or_else(|| invalid("polygon is empty"))
    }
}

fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "POINT",
        geo::Geometry::Line(_) | geo::Geometry::LineString(_) => "LINESTRING",
        geo::Geometry::MultiPolygon(_) => "MULTIPOLYGON",
        geo::Geometry::MultiPoint(_) => "MULTIPOINT",
        geo::Geometry::MultiLineString(_) => "MULTILINESTRING",
        _ => "non-polygon geometry",
    }
}

fn invalid(reason: &str) -> PipelineError {
    PipelineError::InvalidRoi {
        reason: reason.to_string(),
    }
}

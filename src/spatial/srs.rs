use gdal::spatial_ref::{AxisMappingStrategy, SpatialRef};
use geo::Point;

use crate::error::{PipelineError, Result};

pub const WGS84_EPSG: u32 = 4326;

const EPSG_PREFIX: &str = "EPSG:";

/// Parses a grid hint: `EPSG:<code>` imports by code, anything else is WKT.
pub fn reference_system(hint: Option<&str>) -> Result<Option<SpatialRef>> {
    let Some(hint) = hint else {
        return Ok(None);
    };

    let srs = match hint.strip_prefix(EPSG_PREFIX) {
        Some(code) => {
            let code: u32 = code.trim().parse().map_err(|_| invalid(hint, "not an EPSG code"))?;
            SpatialRef::from_epsg(code).map_err(|e| invalid(hint, &e.to_string()))?
        }
        None => SpatialRef::from_wkt(hint).map_err(|e| invalid(hint, &e.to_string()))?,
    };

    Ok(Some(traditional_order(srs)))
}

pub fn wgs84() -> Result<SpatialRef> {
    Ok(traditional_order(SpatialRef::from_epsg(WGS84_EPSG)?))
}

/// UTM zone containing `longitude`, `floor((lon + 180) / 6) + 1`.
///
/// The formula yields 61 at exactly 180°E; that meridian belongs to zone 60.
pub fn utm_zone(longitude: f64) -> u32 {
    let zone = ((longitude + 180.0) / 6.0).floor() as i64 + 1;
    zone.clamp(1, 60) as u32
}

pub fn is_northern(latitude: f64) -> bool {
    latitude > 0.0
}

/// EPSG code of WGS84 / UTM for the given zone and hemisphere.
pub fn utm_epsg(zone: u32, northern: bool) -> u32 {
    if northern { 32600 + zone } else { 32700 + zone }
}

/// The UTM projection the ROI centroid falls into.
pub fn projected_srs(center: Point<f64>) -> Result<SpatialRef> {
    let epsg = utm_epsg(utm_zone(center.x()), is_northern(center.y()));
    Ok(traditional_order(SpatialRef::from_epsg(epsg)?))
}

/// Sets x = easting/longitude axis order so coordinates match geotransforms.
pub fn traditional_order(mut srs: SpatialRef) -> SpatialRef {
    srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    srs
}

fn invalid(hint: &str, reason: &str) -> PipelineError {
    PipelineError::InvalidSpatialReference {
        hint: hint.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utm_zone() {
        assert_eq!(utm_zone(9.0), 32);
        assert_eq!(utm_zone(-123.0), 10);
        assert_eq!(utm_zone(-180.0), 1);
        assert_eq!(utm_zone(179.9), 60);
        assert_eq!(utm_zone(180.0), 60);
        assert_eq!(utm_zone(3.0), 31);
    }

    #[test]
    fn test_hemisphere() {
        assert!(is_northern(0.1));
        assert!(!is_northern(0.0));
        assert!(!is_northern(-33.9));
    }

    #[test]
    fn test_utm_epsg() {
        assert_eq!(utm_epsg(32, true), 32632);
        assert_eq!(utm_epsg(10, false), 32710);
    }

    #[test]
    fn test_reference_system_from_hint() {
        assert!(reference_system(None).unwrap().is_none());

        let epsg = reference_system(Some("EPSG:32632")).unwrap().unwrap();
        let wkt = epsg.to_wkt().unwrap();
        let from_wkt = reference_system(Some(&wkt)).unwrap().unwrap();
        assert!(epsg == from_wkt);
        assert!(epsg != wgs84().unwrap());
    }

    #[test]
    fn test_reference_system_rejects_garbage() {
        assert!(matches!(
            reference_system(Some("EPSG:abc")),
            Err(PipelineError::InvalidSpatialReference { .. })
        ));
        assert!(reference_system(Some("definitely not wkt")).is_err());
    }
}

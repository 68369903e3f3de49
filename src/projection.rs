//! Coordinate reference systems and reprojection into a planar metre grid.
//!
//! Only the two systems the map pipelines exchange are supported: geographic
//! WGS84 (EPSG:4326, x = longitude, y = latitude in degrees) and spherical Web
//! Mercator (EPSG:3857, metres). Distances are only meaningful in the latter.

use crate::error::AnalysisError;
use crate::types::{Anchor, TextDetection};
use geo::{Coord, Geometry, MapCoords};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Spherical Mercator earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Latitude at which Web Mercator becomes square.
pub const MAX_MERCATOR_LAT_DEG: f64 = 85.051_128_78;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Crs {
    #[serde(rename = "EPSG:4326")]
    Wgs84,
    #[serde(rename = "EPSG:3857")]
    WebMercator,
}

impl Crs {
    pub fn epsg(self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
        }
    }

    pub fn from_epsg(code: u32) -> Result<Self, AnalysisError> {
        match code {
            4326 => Ok(Crs::Wgs84),
            3857 | 900913 => Ok(Crs::WebMercator),
            other => Err(AnalysisError::UnsupportedCrs(format!("EPSG:{other}"))),
        }
    }

    /// Whether Euclidean distances in this CRS are in linear units.
    pub fn is_planar(self) -> bool {
        matches!(self, Crs::WebMercator)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Accepts `EPSG:3857`, `epsg:3857`, `3857`, `urn:ogc:def:crs:EPSG::3857`
/// and `urn:ogc:def:crs:OGC:1.3:CRS84`.
impl FromStr for Crs {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        if upper.ends_with("CRS84") {
            return Ok(Crs::Wgs84);
        }
        let code = upper.rsplit(':').next().unwrap_or(&upper);
        code.parse::<u32>()
            .map_err(|_| AnalysisError::UnsupportedCrs(trimmed.to_string()))
            .and_then(Crs::from_epsg)
    }
}

/// A point-wise coordinate transform.
pub trait Projection {
    fn project(&self, c: Coord<f64>) -> Coord<f64>;
}

/// WGS84 degrees to spherical Web Mercator metres.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn project(&self, c: Coord<f64>) -> Coord<f64> {
        let lat = c.y.clamp(-MAX_MERCATOR_LAT_DEG, MAX_MERCATOR_LAT_DEG).to_radians();
        Coord {
            x: EARTH_RADIUS_M * c.x.to_radians(),
            y: EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
        }
    }
}

/// Web Mercator metres back to WGS84 degrees.
#[derive(Clone, Copy, Debug, Default)]
pub struct InverseWebMercator;

impl Projection for InverseWebMercator {
    fn project(&self, c: Coord<f64>) -> Coord<f64> {
        let lat = 2.0 * (c.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2;
        Coord {
            x: (c.x / EARTH_RADIUS_M).to_degrees(),
            y: lat.to_degrees(),
        }
    }
}

/// Apply `projection` to every coordinate of `geometry`.
pub fn project_geometry<P: Projection>(geometry: &Geometry<f64>, projection: &P) -> Geometry<f64> {
    geometry.map_coords(|c| projection.project(c))
}

/// Reproject `geometry` from `from` into `to`.
pub fn reproject(geometry: &Geometry<f64>, from: Crs, to: Crs) -> Geometry<f64> {
    match (from, to) {
        (Crs::Wgs84, Crs::WebMercator) => project_geometry(geometry, &WebMercator),
        (Crs::WebMercator, Crs::Wgs84) => project_geometry(geometry, &InverseWebMercator),
        _ => geometry.clone(),
    }
}

/// A record carrying a geometry and a cached centroid.
pub trait Located: Sized {
    fn geometry(&self) -> &Geometry<f64>;
    /// Same record with a replaced geometry; `None` when it has no centroid.
    fn with_geometry(&self, geometry: Geometry<f64>) -> Option<Self>;
}

impl Located for Anchor {
    fn geometry(&self) -> &Geometry<f64> {
        Anchor::geometry(self)
    }

    fn with_geometry(&self, geometry: Geometry<f64>) -> Option<Self> {
        Anchor::with_geometry(self, geometry)
    }
}

impl Located for TextDetection {
    fn geometry(&self) -> &Geometry<f64> {
        TextDetection::geometry(self)
    }

    fn with_geometry(&self, geometry: Geometry<f64>) -> Option<Self> {
        TextDetection::with_geometry(self, geometry)
    }
}

/// A collection of records tagged with the CRS of their coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer<T> {
    pub crs: Crs,
    pub items: Vec<T>,
}

impl<T: Located + Clone> Layer<T> {
    pub fn new(crs: Crs, items: Vec<T>) -> Self {
        Self { crs, items }
    }

    /// Reproject every geometry and recompute centroids.
    pub fn to_crs(&self, target: Crs) -> Result<Layer<T>, AnalysisError> {
        if self.crs == target {
            return Ok(self.clone());
        }
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let projected = reproject(item.geometry(), self.crs, target);
                item.with_geometry(projected).ok_or_else(|| {
                    AnalysisError::InvalidGeometry(format!(
                        "record {i} lost its centroid when reprojected to {target}"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Layer { crs: target, items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fail with [`AnalysisError::CrsMismatch`] unless both layers share a CRS.
pub fn ensure_same_crs<A, B>(anchors: &Layer<A>, texts: &Layer<B>) -> Result<(), AnalysisError> {
    if anchors.crs == texts.crs {
        Ok(())
    } else {
        Err(AnalysisError::CrsMismatch {
            anchors: anchors.crs.to_string(),
            texts: texts.crs.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    #[test]
    fn parses_common_crs_spellings() {
        assert_eq!("EPSG:4326".parse::<Crs>().unwrap(), Crs::Wgs84);
        assert_eq!("epsg:3857".parse::<Crs>().unwrap(), Crs::WebMercator);
        assert_eq!("urn:ogc:def:crs:EPSG::3857".parse::<Crs>().unwrap(), Crs::WebMercator);
        assert_eq!("urn:ogc:def:crs:OGC:1.3:CRS84".parse::<Crs>().unwrap(), Crs::Wgs84);
        assert!(matches!(
            "EPSG:27700".parse::<Crs>(),
            Err(AnalysisError::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn web_mercator_known_values() {
        let edge = WebMercator.project(Coord { x: 180.0, y: 0.0 });
        assert!((edge.x - 20_037_508.342_789_244).abs() < 1e-6, "x={}", edge.x);
        assert!(edge.y.abs() < 1e-6);

        let corner = WebMercator.project(Coord { x: 0.0, y: MAX_MERCATOR_LAT_DEG });
        assert!((corner.y - 20_037_508.34).abs() < 1.0, "y={}", corner.y);
    }

    #[test]
    fn inverse_round_trips() {
        let c = Coord { x: -0.1276, y: 51.5072 };
        let back = InverseWebMercator.project(WebMercator.project(c));
        assert!((back.x - c.x).abs() < 1e-9);
        assert!((back.y - c.y).abs() < 1e-9);
    }

    #[test]
    fn layer_reprojection_refreshes_centroids() {
        let layer = Layer::new(Crs::Wgs84, vec![Anchor::at("m", "building", 1.0, 0.0)]);
        let planar = layer.to_crs(Crs::WebMercator).unwrap();
        assert_eq!(planar.crs, Crs::WebMercator);
        let c: Point<f64> = planar.items[0].centroid();
        assert!((c.x() - EARTH_RADIUS_M * 1.0_f64.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn mismatched_layers_are_reported() {
        let a = Layer::new(Crs::Wgs84, Vec::<Anchor>::new());
        let t = Layer::new(Crs::WebMercator, Vec::<TextDetection>::new());
        let err = ensure_same_crs(&a, &t).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::CrsMismatch {
                anchors: "EPSG:4326".to_string(),
                texts: "EPSG:3857".to_string(),
            }
        );
    }
}

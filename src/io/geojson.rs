//! GeoJSON `FeatureCollection` decoding into raw records.
//!
//! Supported geometry types: Point, MultiPoint, LineString, MultiLineString,
//! Polygon, MultiPolygon and GeometryCollection. Extra position members
//! (altitude) are ignored. A legacy `crs` member, when present, is returned
//! alongside the records.

use crate::error::AnalysisError;
use crate::projection::Crs;
use crate::records::{AnchorRecord, TextRecord};
use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Property names holding the anchor fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorFields {
    pub label: String,
    pub map_id: String,
}

impl Default for AnchorFields {
    fn default() -> Self {
        Self {
            label: "predicted_label".to_string(),
            map_id: "map_id".to_string(),
        }
    }
}

/// Property names holding the text-detection fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFields {
    pub text: String,
    pub map_id: String,
}

impl Default for TextFields {
    fn default() -> Self {
        Self {
            text: "text".to_string(),
            map_id: "map_id".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
    #[serde(default)]
    crs: Option<NamedCrs>,
}

#[derive(Deserialize)]
struct NamedCrs {
    properties: NamedCrsProperties,
}

#[derive(Deserialize)]
struct NamedCrsProperties {
    name: String,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

type Position = Vec<f64>;

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<RawGeometry> },
}

impl RawGeometry {
    fn into_geo(self) -> Result<Geometry<f64>, AnalysisError> {
        Ok(match self {
            RawGeometry::Point { coordinates } => Geometry::Point(Point::from(coord(&coordinates)?)),
            RawGeometry::MultiPoint { coordinates } => {
                let points = coordinates
                    .iter()
                    .map(|p| coord(p).map(Point::from))
                    .collect::<Result<Vec<_>, _>>()?;
                Geometry::MultiPoint(MultiPoint::new(points))
            }
            RawGeometry::LineString { coordinates } => Geometry::LineString(line(&coordinates)?),
            RawGeometry::MultiLineString { coordinates } => {
                let lines = coordinates
                    .iter()
                    .map(|l| line(l))
                    .collect::<Result<Vec<_>, _>>()?;
                Geometry::MultiLineString(MultiLineString::new(lines))
            }
            RawGeometry::Polygon { coordinates } => Geometry::Polygon(polygon(&coordinates)?),
            RawGeometry::MultiPolygon { coordinates } => {
                let polys = coordinates
                    .iter()
                    .map(|rings| polygon(rings))
                    .collect::<Result<Vec<_>, _>>()?;
                Geometry::MultiPolygon(MultiPolygon::new(polys))
            }
            RawGeometry::GeometryCollection { geometries } => {
                let parts = geometries
                    .into_iter()
                    .map(RawGeometry::into_geo)
                    .collect::<Result<Vec<_>, _>>()?;
                Geometry::GeometryCollection(GeometryCollection(parts))
            }
        })
    }
}

fn coord(position: &[f64]) -> Result<Coord<f64>, AnalysisError> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(AnalysisError::InvalidGeometry(format!(
            "position needs at least 2 values, got {}",
            position.len()
        ))),
    }
}

fn line(positions: &[Position]) -> Result<LineString<f64>, AnalysisError> {
    let coords = positions
        .iter()
        .map(|p| coord(p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

fn polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>, AnalysisError> {
    let mut rings = rings.iter().map(|r| line(r));
    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => LineString::new(Vec::new()),
    };
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// String view of a property; numbers and booleans are stringified.
fn property(props: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    match props?.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_collection(json: &str) -> Result<FeatureCollection, AnalysisError> {
    serde_json::from_str(json).map_err(|e| AnalysisError::Parse(e.to_string()))
}

fn declared_crs(fc: &FeatureCollection) -> Result<Option<Crs>, AnalysisError> {
    fc.crs
        .as_ref()
        .map(|c| c.properties.name.parse::<Crs>())
        .transpose()
}

fn geometry_of(feature: &mut Feature) -> Result<Option<Geometry<f64>>, AnalysisError> {
    feature.geometry.take().map(RawGeometry::into_geo).transpose()
}

/// Decode anchor records and the declared CRS, if any.
pub fn parse_anchors(
    json: &str,
    fields: &AnchorFields,
) -> Result<(Option<Crs>, Vec<AnchorRecord>), AnalysisError> {
    let mut fc = parse_collection(json)?;
    let crs = declared_crs(&fc)?;
    let records = fc
        .features
        .iter_mut()
        .map(|f| -> Result<AnchorRecord, AnalysisError> {
            let props = f.properties.as_ref();
            let map_id = property(props, &fields.map_id);
            let predicted_label = property(props, &fields.label);
            Ok(AnchorRecord {
                map_id,
                predicted_label,
                geometry: geometry_of(f)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((crs, records))
}

/// Decode text records and the declared CRS, if any.
pub fn parse_texts(
    json: &str,
    fields: &TextFields,
) -> Result<(Option<Crs>, Vec<TextRecord>), AnalysisError> {
    let mut fc = parse_collection(json)?;
    let crs = declared_crs(&fc)?;
    let records = fc
        .features
        .iter_mut()
        .map(|f| -> Result<TextRecord, AnalysisError> {
            let props = f.properties.as_ref();
            let map_id = property(props, &fields.map_id);
            let text = property(props, &fields.text);
            Ok(TextRecord {
                map_id,
                text,
                geometry: geometry_of(f)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((crs, records))
}

//! Raw tabular records as they come out of a data source.
//!
//! Fields are optional here; validation into [`Anchor`] / [`TextDetection`]
//! reports the first missing field and stops. A collection is converted all
//! or nothing. The map id is optional and defaults to an empty string; it only
//! matters for map pre-filtering.

use crate::error::AnalysisError;
use crate::types::{Anchor, TextDetection};
use geo::Geometry;

/// One building-patch prediction row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnchorRecord {
    pub map_id: Option<String>,
    pub predicted_label: Option<String>,
    pub geometry: Option<Geometry<f64>>,
}

/// One text-spotting row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextRecord {
    pub map_id: Option<String>,
    pub text: Option<String>,
    pub geometry: Option<Geometry<f64>>,
}

impl AnchorRecord {
    /// `index` is the record position, used in error messages.
    pub fn into_anchor(self, index: usize) -> Result<Anchor, AnalysisError> {
        let missing = |field: &'static str| AnalysisError::MissingField {
            record: index,
            field,
        };
        let geometry = self.geometry.ok_or_else(|| missing("geometry"))?;
        let label = self
            .predicted_label
            .ok_or_else(|| missing("predicted_label"))?;
        let map_id = self.map_id.unwrap_or_default();
        Anchor::new(map_id, label, geometry).ok_or_else(|| missing("geometry"))
    }
}

impl TextRecord {
    pub fn into_text(self, index: usize) -> Result<TextDetection, AnalysisError> {
        let missing = |field: &'static str| AnalysisError::MissingField {
            record: index,
            field,
        };
        let geometry = self.geometry.ok_or_else(|| missing("geometry"))?;
        let text = self.text.ok_or_else(|| missing("text"))?;
        let map_id = self.map_id.unwrap_or_default();
        TextDetection::new(map_id, text, geometry).ok_or_else(|| missing("geometry"))
    }
}

/// Validate every anchor record, failing on the first malformed one.
pub fn anchors_from_records(records: Vec<AnchorRecord>) -> Result<Vec<Anchor>, AnalysisError> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.into_anchor(i))
        .collect()
}

/// Validate every text record, failing on the first malformed one.
pub fn texts_from_records(records: Vec<TextRecord>) -> Result<Vec<TextDetection>, AnalysisError> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.into_text(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn point(x: f64, y: f64) -> Option<Geometry<f64>> {
        Some(Geometry::Point(Point::new(x, y)))
    }

    #[test]
    fn complete_records_validate() {
        let records = vec![AnchorRecord {
            map_id: Some("sheet_12".into()),
            predicted_label: Some("building".into()),
            geometry: point(1.0, 2.0),
        }];
        let anchors = anchors_from_records(records).unwrap();
        assert_eq!(anchors[0].predicted_label(), "building");
        assert_eq!(anchors[0].centroid(), Point::new(1.0, 2.0));
    }

    #[test]
    fn missing_field_stops_the_whole_collection() {
        let records = vec![
            TextRecord {
                map_id: Some("a".into()),
                text: Some("Mill".into()),
                geometry: point(0.0, 0.0),
            },
            TextRecord {
                map_id: Some("a".into()),
                text: None,
                geometry: point(1.0, 0.0),
            },
        ];
        let err = texts_from_records(records).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MissingField {
                record: 1,
                field: "text"
            }
        );
    }

    #[test]
    fn anchor_without_geometry_is_rejected() {
        let record = AnchorRecord {
            map_id: Some("a".into()),
            predicted_label: Some("building".into()),
            geometry: None,
        };
        assert!(matches!(
            record.into_anchor(7),
            Err(AnalysisError::MissingField {
                record: 7,
                field: "geometry"
            })
        ));
    }
}

use geo::{Centroid, Geometry, Point};
use serde::Serialize;

/// Which side of the contrast a matched label is accumulated into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Adjacent,
    Other,
}

impl Bucket {
    /// Bucket for an anchor with `predicted_label` under `target_label`.
    pub fn classify(predicted_label: &str, target_label: &str) -> Self {
        if predicted_label == target_label {
            Bucket::Adjacent
        } else {
            Bucket::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Adjacent => "adjacent",
            Bucket::Other => "other",
        }
    }
}

/// A classified map patch used as a spatial reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    map_id: String,
    predicted_label: String,
    geometry: Geometry<f64>,
    centroid: Point<f64>,
}

impl Anchor {
    /// Returns `None` when the geometry has no centroid (empty collections).
    pub fn new(
        map_id: impl Into<String>,
        predicted_label: impl Into<String>,
        geometry: Geometry<f64>,
    ) -> Option<Self> {
        let centroid = geometry.centroid()?;
        Some(Self {
            map_id: map_id.into(),
            predicted_label: predicted_label.into(),
            geometry,
            centroid,
        })
    }

    /// Point-shaped anchor; the centroid is the point itself.
    pub fn at(map_id: impl Into<String>, predicted_label: impl Into<String>, x: f64, y: f64) -> Self {
        let p = Point::new(x, y);
        Self {
            map_id: map_id.into(),
            predicted_label: predicted_label.into(),
            geometry: Geometry::Point(p),
            centroid: p,
        }
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn predicted_label(&self) -> &str {
        &self.predicted_label
    }

    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    pub fn centroid(&self) -> Point<f64> {
        self.centroid
    }

    pub(crate) fn with_geometry(&self, geometry: Geometry<f64>) -> Option<Self> {
        Self::new(self.map_id.clone(), self.predicted_label.clone(), geometry)
    }
}

/// A text label spotted on a map.
#[derive(Clone, Debug, PartialEq)]
pub struct TextDetection {
    map_id: String,
    text: String,
    geometry: Geometry<f64>,
    centroid: Point<f64>,
}

impl TextDetection {
    /// Returns `None` when the geometry has no centroid.
    pub fn new(
        map_id: impl Into<String>,
        text: impl Into<String>,
        geometry: Geometry<f64>,
    ) -> Option<Self> {
        let centroid = geometry.centroid()?;
        Some(Self {
            map_id: map_id.into(),
            text: text.into(),
            geometry,
            centroid,
        })
    }

    pub fn at(map_id: impl Into<String>, text: impl Into<String>, x: f64, y: f64) -> Self {
        let p = Point::new(x, y);
        Self {
            map_id: map_id.into(),
            text: text.into(),
            geometry: Geometry::Point(p),
            centroid: p,
        }
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    pub fn centroid(&self) -> Point<f64> {
        self.centroid
    }

    pub(crate) fn with_geometry(&self, geometry: Geometry<f64>) -> Option<Self> {
        Self::new(self.map_id.clone(), self.text.clone(), geometry)
    }
}

/// Text occurrences split by bucket. Both lists are multisets: a label near
/// several anchors appears once per anchor.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Partition {
    pub adjacent: Vec<String>,
    pub other: Vec<String>,
}

impl Partition {
    pub fn bucket(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::Adjacent => &self.adjacent,
            Bucket::Other => &self.other,
        }
    }

    pub(crate) fn extend(&mut self, bucket: Bucket, labels: impl IntoIterator<Item = String>) {
        match bucket {
            Bucket::Adjacent => self.adjacent.extend(labels),
            Bucket::Other => self.other.extend(labels),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.adjacent.is_empty() && self.other.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Geometry, GeometryCollection};

    #[test]
    fn polygon_anchor_reduces_to_centroid() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0)
        ];
        let anchor = Anchor::new("m1", "building", Geometry::Polygon(square)).unwrap();
        assert!((anchor.centroid().x() - 5.0).abs() < 1e-9);
        assert!((anchor.centroid().y() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn empty_geometry_has_no_centroid() {
        let empty = Geometry::GeometryCollection(GeometryCollection::<f64>(Vec::new()));
        assert!(TextDetection::new("m1", "Shop", empty).is_none());
    }

    #[test]
    fn bucket_uses_exact_label_match() {
        assert_eq!(Bucket::classify("building", "building"), Bucket::Adjacent);
        assert_eq!(Bucket::classify("Building", "building"), Bucket::Other);
    }
}

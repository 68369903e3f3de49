//! Spatial proximity partitioner.
//!
//! Every anchor looks for text detections whose centroid lies within
//! `max_distance` of its own centroid and files the matched texts under the
//! anchor's bucket. Texts are never deduplicated across anchors, so the two
//! output lists count label occurrences, one per qualifying anchor.
//!
//! Output order is fixed: anchors in input order and, within an anchor, texts
//! in input order. The brute-force scan, the R-tree index and the rayon path
//! all produce the same lists.
//!
//! Coordinates must already share one planar CRS; see [`crate::projection`].

use crate::error::AnalysisError;
use crate::types::{Anchor, Bucket, Partition, TextDetection};
use geo::{EuclideanDistance, Point};
use log::debug;
use rayon::prelude::*;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::Serialize;

/// How candidate texts are found for each anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Compare every anchor with every text.
    BruteForce,
    /// Query an R-tree over the text centroids.
    #[default]
    #[serde(rename = "rtree")]
    RTree,
}

/// Parameters for [`Partitioner`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PartitionParams {
    /// Anchors whose predicted label equals this (exactly) feed `adjacent`.
    pub target_label: String,
    /// Inclusive centroid distance threshold, in CRS units.
    pub max_distance: f64,
    pub strategy: SearchStrategy,
    /// Process anchors on the rayon pool.
    pub parallel: bool,
}

impl Default for PartitionParams {
    fn default() -> Self {
        Self {
            target_label: "building".to_string(),
            max_distance: 100.0,
            strategy: SearchStrategy::default(),
            parallel: false,
        }
    }
}

/// Validated partitioning configuration.
#[derive(Clone, Debug)]
pub struct Partitioner {
    params: PartitionParams,
}

impl Partitioner {
    pub fn new(params: PartitionParams) -> Result<Self, AnalysisError> {
        if !params.max_distance.is_finite() || params.max_distance < 0.0 {
            return Err(AnalysisError::InvalidParameter {
                name: "max_distance",
                reason: format!("expected a finite value >= 0, got {}", params.max_distance),
            });
        }
        if params.max_distance == 0.0 {
            log::warn!("max_distance is 0: only exactly coincident centroids will match");
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &PartitionParams {
        &self.params
    }

    /// Split the texts near each anchor into the two buckets.
    pub fn partition(&self, anchors: &[Anchor], texts: &[TextDetection]) -> Partition {
        let text_points: Vec<Point<f64>> = texts.iter().map(TextDetection::centroid).collect();
        let max_distance = self.params.max_distance;
        let index = match self.params.strategy {
            SearchStrategy::BruteForce => None,
            SearchStrategy::RTree => Some(CentroidIndex::build(&text_points)),
        };

        let matcher = |anchor: &Anchor| -> (Bucket, Vec<String>) {
            let bucket = Bucket::classify(anchor.predicted_label(), &self.params.target_label);
            let hits = match &index {
                Some(tree) => tree.within(anchor.centroid(), max_distance, &text_points),
                None => scan_within(anchor.centroid(), max_distance, &text_points),
            };
            let labels = hits.into_iter().map(|i| texts[i].text().to_string()).collect();
            (bucket, labels)
        };

        let per_anchor: Vec<(Bucket, Vec<String>)> = if self.params.parallel {
            anchors.par_iter().map(matcher).collect()
        } else {
            anchors.iter().map(matcher).collect()
        };

        let mut out = Partition::default();
        for (bucket, labels) in per_anchor {
            out.extend(bucket, labels);
        }
        debug!(
            "partition: anchors={} texts={} adjacent={} other={}",
            anchors.len(),
            texts.len(),
            out.adjacent.len(),
            out.other.len()
        );
        out
    }
}

/// Brute-force partition with the default bucket rule.
///
/// A negative `max_distance` matches nothing.
pub fn partition(
    anchors: &[Anchor],
    texts: &[TextDetection],
    target_label: &str,
    max_distance: f64,
) -> Partition {
    let text_points: Vec<Point<f64>> = texts.iter().map(TextDetection::centroid).collect();
    let mut out = Partition::default();
    for anchor in anchors {
        let bucket = Bucket::classify(anchor.predicted_label(), target_label);
        let hits = scan_within(anchor.centroid(), max_distance, &text_points);
        out.extend(bucket, hits.into_iter().map(|i| texts[i].text().to_string()));
    }
    out
}

fn scan_within(center: Point<f64>, max_distance: f64, points: &[Point<f64>]) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| center.euclidean_distance(*p) <= max_distance)
        .map(|(i, _)| i)
        .collect()
}

type IndexedCentroid = GeomWithData<[f64; 2], usize>;

/// R-tree over the finite text centroids, tagged with their input index.
struct CentroidIndex {
    tree: RTree<IndexedCentroid>,
}

impl CentroidIndex {
    fn build(points: &[Point<f64>]) -> Self {
        let entries: Vec<IndexedCentroid> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| is_finite(p))
            .map(|(i, p)| GeomWithData::new([p.x(), p.y()], i))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Indices of points within `max_distance` of `center`, ascending.
    fn within(&self, center: Point<f64>, max_distance: f64, points: &[Point<f64>]) -> Vec<usize> {
        if !is_finite(&center) {
            return Vec::new();
        }
        // The squared radius is widened slightly; the exact test below decides.
        let reach = max_distance * (1.0 + 1e-9);
        let radius_2 = (reach * reach).max(f64::MIN_POSITIVE);
        let mut hits: Vec<usize> = self
            .tree
            .locate_within_distance([center.x(), center.y()], radius_2)
            .map(|entry| entry.data)
            .filter(|&i| center.euclidean_distance(&points[i]) <= max_distance)
            .collect();
        hits.sort_unstable();
        hits
    }
}

fn is_finite(p: &Point<f64>) -> bool {
    p.x().is_finite() && p.y().is_finite()
}

//! One-shot contrast analysis.
//!
//! Overview
//! - Optionally keeps only anchors and texts from selected maps.
//! - Partitions spotted texts into the `adjacent` / `other` buckets by centroid
//!   proximity to anchors (see [`crate::partition`]).
//! - Counts each bucket case-insensitively and normalises the counts.
//! - Ranks every `other` term by `p_adjacent - p_other`.
//!
//! [`ContrastAnalyzer::run_layers`] additionally reprojects CRS-tagged inputs
//! into the planar CRS before partitioning, or, with reprojection switched
//! off, refuses layers whose CRS differ.

use crate::contrast::{rank_difference, DifferenceRanking};
use crate::diagnostics::{elapsed_ms, TimingBreakdown};
use crate::error::AnalysisError;
use crate::frequency::{FrequencyTable, ProbabilityTable};
use crate::partition::{PartitionParams, Partitioner};
use crate::projection::{ensure_same_crs, Crs, Layer};
use crate::types::{Anchor, Bucket, TextDetection};
use log::{debug, warn};
use serde::Serialize;
use std::borrow::Cow;
use std::time::Instant;

/// Parameters for a full analysis run.
#[derive(Clone, Debug, PartialEq)]
pub struct ContrastParams {
    pub partition: PartitionParams,
    /// Slice size for the printed top / bottom term lists.
    pub top_n: usize,
    /// Keep only records whose map id is listed. `None` keeps everything.
    pub map_ids: Option<Vec<String>>,
    /// CRS that [`ContrastAnalyzer::run_layers`] reprojects into.
    pub planar_crs: Crs,
    /// When `false`, `run_layers` uses the layers as loaded and only checks
    /// that their CRS agree.
    pub reproject: bool,
}

impl Default for ContrastParams {
    fn default() -> Self {
        Self {
            partition: PartitionParams::default(),
            top_n: 5,
            map_ids: None,
            planar_crs: Crs::WebMercator,
            reproject: true,
        }
    }
}

/// Everything a run produces.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastReport {
    pub target_label: String,
    pub max_distance: f64,
    pub anchor_count: usize,
    pub text_count: usize,
    pub adjacent_occurrences: usize,
    pub other_occurrences: usize,
    pub adjacent_frequency: FrequencyTable,
    pub other_frequency: FrequencyTable,
    pub adjacent_probability: ProbabilityTable,
    pub other_probability: ProbabilityTable,
    pub ranking: DifferenceRanking,
    pub top_n: usize,
    pub timing: TimingBreakdown,
}

impl ContrastReport {
    pub fn print_text_summary(&self) {
        println!("Contrast summary");
        println!("  target_label: {}", self.target_label);
        println!("  max_distance: {:.3}", self.max_distance);
        println!("  anchors: {}  texts: {}", self.anchor_count, self.text_count);
        println!(
            "  occurrences: adjacent={} other={}",
            self.adjacent_occurrences, self.other_occurrences
        );
        println!(
            "  distinct terms: adjacent={} other={}",
            self.adjacent_frequency.len(),
            self.other_frequency.len()
        );

        println!("\nMost common near '{}'", self.target_label);
        for (term, count) in self.adjacent_frequency.most_common(self.top_n) {
            println!("  {term:<24} {count}");
        }
        println!("\nMost common elsewhere");
        for (term, count) in self.other_frequency.most_common(self.top_n) {
            println!("  {term:<24} {count}");
        }

        println!("\nTop {} terms near '{}'", self.top_n, self.target_label);
        for t in self.ranking.top(self.top_n) {
            println!("  {:<24} {:+.4}", t.text, t.difference);
        }
        println!("\nTop {} terms elsewhere", self.top_n);
        for t in self.ranking.bottom(self.top_n) {
            println!("  {:<24} {:+.4}", t.text, t.difference);
        }

        let stages: Vec<String> = self
            .timing
            .stages
            .iter()
            .map(|s| format!("{}={:.3}", s.label, s.elapsed_ms))
            .collect();
        println!(
            "\nTimings (ms): {} total={:.3}",
            stages.join(" "),
            self.timing.total_ms
        );
    }
}

/// Validated analyzer.
#[derive(Clone, Debug)]
pub struct ContrastAnalyzer {
    params: ContrastParams,
    partitioner: Partitioner,
}

impl ContrastAnalyzer {
    pub fn new(params: ContrastParams) -> Result<Self, AnalysisError> {
        let partitioner = Partitioner::new(params.partition.clone())?;
        Ok(Self {
            params,
            partitioner,
        })
    }

    pub fn params(&self) -> &ContrastParams {
        &self.params
    }

    /// Run on inputs that already share a planar CRS.
    pub fn run(
        &self,
        anchors: &[Anchor],
        texts: &[TextDetection],
    ) -> Result<ContrastReport, AnalysisError> {
        let t0 = Instant::now();
        let mut timing = TimingBreakdown::default();

        let (anchors, texts) = timing.time("filter", || {
            (
                self.filter_maps(anchors, Anchor::map_id),
                self.filter_maps(texts, TextDetection::map_id),
            )
        });
        debug!(
            "ContrastAnalyzer::run anchors={} texts={}",
            anchors.len(),
            texts.len()
        );

        let partition = timing.time("partition", || {
            self.partitioner.partition(&anchors, &texts)
        });

        let (adjacent_frequency, other_frequency) = timing.time("count", || {
            (
                FrequencyTable::from_labels(&partition.adjacent),
                FrequencyTable::from_labels(&partition.other),
            )
        });
        let adjacent_probability = normalise(&adjacent_frequency, Bucket::Adjacent)?;
        let other_probability = normalise(&other_frequency, Bucket::Other)?;

        let ranking = timing.time("rank", || {
            rank_difference(&adjacent_probability, &other_probability)
        });
        timing.total_ms = elapsed_ms(t0);

        let partition_params = self.partitioner.params();
        Ok(ContrastReport {
            target_label: partition_params.target_label.clone(),
            max_distance: partition_params.max_distance,
            anchor_count: anchors.len(),
            text_count: texts.len(),
            adjacent_occurrences: partition.adjacent.len(),
            other_occurrences: partition.other.len(),
            adjacent_frequency,
            other_frequency,
            adjacent_probability,
            other_probability,
            ranking,
            top_n: self.params.top_n,
            timing,
        })
    }

    /// Reproject both layers into [`ContrastParams::planar_crs`] and run.
    ///
    /// With [`ContrastParams::reproject`] off the layers are used as they
    /// are and must already share a CRS.
    pub fn run_layers(
        &self,
        anchors: &Layer<Anchor>,
        texts: &Layer<TextDetection>,
    ) -> Result<ContrastReport, AnalysisError> {
        if !self.params.reproject {
            ensure_same_crs(anchors, texts)?;
            if !anchors.crs.is_planar() {
                warn!("partitioning in {} without reprojection", anchors.crs);
            }
            return self.run(&anchors.items, &texts.items);
        }
        let target = self.params.planar_crs;
        let anchors = anchors.to_crs(target)?;
        let texts = texts.to_crs(target)?;
        self.run(&anchors.items, &texts.items)
    }

    fn filter_maps<'a, T: Clone>(&self, items: &'a [T], map_id: fn(&T) -> &str) -> Cow<'a, [T]> {
        match &self.params.map_ids {
            None => Cow::Borrowed(items),
            Some(ids) => Cow::Owned(
                items
                    .iter()
                    .filter(|item| ids.iter().any(|id| id == map_id(item)))
                    .cloned()
                    .collect(),
            ),
        }
    }
}

fn normalise(freq: &FrequencyTable, bucket: Bucket) -> Result<ProbabilityTable, AnalysisError> {
    freq.probabilities().map_err(|_| {
        warn!("{} bucket is empty; nothing to normalise", bucket.as_str());
        AnalysisError::empty(format!("{} bucket", bucket.as_str()))
    })
}

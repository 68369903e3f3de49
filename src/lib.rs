#![doc = include_str!("../README.md")]

// Pipeline
pub mod analysis;
pub mod contrast;
pub mod frequency;
pub mod partition;
pub mod types;

// Supporting layers
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod io;
pub mod projection;
pub mod records;

// --- High-level re-exports -------------------------------------------------

pub use crate::analysis::{ContrastAnalyzer, ContrastParams, ContrastReport};
pub use crate::contrast::{rank_difference, DifferenceRanking, RankedTerm};
pub use crate::error::AnalysisError;
pub use crate::frequency::{build_tables, FrequencyTable, ProbabilityTable};
pub use crate::partition::{partition, PartitionParams, Partitioner, SearchStrategy};
pub use crate::projection::{Crs, Layer};
pub use crate::types::{Anchor, Bucket, Partition, TextDetection};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```
/// use map_text_contrast::prelude::*;
///
/// let anchors = vec![
///     Anchor::at("sheet_1", "building", 0.0, 0.0),
///     Anchor::at("sheet_1", "no_building", 500.0, 0.0),
/// ];
/// let texts = vec![
///     TextDetection::at("sheet_1", "Inn", 40.0, 0.0),
///     TextDetection::at("sheet_1", "Farm", 520.0, 0.0),
/// ];
///
/// let analyzer = ContrastAnalyzer::new(ContrastParams::default()).unwrap();
/// let report = analyzer.run(&anchors, &texts).unwrap();
/// assert_eq!(report.ranking.top(1)[0].text, "farm");
/// ```
pub mod prelude {
    pub use crate::{Anchor, ContrastAnalyzer, ContrastParams, ContrastReport, TextDetection};
}

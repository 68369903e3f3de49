//! Error types for the label contrast pipeline.

use std::fmt;

/// Reasons a contrast analysis can fail.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisError {
    /// Probability normalisation was asked to divide by a zero total.
    EmptyInput { what: String },
    /// A record lacks one of the fields the pipeline requires.
    MissingField { record: usize, field: &'static str },
    /// Anchors and texts are not expressed in the same coordinate system.
    CrsMismatch { anchors: String, texts: String },
    /// A CRS identifier the projection layer does not know.
    UnsupportedCrs(String),
    /// A parameter outside its valid domain.
    InvalidParameter { name: &'static str, reason: String },
    /// Geometry that could not be decoded from its source representation.
    InvalidGeometry(String),
    /// Input that is not a well-formed feature collection.
    Parse(String),
}

impl AnalysisError {
    pub(crate) fn empty(what: impl Into<String>) -> Self {
        AnalysisError::EmptyInput { what: what.into() }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::EmptyInput { what } => {
                write!(f, "empty input: {what} has no labels to normalise")
            }
            AnalysisError::MissingField { record, field } => {
                write!(f, "record {record} is missing required field `{field}`")
            }
            AnalysisError::CrsMismatch { anchors, texts } => write!(
                f,
                "coordinate systems differ (anchors={anchors}, texts={texts})"
            ),
            AnalysisError::UnsupportedCrs(name) => write!(f, "unsupported CRS `{name}`"),
            AnalysisError::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter `{name}`: {reason}")
            }
            AnalysisError::InvalidGeometry(msg) => write!(f, "invalid geometry: {msg}"),
            AnalysisError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for AnalysisError {}

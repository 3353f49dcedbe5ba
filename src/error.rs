//! Error types for the cloud-layers crate.
use std::{error::Error, fmt::Display};

/// Error type for the crate.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnalysisError {
    /// A profile that is required for this analysis is missing.
    MissingProfile,
    /// Not enough data available for analysis.
    NotEnoughData,
    /// The shapes of the arrays handed to an analysis do not agree.
    MismatchedDimensions,
    /// An edge detection mode other than "base" or "top" was requested.
    InvalidEdgeKind,
    /// Bad or invalid input.
    InvalidInput,
    /// A worker thread could not be started or panicked.
    WorkerFailed,
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use AnalysisError::*;

        match self {
            MissingProfile => write!(f, "missing profile required for the analysis"),
            NotEnoughData => write!(f, "not enough data available for analysis"),
            MismatchedDimensions => write!(f, "array dimensions do not agree"),
            InvalidEdgeKind => write!(f, "edge kind must be either \"base\" or \"top\""),
            InvalidInput => write!(f, "invalid input"),
            WorkerFailed => write!(f, "a worker thread failed while processing profiles"),
        }
    }
}

impl Error for AnalysisError {}

impl From<strum::ParseError> for AnalysisError {
    fn from(_: strum::ParseError) -> Self {
        AnalysisError::InvalidEdgeKind
    }
}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AnalysisError>;

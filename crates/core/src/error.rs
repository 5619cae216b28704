//! Error taxonomy for the recommendation pipeline.
//!
//! Provider-predicate failures (land, rural, elevation probes) are absorbed
//! close to where they happen and never reach these types. Everything here
//! either carries a sentinel-free structural meaning of its own or wraps a
//! provider failure that has no safe default.

use thiserror::Error;

/// A failure reported by (or while talking to) an external data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never produced a usable response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("{service} returned status {status}: {detail}")]
    Status {
        service: &'static str,
        status: u16,
        detail: String,
    },

    /// OAuth token acquisition failed; every caller waiting on the refresh
    /// observes this error.
    #[error("auth token acquisition failed: {0}")]
    Auth(String),

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode {service} response: {detail}")]
    Decode {
        service: &'static str,
        detail: String,
    },

    /// The provider answered but reported a failure of its own.
    #[error("{0}")]
    Provider(String),
}

/// A failure of the pipeline as a whole.
///
/// Structural variants are deliberately distinct from provider errors so the
/// enclosing service can report "the region produced nothing to rank" rather
/// than a generic upstream failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Every lattice point was rejected by the land/rural/polygon filters.
    #[error("no sample points survived land, urban and polygon filtering")]
    NoSamplePoints,

    /// Clustering produced no group of at least `min_points` members, so
    /// there is nothing to score.
    #[error("no cluster reached the minimum size of {min_points} points")]
    NoClusters { min_points: usize },

    /// A provider failure with no safe per-point fallback.
    #[error(transparent)]
    Source(#[from] SourceError),
}

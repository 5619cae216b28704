//! Burn Plan Core Library
//!
//! Recommends an optimal site for a controlled (prescribed) burn inside a
//! user-specified region, and separately surveys sub-regions for wildfire
//! risk.
//!
//! ## Pipeline
//!
//! region → sample grid → environmental profiles → proximity clusters →
//! multi-factor scores → best point → intensity prediction
//!
//! All external data (land/water, urban features, vegetation imagery, soil
//! moisture, weather, elevation, the intensity predictor) enters through the
//! capability traits in [`sources`]; the `burn-plan-providers` crate
//! supplies HTTP implementations.

// Leaf utilities
pub mod error;
pub mod geometry;
pub mod types;

// Provider contracts
pub mod sources;

// Pipeline stages
pub mod cluster;
pub mod grid;
pub mod intensity;
pub mod profile;
pub mod scoring;

// Orchestration
pub mod pipeline;

// Re-export the request/response surface
pub use error::{PipelineError, SourceError};
pub use geometry::{BoundingBox, Point, Region, SampleMode};
pub use pipeline::BurnSitePlanner;
pub use sources::SourceSet;
pub use types::{
    BurnSiteRecommendation, Cluster, ClusterScore, EnvironmentalData, RiskAssessment, RiskRegion,
    SoilMoisture, Topography,
};

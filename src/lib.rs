//! Aura Match - aura derivation and location matching service
//!
//! This library derives a three-color "aura" from questionnaire answers,
//! normalizes heterogeneous stored colors, ranks locations by color
//! similarity and picks the markers to render for a map viewport.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;

// Re-export commonly used types
pub use crate::core::{
    distance::{calculate_bounding_box, haversine_distance},
    AuraDeriver, ColorCodec, SimilarityMatcher, ViewportSelector,
};
pub use error::{ParseError, ServiceError};
pub use models::{ActiveFilter, Aura, ColorTag, Location, MatchResult, QuestionnaireAnswer, Rgb, Viewport};

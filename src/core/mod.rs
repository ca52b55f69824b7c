// Core algorithm exports
pub mod aura;
pub mod color;
pub mod distance;
pub mod similarity;
pub mod viewport;

pub use aura::{AuraDeriver, RandomTieBreak, TieBreak};
pub use color::{canonicalize, ColorCodec, FALLBACK_COLOR};
pub use distance::{calculate_bounding_box, haversine_distance, pixel_distance};
pub use similarity::{color_similarity, MatchOutcome, MatchPolicy, SimilarityMatcher};
pub use viewport::{ViewportPolicy, ViewportSelector};

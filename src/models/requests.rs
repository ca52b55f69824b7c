use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{ActiveFilter, Aura, ColorFields, LocationRecord, QuestionnaireAnswer, Viewport};

/// Request to derive an aura from questionnaire answers
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeriveAuraRequest {
    #[validate(length(max = 100))]
    #[serde(default)]
    pub answers: Vec<QuestionnaireAnswer>,
}

/// Request to canonicalize one stored color representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalizeRequest {
    #[serde(default)]
    pub raw: ColorFields,
}

/// Request to rank a location pool against an aura
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchLocationsRequest {
    pub aura: Aura,
    #[validate(length(max = 10000))]
    #[serde(default)]
    pub locations: Vec<LocationRecord>,
}

/// Request to pick the markers for one viewport
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SelectLocationsRequest {
    #[validate(length(max = 10000))]
    #[serde(default)]
    pub locations: Vec<LocationRecord>,
    pub viewport: Viewport,
    #[serde(default)]
    pub filter: ActiveFilter,
    #[validate(range(min = 1, max = 500))]
    #[serde(default, alias = "max_count", rename = "maxCount")]
    pub max_count: Option<usize>,
}

use serde::{Deserialize, Serialize};

use crate::models::domain::{Marker, MatchResult, Rgb};

/// Response for the canonicalize endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalizeResponse {
    pub colors: Vec<Rgb>,
}

/// Response for the match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchLocationsResponse {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
    pub match_count: usize,
    pub strict_count: usize,
    pub relaxed: bool,
}

/// Response for the viewport selection endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectLocationsResponse<'a> {
    pub markers: Vec<Marker<'a>>,
    pub total_candidates: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

// Route exports
pub mod aura;
pub mod locations;

use actix_web::{error, web, HttpRequest};

use crate::config::Settings;
use crate::core::{AuraDeriver, ColorCodec, MatchPolicy, SimilarityMatcher, ViewportPolicy, ViewportSelector};
use crate::error::ServiceError;

/// Largest accepted JSON body; location pools are sent inline
const JSON_LIMIT_BYTES: usize = 8 * 1024 * 1024;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub codec: ColorCodec,
    pub deriver: AuraDeriver,
    pub matcher: SimilarityMatcher,
    pub selector: ViewportSelector,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        let matcher = SimilarityMatcher::new(MatchPolicy::from(&settings.matching));
        Self {
            codec: ColorCodec::new(settings.cache.color_cache_size),
            deriver: AuraDeriver::new(),
            selector: ViewportSelector::new(ViewportPolicy::from(&settings.viewport), matcher.clone()),
            matcher,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            codec: ColorCodec::default(),
            deriver: AuraDeriver::new(),
            matcher: SimilarityMatcher::default(),
            selector: ViewportSelector::default(),
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(aura::configure)
            .configure(locations::configure),
    );
}

/// JSON extractor config with the service's error body
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(handle_json_payload_error)
}

/// Query extractor config with the service's error body
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(handle_query_payload_error)
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ServiceError::InvalidJson(err.to_string()).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ServiceError::InvalidQuery(err.to_string()).into()
}

use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::ServiceError;
use crate::models::{
    Location, LocationRecord, MatchLocationsRequest, MatchLocationsResponse, SelectLocationsRequest,
    SelectLocationsResponse,
};
use crate::routes::AppState;

/// Configure location matching and selection routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/locations/match", web::post().to(match_locations))
        .route("/locations/select", web::post().to(select_locations));
}

fn ingest_all(state: &AppState, records: Vec<LocationRecord>) -> Vec<Location> {
    records
        .into_iter()
        .map(|record| state.codec.ingest(record))
        .collect()
}

/// Rank a location pool against an aura
///
/// POST /api/v1/locations/match
///
/// Request body:
/// ```json
/// {
///   "aura": { "color1": "#FF0000", "color2": "#FFA500", "color3": "#FFD700",
///             "shape": "sparkling", "speed": "fast" },
///   "locations": [{ "id": 1, "latitude": 40.7, "longitude": -74.0, "aura_color": "#FF0000" }]
/// }
/// ```
async fn match_locations(
    state: web::Data<AppState>,
    req: web::Json<MatchLocationsRequest>,
) -> Result<HttpResponse, ServiceError> {
    req.validate()?;

    let MatchLocationsRequest { aura, locations } = req.into_inner();
    let state = state.into_inner();

    // Scoring is CPU-bound; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || {
        let locations = ingest_all(&state, locations);
        state.matcher.match_locations(&aura, &locations)
    })
    .await
    .map_err(|e| {
        tracing::error!("Matching task failed: {}", e);
        ServiceError::Internal(e.to_string())
    })?;

    tracing::info!(
        "Matched {} of {} locations ({} strict, relaxed: {})",
        outcome.matches.len(),
        outcome.total_candidates,
        outcome.strict_count,
        outcome.relaxed
    );

    Ok(HttpResponse::Ok().json(MatchLocationsResponse {
        match_count: outcome.matches.len(),
        matches: outcome.matches,
        total_candidates: outcome.total_candidates,
        strict_count: outcome.strict_count,
        relaxed: outcome.relaxed,
    }))
}

/// Pick the markers to render for one viewport
///
/// POST /api/v1/locations/select
async fn select_locations(
    state: web::Data<AppState>,
    req: web::Json<SelectLocationsRequest>,
) -> Result<HttpResponse, ServiceError> {
    req.validate()?;

    let SelectLocationsRequest {
        locations,
        viewport,
        filter,
        max_count,
    } = req.into_inner();
    let state = state.into_inner();

    // Markers borrow the ingested pool, so the body is rendered on the blocking thread too
    let body = tokio::task::spawn_blocking(move || {
        let locations = ingest_all(&state, locations);
        let max_count = max_count.unwrap_or_else(|| state.selector.max_count_for_zoom(viewport.zoom));
        let markers = state.selector.select(&locations, &viewport, &filter, max_count);

        tracing::info!(
            "Selected {} markers from {} locations at zoom {}",
            markers.len(),
            locations.len(),
            viewport.zoom
        );

        serde_json::to_vec(&SelectLocationsResponse {
            markers,
            total_candidates: locations.len(),
        })
    })
    .await
    .map_err(|e| {
        tracing::error!("Selection task failed: {}", e);
        ServiceError::Internal(e.to_string())
    })?
    .map_err(|e| ServiceError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().content_type("application/json").body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorResponse;
    use crate::routes::{configure_routes, json_config};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    fn aura_json() -> Value {
        json!({
            "color1": "#FF0000",
            "color2": "#FF0000",
            "color3": "#FF0000",
            "shape": "sparkling",
            "speed": "fast"
        })
    }

    #[actix_web::test]
    async fn test_match_endpoint_ranks_red_first() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .app_data(json_config())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/locations/match")
            .set_json(json!({
                "aura": aura_json(),
                "locations": [
                    { "id": 1, "latitude": 40.71, "longitude": -74.0, "aura_color": "#0000FF" },
                    { "id": 2, "latitude": 40.72, "longitude": -74.0, "aura_color": "#FF0000" }
                ]
            }))
            .to_request();
        let response: MatchLocationsResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(response.total_candidates, 2);
        assert_eq!(response.match_count, 1);
        assert_eq!(response.matches[0].location_id, "2");
        assert!(response.matches[0].strict);
    }

    #[actix_web::test]
    async fn test_select_endpoint_uses_zoom_band() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .app_data(json_config())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/locations/select")
            .set_json(json!({
                "locations": [
                    { "id": "a", "latitude": 40.75, "longitude": -73.98, "importanceScore": 2.0 },
                    { "id": "b", "latitude": 40.76, "longitude": -73.97, "importanceScore": 9.0 },
                    { "id": "c", "latitude": 41.50, "longitude": -73.97, "importanceScore": 5.0 }
                ],
                "viewport": {
                    "bounds": { "minLat": 40.70, "maxLat": 40.80, "minLon": -74.05, "maxLon": -73.90 },
                    "zoom": 16.0
                }
            }))
            .to_request();
        let response: Value = test::call_and_read_body_json(&app, req).await;

        let markers = response["markers"].as_array().unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0]["location"]["id"], "b");
        assert_eq!(markers[1]["location"]["id"], "a");
        assert_eq!(response["totalCandidates"], 3);
    }

    #[actix_web::test]
    async fn test_select_endpoint_with_aura_filter() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .app_data(json_config())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/locations/select")
            .set_json(json!({
                "locations": [
                    { "id": "red", "latitude": 40.75, "longitude": -73.98, "aura_color": "#FF0000" },
                    { "id": "blue", "latitude": 40.76, "longitude": -73.97, "aura_color": "#0000FF" }
                ],
                "viewport": {
                    "bounds": { "minLat": 40.70, "maxLat": 40.80, "minLon": -74.05, "maxLon": -73.90 },
                    "zoom": 14.0
                },
                "filter": { "type": "auraMatch", "aura": aura_json() },
                "maxCount": 5
            }))
            .to_request();
        let response: Value = test::call_and_read_body_json(&app, req).await;

        let markers = response["markers"].as_array().unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0]["location"]["id"], "red");
        assert_eq!(markers[0]["displaced"], false);
    }

    #[actix_web::test]
    async fn test_select_endpoint_rejects_oversized_cap() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .app_data(json_config())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/locations/select")
            .set_json(json!({
                "locations": [],
                "viewport": { "zoom": 14.0 },
                "maxCount": 501
            }))
            .to_request();
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(response).await;
        assert_eq!(body.error, "validation_failed");
        assert_eq!(body.status_code, 400);
    }

    #[actix_web::test]
    async fn test_malformed_json_returns_error_body() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .app_data(json_config())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/locations/match")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ not json")
            .to_request();
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(response).await;
        assert_eq!(body.error, "invalid_json");
    }
}

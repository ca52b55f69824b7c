use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::error::ServiceError;
use crate::models::{CanonicalizeRequest, CanonicalizeResponse, DeriveAuraRequest, HealthResponse};
use crate::routes::AppState;

/// Configure aura and color routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/aura/derive", web::post().to(derive_aura))
        .route("/colors/canonicalize", web::post().to(canonicalize_colors));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Derive an aura from questionnaire answers
///
/// POST /api/v1/aura/derive
///
/// Request body:
/// ```json
/// {
///   "answers": [{ "questionIndex": 0, "tag": "red", "latencyMs": 1000 }]
/// }
/// ```
async fn derive_aura(
    state: web::Data<AppState>,
    req: web::Json<DeriveAuraRequest>,
) -> Result<HttpResponse, ServiceError> {
    req.validate()?;

    let aura = state.deriver.derive(&req.answers);

    tracing::info!(
        "Derived aura from {} answers: {:?} {:?} {:?}",
        req.answers.len(),
        aura.tags,
        aura.shape,
        aura.speed
    );

    Ok(HttpResponse::Ok().json(aura))
}

/// Canonicalize the color fields of one stored record
///
/// POST /api/v1/colors/canonicalize
async fn canonicalize_colors(
    state: web::Data<AppState>,
    req: web::Json<CanonicalizeRequest>,
) -> impl Responder {
    let raw = req.into_inner().raw.into_raw();
    let colors = state.codec.canonicalize(&raw);

    tracing::debug!("Canonicalized {:?} into {} colors", raw, colors.len());

    HttpResponse::Ok().json(CanonicalizeResponse { colors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Aura, AuraShape, AuraSpeed, ColorTag, Rgb};
    use crate::routes::{configure_routes, json_config};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let response: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(response.status, "healthy");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn test_derive_aura_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .app_data(json_config())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/aura/derive")
            .set_json(json!({
                "answers": [
                    { "questionIndex": 0, "tag": "red", "latencyMs": 1000 },
                    { "questionIndex": 1, "tag": "RED", "latencyMs": 1000 },
                    { "questionIndex": 2, "tag": "red", "latencyMs": 1000 },
                    { "questionIndex": 3, "tag": "blue", "latencyMs": 1000 },
                    { "questionIndex": 4, "tag": "blue", "latencyMs": 1000 },
                    { "questionIndex": 5, "tag": "green", "latencyMs": 1000 }
                ]
            }))
            .to_request();
        let aura: Aura = test::call_and_read_body_json(&app, req).await;

        assert_eq!(aura.color1, ColorTag::Red.rgb());
        assert_eq!(aura.color2, ColorTag::Blue.rgb());
        assert_eq!(aura.color3, ColorTag::Green.rgb());
        assert_eq!(aura.shape, AuraShape::Sparkling);
        assert_eq!(aura.speed, AuraSpeed::Fast);
        assert!(aura.derived_at.is_some());
    }

    #[actix_web::test]
    async fn test_derive_rejects_unknown_tag() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .app_data(json_config())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/aura/derive")
            .set_json(json!({ "answers": [{ "questionIndex": 0, "tag": "mauve", "latencyMs": 100 }] }))
            .to_request();
        let response = test::call_service(&app, req).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_canonicalize_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/colors/canonicalize")
            .set_json(json!({ "raw": { "aura_color": "linear-gradient(#FF0000, #00F)" } }))
            .to_request();
        let response: CanonicalizeResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(response.colors, vec![Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]);
    }
}

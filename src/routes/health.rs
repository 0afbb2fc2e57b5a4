use actix_web::{get, HttpResponse};
use chrono::Utc;

use crate::models::health::HealthResponse;

/// GET /health - État du service, pour les sondes de supervision (PUBLIC)
#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        servicio: "plaze-backend".to_string(),
        hora_servidor: Utc::now(),
    })
}

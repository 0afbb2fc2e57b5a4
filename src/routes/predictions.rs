use actix_web::{get, web, HttpResponse};

use crate::models::dto::PredictionQuery;
use crate::services::prediction;

const MESES_ADELANTE_DEFECTO: usize = 6;

/// GET /predictions/ - Prévision mensuelle des prix d'un produit (PUBLIC)
#[get("/")]
pub async fn get_prediction(query: web::Query<PredictionQuery>) -> HttpResponse {
    let product_name = query.product_name.clone();
    let months_ahead = query.months_ahead.unwrap_or(MESES_ADELANTE_DEFECTO);

    // Lecture du CSV + régression : travail bloquant, hors de l'executor
    let resultado = web::block(move || prediction::predict_prices(&product_name, months_ahead)).await;

    match resultado {
        Ok(Ok(predicciones)) => HttpResponse::Ok().json(serde_json::json!({
            "status": "success",
            "product": query.product_name,
            "months_ahead": months_ahead,
            "predictions": predicciones
        })),
        Ok(Err(mensaje)) => HttpResponse::Ok().json(serde_json::json!({
            "status": "error",
            "message": mensaje
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "detail": format!("Error interno del servidor: {}", e)
        })),
    }
}

pub fn predictions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/predictions").service(get_prediction));
}

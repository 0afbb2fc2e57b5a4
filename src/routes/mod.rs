pub mod health;
pub mod auth;
pub mod register;
pub mod password_recovery;
pub mod prices;
pub mod price_history;
pub mod product_prices;
pub mod plazas;
pub mod predictions;

use actix_web::{get, web, HttpResponse};

#[get("/")]
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "API funcionando 🚀"
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(root)
        .service(health::health_check)
        .configure(auth::auth_routes)
        .configure(register::register_routes)
        .configure(password_recovery::password_routes)
        .configure(prices::prices_routes)
        .configure(price_history::price_history_routes)
        .configure(product_prices::product_prices_routes)
        .configure(plazas::plazas_routes)
        .configure(predictions::predictions_routes);
}

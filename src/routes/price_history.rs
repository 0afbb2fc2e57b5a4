// ============================================================================
// ROUTES : HISTORIQUE DE PRIX
// ============================================================================
//
// Endpoint (PUBLIC):
//   - GET /price-history/{product_name}?months=12 : série historique d'un
//     produit avec segmentation en périodes de tendance et statistiques
//
// Points d'attention:
//   - months ∈ [1, 120], défaut 12 (~30 jours par mois pour la fenêtre)
//   - Seules les plazas actives alimentent l'historique ; si le mercado
//     associé au produit est inactif la requête est refusée (403)
//   - Les noms acceptent tirets/underscores comme séparateurs
//
// ============================================================================

use actix_web::{get, web, HttpResponse};
use chrono::{Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashSet;

use crate::models::dto::HistoryQuery;
use crate::models::plaza::Entity as Plazas;
use crate::models::price::{Column as PriceColumn, Entity as Prices};
use crate::models::price_history::{Column as HistoryColumn, Entity as PriceHistory};
use crate::models::product::Entity as Products;
use crate::services::trend::{self, PricePoint};
use crate::utils::text::{clave_busqueda, limpiar_nombre};

const MESES_MIN: i64 = 1;
const MESES_MAX: i64 = 120;
const MESES_DEFECTO: i64 = 12;

/// GET /price-history/{product_name} - Historique et tendances d'un produit
#[get("/{product_name}")]
pub async fn get_price_history(
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let product_name = path.into_inner();

    // 1. Validation de la fenêtre temporelle
    let months = query.months.unwrap_or(MESES_DEFECTO);
    if !(MESES_MIN..=MESES_MAX).contains(&months) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "detail": format!(
                "El parámetro 'months' debe estar entre 1 y 120 (recibido: {}).",
                months
            )
        }));
    }

    let nombre_limpio = limpiar_nombre(&product_name);
    let clave = clave_busqueda(&product_name);

    // 2. Produits correspondants (comparaison insensible aux séparateurs)
    let productos = match Products::find().all(db.get_ref()).await {
        Ok(p) => p,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Database error: {}", e)
            }));
        }
    };
    let producto_ids: Vec<i32> = productos
        .iter()
        .filter(|p| clave_busqueda(&p.nombre) == clave)
        .map(|p| p.producto_id)
        .collect();

    let precios = if producto_ids.is_empty() {
        Vec::new()
    } else {
        match Prices::find()
            .filter(PriceColumn::ProductoId.is_in(producto_ids))
            .all(db.get_ref())
            .await
        {
            Ok(p) => p,
            Err(e) => {
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "detail": format!("Database error: {}", e)
                }));
            }
        }
    };

    let plazas = match Plazas::find().all(db.get_ref()).await {
        Ok(p) => p,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Database error: {}", e)
            }));
        }
    };
    let plazas_activas: HashSet<i32> = plazas
        .iter()
        .filter(|p| {
            p.estado
                .as_deref()
                .map(|e| e.eq_ignore_ascii_case("activa"))
                .unwrap_or(false)
        })
        .map(|p| p.plaza_id)
        .collect();

    // 3. Garde-fou : le mercado associé au produit doit être actif
    if let Some(primero) = precios.first() {
        if !plazas_activas.contains(&primero.plaza_id) {
            return HttpResponse::Forbidden().json(serde_json::json!({
                "detail": "El mercado asociado a este producto está inactivo."
            }));
        }
    }

    let precio_ids: Vec<i32> = precios
        .iter()
        .filter(|p| plazas_activas.contains(&p.plaza_id))
        .map(|p| p.precio_id)
        .collect();

    // 4. Fenêtre : ~30 jours par mois demandé
    let fecha_inicio = (Utc::now() - Duration::days(30 * months)).date_naive();

    let registros = if precio_ids.is_empty() {
        Vec::new()
    } else {
        match PriceHistory::find()
            .filter(HistoryColumn::PrecioId.is_in(precio_ids))
            .filter(HistoryColumn::FechaPrecio.gte(fecha_inicio))
            .order_by_asc(HistoryColumn::FechaPrecio)
            .all(db.get_ref())
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "detail": format!("Database error: {}", e)
                }));
            }
        }
    };

    // 5. Aucun historique : suggestions de produits proches
    if registros.is_empty() {
        let busqueda = nombre_limpio.to_lowercase();
        let mut similares: Vec<String> = productos
            .iter()
            .filter(|p| p.nombre.to_lowercase().contains(&busqueda))
            .map(|p| p.nombre.clone())
            .collect();
        similares.sort();
        similares.truncate(5);

        if !similares.is_empty() {
            return HttpResponse::NotFound().json(serde_json::json!({
                "detail": format!(
                    "No se encontró historial de precios para '{}'. ¿Quizás quiso decir: {}?",
                    product_name,
                    similares.join(", ")
                )
            }));
        }
        return HttpResponse::NotFound().json(serde_json::json!({
            "detail": format!(
                "No se encontraron datos históricos para '{}' en los últimos {} meses \
                 o el mercado asociado está inactivo.",
                product_name, months
            )
        }));
    }

    // 6. Série pour l'engin de tendances (prix positifs uniquement, la BD
    //    peut contenir des relevés corrompus)
    let historial: Vec<PricePoint> = registros
        .iter()
        .filter_map(|r| {
            let precio = r.precio_historico.to_f64()?;
            (precio > 0.0).then_some(PricePoint { fecha: r.fecha_precio, precio })
        })
        .collect();

    if historial.is_empty() {
        return HttpResponse::NotFound().json(serde_json::json!({
            "detail": format!(
                "No se encontraron datos históricos para '{}' en los últimos {} meses \
                 o el mercado asociado está inactivo.",
                product_name, months
            )
        }));
    }

    let (periodos, resumen) = trend::segmentar_historial(&historial);

    let historial_json: Vec<serde_json::Value> = historial
        .iter()
        .map(|p| {
            serde_json::json!({
                "fecha": p.fecha.format("%Y-%m-%d").to_string(),
                "precio_por_kg": p.precio
            })
        })
        .collect();

    HttpResponse::Ok().json(serde_json::json!({
        "producto": nombre_limpio,
        "periodo_meses": months,
        "fecha_inicio": historial.first().map(|p| p.fecha.format("%Y-%m-%d").to_string()),
        "fecha_fin": historial.last().map(|p| p.fecha.format("%Y-%m-%d").to_string()),
        "tendencia_general": resumen.tendencia_general,
        "estadisticas": {
            "precio_inicial": resumen.precio_inicial,
            "precio_final": resumen.precio_final,
            "precio_promedio": resumen.precio_promedio,
            "precio_maximo": resumen.precio_maximo,
            "precio_minimo": resumen.precio_minimo,
            "variacion_porcentual": resumen.variacion_porcentual,
            "total_registros": resumen.total_registros
        },
        "periodos": periodos,
        "historial": historial_json
    }))
}

pub fn price_history_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/price-history").service(get_price_history));
}

// ============================================================================
// ROUTES : CONSULTATION DE PRIX
// ============================================================================
//
// Endpoints (PUBLIC):
//   - GET /prices/latest/   : dernier prix d'un produit dans une plaza de
//     Medellín (recherche partielle insensible à la casse, suggestions si
//     aucun résultat)
//   - GET /prices/options/  : listes produits + plazas de Medellín
//   - GET /prices/products/ : liste complète des produits
//   - GET /prices/markets/medellin/ : plazas de Medellín
//
// ============================================================================

use actix_web::{get, web, HttpResponse};
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::models::dto::{LatestPriceQuery, PlazaOption, ProductOption};
use crate::models::plaza::Entity as Plazas;
use crate::models::price::{Column as PriceColumn, Entity as Prices};
use crate::models::product::Entity as Products;

const CIUDAD_MEDELLIN: &str = "medellín";

/// GET /prices/latest/ - Dernier prix d'un produit dans une plaza
#[get("/latest/")]
pub async fn get_latest_price(
    query: web::Query<LatestPriceQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Produits et plazas candidats (match partiel insensible à la casse)
    let productos = match Products::find().all(db.get_ref()).await {
        Ok(p) => p,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Database error: {}", e)
            }));
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

    let busqueda_producto = query.product_name.to_lowercase();
    let busqueda_plaza = query.market_name.to_lowercase();

    let producto_ids: Vec<i32> = productos
        .iter()
        .filter(|p| p.nombre.to_lowercase().contains(&busqueda_producto))
        .map(|p| p.producto_id)
        .collect();

    let plazas_medellin: Vec<_> = plazas
        .iter()
        .filter(|p| p.ciudad.to_lowercase() == CIUDAD_MEDELLIN)
        .collect();
    let plaza_ids: Vec<i32> = plazas_medellin
        .iter()
        .filter(|p| p.nombre.to_lowercase().contains(&busqueda_plaza))
        .map(|p| p.plaza_id)
        .collect();

    // 2. Prix le plus récent parmi les candidats
    let precio = if producto_ids.is_empty() || plaza_ids.is_empty() {
        None
    } else {
        match Prices::find()
            .filter(PriceColumn::ProductoId.is_in(producto_ids))
            .filter(PriceColumn::PlazaId.is_in(plaza_ids))
            .order_by_desc(PriceColumn::Fecha)
            .limit(1)
            .one(db.get_ref())
            .await
        {
            Ok(precio) => precio,
            Err(e) => {
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "detail": format!("Database error: {}", e)
                }));
            }
        }
    };

    let precio = match precio {
        Some(precio) => precio,
        None => {
            // 3. Suggestions sur les 3 premiers caractères de la recherche
            let prefijo: String = busqueda_producto.chars().take(3).collect();
            let mut sugerencias: Vec<String> = productos
                .iter()
                .filter(|p| !prefijo.is_empty() && p.nombre.to_lowercase().contains(&prefijo))
                .map(|p| p.nombre.clone())
                .collect();
            sugerencias.sort();
            sugerencias.truncate(5);

            if !sugerencias.is_empty() {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "detail": {
                        "message": "No exact results found. Did you mean one of these?",
                        "suggestions": sugerencias
                    }
                }));
            }
            return HttpResponse::NotFound().json(serde_json::json!({
                "detail": "No results found for your search."
            }));
        }
    };

    let nombre_producto = productos
        .iter()
        .find(|p| p.producto_id == precio.producto_id)
        .map(|p| p.nombre.clone())
        .unwrap_or_default();
    let nombre_plaza = plazas
        .iter()
        .find(|p| p.plaza_id == precio.plaza_id)
        .map(|p| p.nombre.clone())
        .unwrap_or_default();

    HttpResponse::Ok().json(serde_json::json!({
        "producto": nombre_producto,
        "plaza": nombre_plaza,
        "precio_por_kg": precio.precio_por_kg.to_f64().unwrap_or(0.0),
        "ultima_actualizacion": precio.fecha,
        "mensaje": "Consulta realizada exitosamente."
    }))
}

async fn productos_ordenados(db: &DatabaseConnection) -> Result<Vec<ProductOption>, String> {
    use crate::models::product::Column as ProductColumn;

    let productos = Products::find()
        .order_by_asc(ProductColumn::Nombre)
        .all(db)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(productos
        .into_iter()
        .map(|p| ProductOption { id: p.producto_id, nombre: p.nombre })
        .collect())
}

async fn plazas_de_medellin(db: &DatabaseConnection) -> Result<Vec<PlazaOption>, String> {
    use crate::models::plaza::Column as PlazaColumn;

    let plazas = Plazas::find()
        .order_by_asc(PlazaColumn::Nombre)
        .all(db)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(plazas
        .into_iter()
        .filter(|p| p.ciudad.to_lowercase() == CIUDAD_MEDELLIN)
        .map(|p| PlazaOption { id: p.plaza_id, nombre: p.nombre, ciudad: p.ciudad })
        .collect())
}

/// GET /prices/options/ - Produits et plazas disponibles (pour les sélecteurs)
#[get("/options/")]
pub async fn get_options(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let productos = match productos_ordenados(db.get_ref()).await {
        Ok(p) => p,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({ "detail": e }));
        }
    };
    let plazas = match plazas_de_medellin(db.get_ref()).await {
        Ok(p) => p,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({ "detail": e }));
        }
    };

    HttpResponse::Ok().json(serde_json::json!({
        "productos": productos,
        "plazas": plazas,
        "mensaje": "Opciones disponibles obtenidas correctamente."
    }))
}

/// GET /prices/products/ - Liste complète des produits
#[get("/products/")]
pub async fn list_products(db: web::Data<DatabaseConnection>) -> HttpResponse {
    match productos_ordenados(db.get_ref()).await {
        Ok(productos) => HttpResponse::Ok().json(serde_json::json!({
            "productos": productos,
            "mensaje": "Lista de productos obtenida exitosamente."
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "detail": e })),
    }
}

/// GET /prices/markets/medellin/ - Plazas de Medellín
#[get("/markets/medellin/")]
pub async fn list_medellin_markets(db: web::Data<DatabaseConnection>) -> HttpResponse {
    match plazas_de_medellin(db.get_ref()).await {
        Ok(plazas) => HttpResponse::Ok().json(serde_json::json!({
            "plazas": plazas,
            "mensaje": "Lista de plazas de Medellín obtenida exitosamente."
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "detail": e })),
    }
}

pub fn prices_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/prices")
            .service(get_latest_price)
            .service(get_options)
            .service(list_products)
            .service(list_medellin_markets),
    );
}

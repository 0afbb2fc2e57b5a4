// ============================================================================
// ROUTES : COMPARAISON DE PRIX ENTRE PLAZAS
// ============================================================================
//
// Endpoints (PUBLIC):
//   - GET /product-prices/plazas  : plazas actives disponibles
//   - GET /product-prices/compare : prix d'un produit groupés par plaza,
//     toutes plazas actives ou une sélection (plaza_names séparées par des
//     virgules), avec statistiques par plaza et globales
//
// ============================================================================

use actix_web::{get, web, HttpResponse};
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::BTreeMap;

use crate::models::dto::{CompareQuery, GlobalPriceStats, PlazaComparison};
use crate::models::plaza::{self, Column as PlazaColumn, Entity as Plazas};
use crate::models::price::{Column as PriceColumn, Entity as Prices};
use crate::models::product::Entity as Products;
use crate::utils::text::{clave_busqueda, limpiar_nombre};

fn redondear2(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}

fn es_activa(plaza: &plaza::Model) -> bool {
    plaza
        .estado
        .as_deref()
        .map(|e| e.eq_ignore_ascii_case("activa"))
        .unwrap_or(false)
}

/// GET /product-prices/plazas - Plazas actives
#[get("/plazas")]
pub async fn get_available_plazas(db: web::Data<DatabaseConnection>) -> HttpResponse {
    println!("📋 Listing available plazas");

    let plazas = match Plazas::find()
        .order_by_asc(PlazaColumn::Nombre)
        .all(db.get_ref())
        .await
    {
        Ok(p) => p,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Error al obtener plazas: {}", e)
            }));
        }
    };

    let activas: Vec<serde_json::Value> = plazas
        .iter()
        .filter(|p| es_activa(p))
        .map(|p| {
            serde_json::json!({
                "plaza_id": p.plaza_id,
                "nombre": p.nombre,
                "ciudad": p.ciudad,
                "estado": p.estado
            })
        })
        .collect();

    HttpResponse::Ok().json(serde_json::json!({
        "total_plazas": activas.len(),
        "plazas": activas
    }))
}

/// GET /product-prices/compare - Comparaison des prix d'un produit par plaza
#[get("/compare")]
pub async fn compare_product_prices(
    query: web::Query<CompareQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let producto_limpio = limpiar_nombre(&query.product_name);
    let clave_producto = clave_busqueda(&query.product_name);

    // plaza_names est une liste séparée par des virgules
    let seleccion: Vec<String> = query
        .plaza_names
        .as_deref()
        .map(|lista| {
            lista
                .split(',')
                .map(limpiar_nombre)
                .filter(|n| !n.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let modo_filtrado = !seleccion.is_empty();

    println!(
        "🔍 Comparing prices - product: {}, mode: {}",
        producto_limpio,
        if modo_filtrado { "selected plazas" } else { "all plazas" }
    );

    let productos = match Products::find().all(db.get_ref()).await {
        Ok(p) => p,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Error interno del servidor: {}", e)
            }));
        }
    };
    let producto_ids: Vec<i32> = productos
        .iter()
        .filter(|p| clave_busqueda(&p.nombre) == clave_producto)
        .map(|p| p.producto_id)
        .collect();

    let plazas = match Plazas::find().all(db.get_ref()).await {
        Ok(p) => p,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Error interno del servidor: {}", e)
            }));
        }
    };

    // 1. Validation des plazas sélectionnées (elles doivent exister et
    //    être actives)
    let mut plaza_ids: Vec<i32> = Vec::new();
    if modo_filtrado {
        let mut faltantes: Vec<String> = Vec::new();
        for nombre in &seleccion {
            let clave = clave_busqueda(nombre);
            match plazas
                .iter()
                .find(|p| es_activa(p) && clave_busqueda(&p.nombre) == clave)
            {
                Some(plaza) => plaza_ids.push(plaza.plaza_id),
                None => faltantes.push(nombre.clone()),
            }
        }

        if !faltantes.is_empty() {
            return HttpResponse::NotFound().json(serde_json::json!({
                "detail": format!(
                    "Algunas plazas no existen o no están activas: {:?}",
                    faltantes
                )
            }));
        }
    } else {
        plaza_ids = plazas.iter().filter(|p| es_activa(p)).map(|p| p.plaza_id).collect();
    }

    // 2. Relevés de prix du produit dans les plazas retenues
    let precios = if producto_ids.is_empty() || plaza_ids.is_empty() {
        Vec::new()
    } else {
        match Prices::find()
            .filter(PriceColumn::ProductoId.is_in(producto_ids))
            .filter(PriceColumn::PlazaId.is_in(plaza_ids))
            .order_by_desc(PriceColumn::Fecha)
            .all(db.get_ref())
            .await
        {
            Ok(p) => p,
            Err(e) => {
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "detail": format!("Error interno del servidor: {}", e)
                }));
            }
        }
    };

    if precios.is_empty() {
        let donde = if modo_filtrado {
            "las plazas seleccionadas"
        } else {
            "ninguna plaza registrada"
        };
        return HttpResponse::NotFound().json(serde_json::json!({
            "detail": format!(
                "No se encontraron precios para '{}' en {}.",
                query.product_name, donde
            )
        }));
    }

    // 3. Groupement par plaza (BTreeMap : tri alphabétique des plazas).
    //    Les relevés arrivent triés par date décroissante, le premier de
    //    chaque groupe est donc le plus récent.
    let mut grupos: BTreeMap<String, (String, Vec<(f64, String)>)> = BTreeMap::new();
    let mut todos_los_precios: Vec<f64> = Vec::new();

    for precio in &precios {
        let plaza = match plazas.iter().find(|p| p.plaza_id == precio.plaza_id) {
            Some(plaza) => plaza,
            None => continue,
        };
        let valor = precio.precio_por_kg.to_f64().unwrap_or(0.0);
        todos_los_precios.push(valor);

        grupos
            .entry(plaza.nombre.clone())
            .or_insert_with(|| (plaza.ciudad.clone(), Vec::new()))
            .1
            .push((valor, precio.fecha.format("%Y-%m-%d").to_string()));
    }

    let comparacion: Vec<PlazaComparison> = grupos
        .iter()
        .map(|(nombre, (ciudad, registros))| {
            let valores: Vec<f64> = registros.iter().map(|(v, _)| *v).collect();
            let suma: f64 = valores.iter().sum();
            PlazaComparison {
                plaza: nombre.clone(),
                ciudad: ciudad.clone(),
                precio_promedio: redondear2(suma / valores.len() as f64),
                precio_minimo: valores.iter().copied().fold(f64::MAX, f64::min),
                precio_maximo: valores.iter().copied().fold(f64::MIN, f64::max),
                ultimo_precio: registros[0].0,
                ultima_fecha: registros[0].1.clone(),
                total_registros: registros.len(),
            }
        })
        .collect();

    let minimo_global = todos_los_precios.iter().copied().fold(f64::MAX, f64::min);
    let maximo_global = todos_los_precios.iter().copied().fold(f64::MIN, f64::max);
    let estadisticas = GlobalPriceStats {
        precio_promedio_global: redondear2(
            todos_los_precios.iter().sum::<f64>() / todos_los_precios.len() as f64,
        ),
        precio_minimo_global: minimo_global,
        precio_maximo_global: maximo_global,
        diferencia_max_min: redondear2(maximo_global - minimo_global),
    };

    let plazas_con_datos: Vec<String> = grupos.keys().cloned().collect();

    HttpResponse::Ok().json(serde_json::json!({
        "producto": producto_limpio,
        "modo_comparacion": if modo_filtrado { "seleccionadas" } else { "todas" },
        "plazas_filtradas": if modo_filtrado { Some(&seleccion) } else { None },
        "total_resultados": precios.len(),
        "plazas_con_datos": plazas_con_datos,
        "comparacion": comparacion,
        "estadisticas": estadisticas
    }))
}

pub fn product_prices_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/product-prices")
            .service(get_available_plazas)
            .service(compare_product_prices),
    );
}

// ============================================================================
// ROUTES : PLAZAS DE MERCADO
// ============================================================================
//
// Endpoints:
//   - GET /plazas/{plaza_id} : détail d'une plaza (PUBLIC)
//   - POST /plazas/ : création (ADMIN, credentials en query string)
//   - PUT /plazas/{plaza_id}/estado : activa/inactiva (ADMIN, Bearer token)
//
// ============================================================================

use actix_web::{get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::middleware::AuthUser;
use crate::models::dto::{AdminCredentials, EstadoQuery, PlazaCreate};
use crate::services::plaza_service::{self, PlazaError};

fn respuesta_error(error: PlazaError) -> HttpResponse {
    match error {
        PlazaError::Duplicada => HttpResponse::BadRequest().json(serde_json::json!({
            "detail": "Ya existe una plaza con ese nombre en la misma ciudad"
        })),
        PlazaError::CoordenadasInvalidas => HttpResponse::BadRequest().json(serde_json::json!({
            "detail": "Formato inválido de coordenadas. Usa '(lat, lng)'"
        })),
        PlazaError::NoEncontrada => HttpResponse::NotFound().json(serde_json::json!({
            "detail": "Plaza no encontrada."
        })),
        PlazaError::EstadoInvalido => HttpResponse::BadRequest().json(serde_json::json!({
            "detail": "El estado debe ser 'activa' o 'inactiva'."
        })),
        PlazaError::AccesoDenegado => HttpResponse::Forbidden().json(serde_json::json!({
            "detail": "Acceso denegado. Solo el administrador puede realizar esta acción."
        })),
        PlazaError::Db(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "detail": e
        })),
    }
}

/// GET /plazas/{plaza_id} - Détail d'une plaza (PUBLIC)
#[get("/{plaza_id}")]
pub async fn obtener_plaza(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let plaza_id = path.into_inner();

    match plaza_service::obtener_plaza_por_id(db.get_ref(), plaza_id).await {
        Ok(Some(detalle)) => HttpResponse::Ok().json(detalle),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "detail": "Plaza no encontrada"
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "detail": e
        })),
    }
}

/// POST /plazas/ - Création d'une plaza (ADMIN via credentials en query)
#[post("/")]
pub async fn crear_plaza(
    body: web::Json<PlazaCreate>,
    credentials: web::Query<AdminCredentials>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(e) =
        plaza_service::verificar_admin(db.get_ref(), &credentials.email, &credentials.password)
            .await
    {
        return respuesta_error(e);
    }

    match plaza_service::crear_plaza(db.get_ref(), body.into_inner()).await {
        Ok(plaza) => HttpResponse::Created().json(serde_json::json!({
            "mensaje": "Plaza creada exitosamente",
            "plaza": {
                "plaza_id": plaza.plaza_id,
                "nombre": plaza.nombre,
                "estado": plaza.estado
            }
        })),
        Err(e) => respuesta_error(e),
    }
}

/// PUT /plazas/{plaza_id}/estado - Active ou désactive une plaza (ADMIN)
#[put("/{plaza_id}/estado")]
pub async fn actualizar_estado(
    auth_user: AuthUser,
    path: web::Path<i32>,
    query: web::Query<EstadoQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if !auth_user.is_admin() {
        return respuesta_error(PlazaError::AccesoDenegado);
    }

    let plaza_id = path.into_inner();

    match plaza_service::actualizar_estado(db.get_ref(), plaza_id, &query.estado).await {
        Ok(plaza) => {
            let nuevo_estado = plaza.estado.clone().unwrap_or_default();
            HttpResponse::Ok().json(serde_json::json!({
                "plaza_id": plaza.plaza_id,
                "nombre": plaza.nombre,
                "nuevo_estado": nuevo_estado,
                "mensaje": format!("Plaza '{}' actualizada a '{}'.", plaza.nombre, nuevo_estado)
            }))
        }
        Err(e) => respuesta_error(e),
    }
}

pub fn plazas_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/plazas")
            .service(crear_plaza)
            .service(actualizar_estado)
            .service(obtener_plaza),
    );
}

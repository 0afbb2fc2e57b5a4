use actix_web::{post, web, HttpResponse};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use validator::Validate;

use crate::models::dto::RegisterRequest;
use crate::models::users::{ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users};
use crate::utils::password;

/// POST /registro/ - Inscription d'un nouvel utilisateur (PUBLIC)
#[post("/")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Format de l'email et nom non vide
    if body.validate().is_err() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "detail": "Datos de registro inválidos (revisa el email)."
        }));
    }

    // 2. Règles de robustesse du mot de passe
    if let Err(mensaje) = password::validate_password_strength(&body.password) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "detail": mensaje
        }));
    }

    // 3. Unicité de l'email
    let existing = Users::find()
        .filter(UserColumn::Correo.eq(&body.email))
        .one(db.get_ref())
        .await;

    match existing {
        Ok(Some(_)) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "detail": "Email already registered."
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Database error: {}", e)
            }));
        }
        _ => {}
    }

    // 4. Hash argon2 puis insertion
    let contrasena_hash = match password::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Failed to hash password: {}", e)
            }));
        }
    };

    let nuevo = UserActiveModel {
        nombre: Set(body.name.clone()),
        correo: Set(body.email.clone()),
        contrasena_hash: Set(contrasena_hash),
        rol: Set("usuario".to_string()),
        intentos_fallidos: Set(0),
        cuenta_bloqueada_hasta: Set(None),
        ..Default::default()
    };

    match nuevo.insert(db.get_ref()).await {
        Ok(_) => HttpResponse::Created().json(serde_json::json!({
            "message": "User successfully registered."
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "detail": format!("Failed to create user: {}", e)
        })),
    }
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/registro").service(register));
}

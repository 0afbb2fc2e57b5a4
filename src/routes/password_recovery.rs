// ============================================================================
// ROUTES : RÉCUPÉRATION DE MOT DE PASSE
// ============================================================================
//
// Workflow:
//   1. POST /password/recover/{correo} : génère un token UUID v4 (1h de
//      validité, usage unique), le stocke dans enlaces_correo et envoie le
//      lien de reset par email
//   2. POST /password/reset/{token} : vérifie le token (existe, non expiré,
//      non utilisé), valide le nouveau mot de passe et le remplace
//
// ============================================================================

use actix_web::{post, web, HttpResponse};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::models::dto::ResetPasswordRequest;
use crate::models::email_link::{
    ActiveModel as LinkActiveModel, Column as LinkColumn, Entity as EmailLinks,
    Model as LinkModel,
};
use crate::models::users::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users, Model as UserModel,
};
use crate::utils::email::Mailer;
use crate::utils::password;

const HORAS_VALIDEZ_ENLACE: i64 = 1;

fn base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// POST /password/recover/{correo} - Envoie le lien de récupération (PUBLIC)
#[post("/recover/{correo}")]
pub async fn recover_password(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<Mailer>,
) -> HttpResponse {
    let correo = path.into_inner();

    // 1. L'utilisateur doit exister
    let user = match Users::find()
        .filter(UserColumn::Correo.eq(&correo))
        .one(db.get_ref())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "detail": "Usuario no encontrado"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Database error: {}", e)
            }));
        }
    };

    // 2. Token UUID v4, usage unique, expire dans 1 heure
    let token = Uuid::new_v4().to_string();
    let ahora = Utc::now().naive_utc();

    let enlace = LinkActiveModel {
        usuario_id: Set(user.usuario_id),
        enlace_url: Set(token.clone()),
        tipo: Set("recuperacion_password".to_string()),
        expira_en: Set(ahora + Duration::hours(HORAS_VALIDEZ_ENLACE)),
        usado: Set(false),
        fecha_creacion: Set(Some(ahora)),
        ..Default::default()
    };

    if let Err(e) = enlace.insert(db.get_ref()).await {
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "detail": format!("Failed to create recovery link: {}", e)
        }));
    }

    // 3. Envoi de l'email (ici l'échec remonte en 500, contrairement à la
    //    notification de blocage qui est fire-and-forget)
    let reset_link = format!("{}/password/reset/{}", base_url(), token);
    if let Err(e) = mailer.send_recovery_email(&user.correo, &user.nombre, &reset_link).await {
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "detail": format!("Error en el envío del email: {}", e)
        }));
    }

    HttpResponse::Ok().json(serde_json::json!({
        "message": "Correo de recuperación de contraseña enviado exitosamente"
    }))
}

/// POST /password/reset/{token} - Applique le nouveau mot de passe (PUBLIC)
#[post("/reset/{token}")]
pub async fn reset_password(
    path: web::Path<String>,
    body: web::Json<ResetPasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let token = path.into_inner();

    // 1. Le token doit exister, ne pas être utilisé, ne pas être expiré
    let enlace = match EmailLinks::find()
        .filter(LinkColumn::EnlaceUrl.eq(&token))
        .one(db.get_ref())
        .await
    {
        Ok(Some(enlace)) => enlace,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "detail": "Link inválido"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Database error: {}", e)
            }));
        }
    };

    if enlace.usado {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "detail": "Link ya fue usado"
        }));
    }

    if enlace.expira_en < Utc::now().naive_utc() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "detail": "El link ha expirado"
        }));
    }

    // 2. L'utilisateur associé doit toujours exister
    let user = match Users::find_by_id(enlace.usuario_id).one(db.get_ref()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "detail": "Usuario no encontrado"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Database error: {}", e)
            }));
        }
    };

    // 3. Mêmes règles de robustesse qu'à l'inscription
    if password::validate_password_strength(&body.new_password).is_err() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "detail": "La contraseña debe tener al menos 8 caracteres, \
                       una mayúscula, un número y un carácter especial (!@#$%^&*)"
        }));
    }

    let contrasena_hash = match password::hash_password(&body.new_password) {
        Ok(hash) => hash,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Failed to hash password: {}", e)
            }));
        }
    };

    // 4. Nouveau mot de passe + invalidation du token, atomiquement
    if let Err(e) = confirmar_reset(db.get_ref(), user, enlace, contrasena_hash).await {
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "detail": format!("Failed to update password: {}", e)
        }));
    }

    HttpResponse::Ok().json(serde_json::json!({
        "message": "Contraseña restablecida exitosamente"
    }))
}

/// Applique le nouveau hash et marque le lien comme utilisé dans une seule
/// transaction : un échec sur la seconde écriture ne doit pas laisser un
/// lien encore réutilisable alors que le mot de passe a déjà changé.
async fn confirmar_reset(
    db: &DatabaseConnection,
    user: UserModel,
    enlace: LinkModel,
    contrasena_hash: String,
) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    let mut user_active: UserActiveModel = user.into();
    user_active.contrasena_hash = Set(contrasena_hash);
    user_active.update(&txn).await?;

    let mut enlace_active: LinkActiveModel = enlace.into();
    enlace_active.usado = Set(true);
    enlace_active.update(&txn).await?;

    txn.commit().await
}

pub fn password_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/password")
            .service(recover_password)
            .service(reset_password),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn usuario(contrasena_hash: &str) -> UserModel {
        UserModel {
            usuario_id: 1,
            nombre: "Laura".to_string(),
            correo: "laura@example.com".to_string(),
            contrasena_hash: contrasena_hash.to_string(),
            rol: "usuario".to_string(),
            intentos_fallidos: 0,
            cuenta_bloqueada_hasta: None,
        }
    }

    fn enlace(usado: bool) -> LinkModel {
        let ahora = Utc::now().naive_utc();
        LinkModel {
            enlace_id: 7,
            usuario_id: 1,
            enlace_url: "4ae0cbc3-7c5f-4d28-b2ff-0123456789ab".to_string(),
            tipo: "recuperacion_password".to_string(),
            expira_en: ahora + Duration::hours(HORAS_VALIDEZ_ENLACE),
            usado,
            fecha_creacion: Some(ahora),
        }
    }

    #[tokio::test]
    async fn test_reset_updates_password_and_link_in_one_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![usuario("nuevo-hash")]])
            .append_query_results([vec![enlace(true)]])
            .into_connection();

        confirmar_reset(&db, usuario("viejo-hash"), enlace(false), "nuevo-hash".to_string())
            .await
            .unwrap();

        // Les deux UPDATE partent dans la même transaction, jamais en
        // écritures indépendantes sur la connexion
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("usuarios"));
        assert!(sql.contains("enlaces_correo"));
    }
}

// ============================================================================
// ROUTES : AUTHENTIFICATION
// ============================================================================
//
// Endpoints:
//   - POST /auth/login : credentials → JWT, avec verrouillage de compte
//     (3 échecs consécutifs → blocage 15 minutes + email)
//   - POST /auth/logout : révoque le token courant (blacklist en mémoire)
//
// ============================================================================

use actix_web::{post, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::models::dto::{LoginRequest, LoginResponse};
use crate::services::account_repo::SeaOrmAccountRepository;
use crate::services::login::{LockNotifier, LoginOutcome, LoginService};
use crate::utils::email::Mailer;
use crate::utils::jwt;
use crate::utils::password::Argon2Verifier;
use crate::utils::token_blacklist::TokenBlacklist;

/// Notification de blocage en arrière-plan : la réponse HTTP n'attend
/// jamais le SMTP, et un échec d'envoi est seulement loggé.
pub struct EmailLockNotifier {
    mailer: web::Data<Mailer>,
}

impl EmailLockNotifier {
    pub fn new(mailer: web::Data<Mailer>) -> Self {
        Self { mailer }
    }
}

impl LockNotifier for EmailLockNotifier {
    fn notify_lock(&self, correo: &str, nombre: &str) {
        let mailer = self.mailer.clone();
        let correo = correo.to_string();
        let nombre = nombre.to_string();

        tokio::spawn(async move {
            if let Err(e) = mailer.send_lock_email(&correo, &nombre).await {
                eprintln!("⚠️  Failed to send lock notification to {}: {}", correo, e);
            }
        });
    }
}

/// POST /auth/login - Authentification avec verrouillage de compte (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<Mailer>,
) -> HttpResponse {
    let service = LoginService::new(
        SeaOrmAccountRepository::new(db.into_inner()),
        Argon2Verifier,
        EmailLockNotifier::new(mailer),
    );

    let outcome = match service.attempt_login(&body.email, &body.password).await {
        Ok(outcome) => outcome,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": format!("Error interno del servidor: {}", e)
            }));
        }
    };

    match outcome {
        LoginOutcome::Success { subject, role } => {
            let token = match jwt::generate_token(&subject, &role) {
                Ok(token) => token,
                Err(e) => {
                    return HttpResponse::InternalServerError().json(serde_json::json!({
                        "detail": format!("Failed to generate token: {}", e)
                    }));
                }
            };

            HttpResponse::Ok().json(LoginResponse {
                mensaje: "Inicio de sesión exitoso".to_string(),
                usuario: subject,
                rol: role,
                access_token: token,
                tipo_token: "bearer".to_string(),
            })
        }
        // Email inconnu et mot de passe faux : même réponse
        LoginOutcome::InvalidCredentials => HttpResponse::BadRequest().json(serde_json::json!({
            "detail": "Correo o contraseña incorrectos"
        })),
        LoginOutcome::AccountLocked { retry_after, just_locked } => {
            // Deux messages : la tentative qui vient de bloquer le compte
            // n'est pas annoncée comme une tentative sous blocage
            let detail = if just_locked {
                "Cuenta bloqueada por múltiples intentos fallidos. Revisa tu correo electrónico."
            } else {
                "Cuenta bloqueada temporalmente. Revisa tu correo electrónico."
            };

            HttpResponse::Forbidden().json(serde_json::json!({
                "detail": detail,
                "retry_after_segundos": retry_after.num_seconds()
            }))
        }
    }
}

/// POST /auth/logout - Révoque le token Bearer courant (PUBLIC)
#[post("/logout")]
pub async fn logout(req: HttpRequest, blacklist: web::Data<TokenBlacklist>) -> HttpResponse {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    let token = match token {
        Some(token) if !token.is_empty() => token,
        _ => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "detail": "Token no proporcionado"
            }));
        }
    };

    if !blacklist.revoke(token) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "detail": "El token ya fue invalidado"
        }));
    }

    HttpResponse::Ok().json(serde_json::json!({
        "message": "Sesión cerrada correctamente"
    }))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").service(login).service(logout));
}

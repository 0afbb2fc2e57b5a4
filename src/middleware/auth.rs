use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest, HttpResponse};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::utils::jwt;
use crate::utils::token_blacklist::TokenBlacklist;

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub correo: String,
    pub rol: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.rol == "admin"
    }
}

fn unauthorized(body: serde_json::Value) -> Error {
    let response = HttpResponse::Unauthorized().json(body);
    actix_web::error::InternalError::from_response("", response).into()
}

/// Implémentation de FromRequest pour AuthUser
/// Cela permet à Actix-Web d'extraire automatiquement AuthUser des requêtes
impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // 1. Extraire le header Authorization
        let auth_header = match req.headers().get("Authorization") {
            Some(header) => header,
            None => {
                return ready(Err(unauthorized(serde_json::json!({
                    "error": "Missing Authorization header"
                }))));
            }
        };

        // 2. Convertir le header en string
        let auth_str = match auth_header.to_str() {
            Ok(s) => s,
            Err(_) => {
                return ready(Err(unauthorized(serde_json::json!({
                    "error": "Invalid Authorization header"
                }))));
            }
        };

        // 3. Extraire le token (format: "Bearer <token>")
        let token = if auth_str.starts_with("Bearer ") {
            &auth_str[7..]
        } else {
            return ready(Err(unauthorized(serde_json::json!({
                "error": "Invalid Authorization format (expected: Bearer <token>)"
            }))));
        };

        // 4. Rejeter les tokens révoqués au logout
        if let Some(blacklist) = req.app_data::<web::Data<TokenBlacklist>>() {
            if blacklist.contains(token) {
                return ready(Err(unauthorized(serde_json::json!({
                    "detail": "Token inválido (logout requerido)"
                }))));
            }
        }

        // 5. Vérifier le token JWT
        let claims = match jwt::verify_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                return ready(Err(unauthorized(serde_json::json!({
                    "error": format!("Invalid token: {}", e)
                }))));
            }
        };

        // 6. Créer et retourner AuthUser
        ready(Ok(AuthUser {
            correo: claims.sub,
            rol: claims.rol,
        }))
    }
}

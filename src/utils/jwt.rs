use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};
use std::env;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,     // correo de l'utilisateur
    pub rol: String,     // "usuario" ou "admin"
    pub exp: i64,        // expiration timestamp
    pub iat: i64,        // issued-at timestamp
    pub jti: String,     // identifiant unique du token (UUID v4)
}

/// Récupère la clé secrète JWT depuis les variables d'environnement
fn get_jwt_secret() -> String {
    env::var("SECRET_KEY").unwrap_or_else(|_| {
        eprintln!("⚠️  WARNING: SECRET_KEY not found in .env, using default (INSECURE)");
        "default-insecure-key-change-this".to_string()
    })
}

/// Durée de vie du token en minutes (ACCESS_TOKEN_EXPIRE_MINUTES, défaut 30)
fn token_expire_minutes() -> i64 {
    env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30)
}

/// Génère un JWT pour un utilisateur authentifié
pub fn generate_token(correo: &str, rol: &str) -> Result<String, String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::minutes(token_expire_minutes()))
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: correo.to_string(),
        rol: rol.to_string(),
        exp: expiration,
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let secret = get_jwt_secret();

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
        .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Vérifie et décode un JWT
pub fn verify_token(token: &str) -> Result<Claims, String> {
    let secret = get_jwt_secret();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify_token() {
        let correo = "laura@example.com";
        let rol = "admin";

        let token = generate_token(correo, rol).unwrap();
        let claims = verify_token(&token).unwrap();

        assert_eq!(claims.sub, correo);
        assert_eq!(claims.rol, rol);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tokens_carry_unique_jti() {
        let t1 = generate_token("a@b.com", "usuario").unwrap();
        let t2 = generate_token("a@b.com", "usuario").unwrap();
        let c1 = verify_token(&t1).unwrap();
        let c2 = verify_token(&t2).unwrap();
        assert_ne!(c1.jti, c2.jti);
    }

    #[test]
    fn test_invalid_token() {
        let result = verify_token("invalid.token.here");
        assert!(result.is_err());
    }
}

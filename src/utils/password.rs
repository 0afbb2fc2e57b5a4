use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier as _, SaltString, rand_core::OsRng,
};

/// Hash un mot de passe en argon2 au format PHC, le même format que les
/// hashs passlib déjà présents dans la table usuarios (backend Python legacy)
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("Failed to hash password: {}", e))
}

/// Vérifie un mot de passe contre un hash PHC stocké.
/// Un hash illisible est une erreur; un mot de passe faux renvoie Ok(false).
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| format!("Invalid hash format: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Adaptateur pour la machine de login : toute erreur de format compte
/// comme un échec de vérification
pub struct Argon2Verifier;

impl crate::services::login::PasswordVerifier for Argon2Verifier {
    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        verify_password(password, stored_hash).unwrap_or(false)
    }
}

const CARACTERES_ESPECIALES: &str = "!@#$%^&*(),.?\":{}|<>";

/// Règles de robustesse des mots de passe (inscription et reset) :
/// 8+ caractères, une majuscule, une minuscule, un chiffre, un spécial.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must include at least one uppercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must include at least one lowercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must include at least one number.".to_string());
    }
    if !password.chars().any(|c| CARACTERES_ESPECIALES.contains(c)) {
        return Err("Password must include at least one special character.".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Strong123!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Strong123!", &hash).unwrap());
        assert!(!verify_password("Wrong123!", &hash).unwrap());
    }

    #[test]
    fn test_invalid_stored_hash_is_an_error() {
        assert!(verify_password("whatever", "not-a-phc-hash").is_err());
    }

    #[test]
    fn test_password_strength_rules() {
        assert!(validate_password_strength("Strong123!").is_ok());
        assert!(validate_password_strength("short1!A").is_ok());

        assert!(validate_password_strength("weak").is_err());
        assert!(validate_password_strength("nouppercase123!").is_err());
        assert!(validate_password_strength("NOLOWERCASE123!").is_err());
        assert!(validate_password_strength("NoNumbers!").is_err());
        assert!(validate_password_strength("NoSpecial123").is_err());
    }
}

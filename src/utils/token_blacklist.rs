use std::collections::HashSet;
use std::sync::RwLock;

/// Blacklist de tokens révoqués au logout. En mémoire uniquement : vidée à
/// chaque redémarrage du process (limitation assumée, pas de persistance).
/// Injectée via web::Data pour rester testable, jamais en static global.
pub struct TokenBlacklist {
    tokens: RwLock<HashSet<String>>,
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashSet::new()),
        }
    }

    /// Révoque le token. Renvoie false s'il était déjà révoqué.
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens
            .write()
            .expect("token blacklist lock poisoned")
            .insert(token.to_string())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens
            .read()
            .expect("token blacklist lock poisoned")
            .contains(token)
    }
}

impl Default for TokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_then_contains() {
        let blacklist = TokenBlacklist::new();
        assert!(!blacklist.contains("abc"));
        assert!(blacklist.revoke("abc"));
        assert!(blacklist.contains("abc"));
    }

    #[test]
    fn test_revoking_twice_reports_already_revoked() {
        let blacklist = TokenBlacklist::new();
        assert!(blacklist.revoke("abc"));
        assert!(!blacklist.revoke("abc"));
    }
}

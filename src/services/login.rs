// ============================================================================
// SERVICE : LOGIN / VERROUILLAGE DE COMPTE
// ============================================================================
//
// Description:
//   Machine à états du login : vérification des credentials, comptage des
//   échecs consécutifs, blocage temporaire (3 échecs → 15 minutes) et
//   notification par email en arrière-plan.
//
// États par compte:
//   - Active : cuenta_bloqueada_hasta = NULL ou dans le passé
//   - Locked : cuenta_bloqueada_hasta dans le futur
//
// Transitions:
//   - Locked + blocage expiré → Active (déverrouillage auto AVANT la
//     vérification du mot de passe, compteur remis à 0)
//   - Locked + blocage en cours → rejet direct, credentials NON vérifiés,
//     tentative NON comptée
//   - Active + 3e échec consécutif → Locked (hasta = now + 15 min) + email
//   - Active + succès → Active, compteur à 0, blocage levé
//
// Points d'attention:
//   - Email inconnu et mot de passe faux renvoient le même résultat
//     (InvalidCredentials) pour ne pas permettre l'énumération des comptes
//   - AccountLocked est un résultat distinct avec le délai de retry
//   - Les collaborateurs (repo, verifier, notifier) sont injectés pour
//     pouvoir tester la machine sans BD ni SMTP
//
// ============================================================================

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};

/// Nombre d'échecs consécutifs qui déclenche le blocage.
pub const MAX_INTENTOS_FALLIDOS: i32 = 3;
/// Durée du blocage temporaire, en minutes.
pub const MINUTOS_BLOQUEO: i64 = 15;

/// Vue du compte telle que la machine à états en a besoin.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub usuario_id: i32,
    pub nombre: String,
    pub correo: String,
    pub contrasena_hash: String,
    pub rol: String,
    pub intentos_fallidos: i32,
    pub cuenta_bloqueada_hasta: Option<NaiveDateTime>,
}

/// Résultat d'une tentative de login. `just_locked` distingue la tentative
/// qui vient de déclencher le blocage (3e échec) d'une tentative rejetée
/// sur un compte déjà bloqué : l'API sert un message différent dans chaque
/// cas.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success { subject: String, role: String },
    InvalidCredentials,
    AccountLocked { retry_after: Duration, just_locked: bool },
}

/// Accès au compte. Chaque écriture doit être atomique côté implémentation
/// (transaction + verrou de ligne) pour éviter les updates perdus quand
/// plusieurs tentatives arrivent en parallèle sur le même compte.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(&self, correo: &str) -> Result<Option<AccountRecord>, String>;

    /// Remet le compteur à 0 et lève le blocage (succès ou blocage expiré).
    async fn clear_lock(&self, usuario_id: i32) -> Result<(), String>;

    /// Incrémente le compteur d'échecs et renvoie la nouvelle valeur.
    async fn record_failure(&self, usuario_id: i32) -> Result<i32, String>;

    /// Pose le blocage temporaire jusqu'à `hasta`.
    async fn lock_account(&self, usuario_id: i32, hasta: NaiveDateTime) -> Result<(), String>;
}

/// Comparaison mot de passe / hash salé. La machine ne fait que brancher
/// sur le booléen.
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}

/// Notification de blocage, best-effort : l'implémentation réelle spawn une
/// tâche et ne bloque jamais la réponse HTTP. Aucune garantie de livraison.
pub trait LockNotifier: Send + Sync {
    fn notify_lock(&self, correo: &str, nombre: &str);
}

pub struct LoginService<R, V, N> {
    repo: R,
    verifier: V,
    notifier: N,
}

impl<R, V, N> LoginService<R, V, N>
where
    R: AccountRepository,
    V: PasswordVerifier,
    N: LockNotifier,
{
    pub fn new(repo: R, verifier: V, notifier: N) -> Self {
        Self { repo, verifier, notifier }
    }

    pub async fn attempt_login(&self, correo: &str, password: &str) -> Result<LoginOutcome, String> {
        let now = Utc::now().naive_utc();

        // 1. Lookup : un email inconnu est indistinguable d'un mauvais mot
        //    de passe pour l'appelant
        let cuenta = match self.repo.find_by_email(correo).await? {
            Some(cuenta) => cuenta,
            None => return Ok(LoginOutcome::InvalidCredentials),
        };

        // 2. Blocage vérifié AVANT les credentials
        if let Some(hasta) = cuenta.cuenta_bloqueada_hasta {
            if hasta > now {
                // Tentative rejetée sans toucher au compteur
                return Ok(LoginOutcome::AccountLocked {
                    retry_after: hasta - now,
                    just_locked: false,
                });
            }
            // Blocage expiré : déverrouillage automatique, la tentative
            // continue comme sur un compte actif
            self.repo.clear_lock(cuenta.usuario_id).await?;
        }

        // 3. Vérification du mot de passe
        if !self.verifier.verify(password, &cuenta.contrasena_hash) {
            let intentos = self.repo.record_failure(cuenta.usuario_id).await?;

            if intentos >= MAX_INTENTOS_FALLIDOS {
                let bloqueo = Duration::minutes(MINUTOS_BLOQUEO);
                self.repo.lock_account(cuenta.usuario_id, now + bloqueo).await?;
                self.notifier.notify_lock(&cuenta.correo, &cuenta.nombre);
                return Ok(LoginOutcome::AccountLocked {
                    retry_after: bloqueo,
                    just_locked: true,
                });
            }

            return Ok(LoginOutcome::InvalidCredentials);
        }

        // 4. Succès : remise à zéro des compteurs de sécurité
        self.repo.clear_lock(cuenta.usuario_id).await?;

        Ok(LoginOutcome::Success {
            subject: cuenta.correo,
            role: cuenta.rol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // Repo en mémoire : un HashMap protégé par Mutex suffit pour les tests
    #[derive(Clone, Default)]
    struct MemoryRepo {
        cuentas: Arc<Mutex<HashMap<i32, AccountRecord>>>,
    }

    impl MemoryRepo {
        fn with_account(cuenta: AccountRecord) -> Self {
            let repo = Self::default();
            repo.cuentas.lock().unwrap().insert(cuenta.usuario_id, cuenta);
            repo
        }

        fn get(&self, usuario_id: i32) -> AccountRecord {
            self.cuentas.lock().unwrap().get(&usuario_id).unwrap().clone()
        }
    }

    #[async_trait]
    impl AccountRepository for MemoryRepo {
        async fn find_by_email(&self, correo: &str) -> Result<Option<AccountRecord>, String> {
            Ok(self
                .cuentas
                .lock()
                .unwrap()
                .values()
                .find(|c| c.correo == correo)
                .cloned())
        }

        async fn clear_lock(&self, usuario_id: i32) -> Result<(), String> {
            let mut cuentas = self.cuentas.lock().unwrap();
            let cuenta = cuentas.get_mut(&usuario_id).ok_or("not found")?;
            cuenta.intentos_fallidos = 0;
            cuenta.cuenta_bloqueada_hasta = None;
            Ok(())
        }

        async fn record_failure(&self, usuario_id: i32) -> Result<i32, String> {
            let mut cuentas = self.cuentas.lock().unwrap();
            let cuenta = cuentas.get_mut(&usuario_id).ok_or("not found")?;
            cuenta.intentos_fallidos += 1;
            Ok(cuenta.intentos_fallidos)
        }

        async fn lock_account(&self, usuario_id: i32, hasta: NaiveDateTime) -> Result<(), String> {
            let mut cuentas = self.cuentas.lock().unwrap();
            let cuenta = cuentas.get_mut(&usuario_id).ok_or("not found")?;
            cuenta.cuenta_bloqueada_hasta = Some(hasta);
            Ok(())
        }
    }

    // Le "hash" stocké est le mot de passe en clair, et on compte les appels
    // pour vérifier que les credentials ne sont pas consultés sous blocage
    #[derive(Clone, Default)]
    struct PlainVerifier {
        calls: Arc<AtomicUsize>,
    }

    impl PasswordVerifier for PlainVerifier {
        fn verify(&self, password: &str, stored_hash: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            password == stored_hash
        }
    }

    #[derive(Clone, Default)]
    struct CountingNotifier {
        calls: Arc<AtomicUsize>,
    }

    impl LockNotifier for CountingNotifier {
        fn notify_lock(&self, _correo: &str, _nombre: &str) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn cuenta_activa() -> AccountRecord {
        AccountRecord {
            usuario_id: 1,
            nombre: "Laura".to_string(),
            correo: "laura@example.com".to_string(),
            contrasena_hash: "@Apolo1234".to_string(),
            rol: "usuario".to_string(),
            intentos_fallidos: 0,
            cuenta_bloqueada_hasta: None,
        }
    }

    fn servicio(
        repo: MemoryRepo,
    ) -> (
        LoginService<MemoryRepo, PlainVerifier, CountingNotifier>,
        PlainVerifier,
        CountingNotifier,
    ) {
        let verifier = PlainVerifier::default();
        let notifier = CountingNotifier::default();
        (
            LoginService::new(repo, verifier.clone(), notifier.clone()),
            verifier,
            notifier,
        )
    }

    #[tokio::test]
    async fn test_third_failure_locks_for_fifteen_minutes() {
        let repo = MemoryRepo::with_account(cuenta_activa());
        let (service, _, notifier) = servicio(repo.clone());

        for _ in 0..2 {
            let outcome = service.attempt_login("laura@example.com", "mala").await.unwrap();
            assert_eq!(outcome, LoginOutcome::InvalidCredentials);
        }

        // Le 3e échec est signalé comme la transition vers Locked
        let outcome = service.attempt_login("laura@example.com", "mala").await.unwrap();
        assert_eq!(
            outcome,
            LoginOutcome::AccountLocked {
                retry_after: Duration::minutes(MINUTOS_BLOQUEO),
                just_locked: true,
            }
        );

        let cuenta = repo.get(1);
        assert_eq!(cuenta.intentos_fallidos, 3);
        let hasta = cuenta.cuenta_bloqueada_hasta.expect("account should be locked");
        let restante = hasta - Utc::now().naive_utc();
        assert!(restante <= Duration::minutes(15));
        assert!(restante > Duration::minutes(14));

        // Une seule notification, sur la transition vers Locked
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_locked_attempt_rejected_without_checking_credentials() {
        let mut cuenta = cuenta_activa();
        cuenta.intentos_fallidos = 3;
        cuenta.cuenta_bloqueada_hasta = Some(Utc::now().naive_utc() + Duration::minutes(10));
        let repo = MemoryRepo::with_account(cuenta);
        let (service, verifier, notifier) = servicio(repo.clone());

        // Même avec le BON mot de passe : rejet direct, signalé comme un
        // compte déjà bloqué (pas une nouvelle transition)
        let outcome = service.attempt_login("laura@example.com", "@Apolo1234").await.unwrap();
        assert!(matches!(
            outcome,
            LoginOutcome::AccountLocked { just_locked: false, .. }
        ));

        // Credentials jamais consultés, compteur intact, pas de nouvel email
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(repo.get(1).intentos_fallidos, 3);
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_lock_auto_unlocks_before_credential_check() {
        let mut cuenta = cuenta_activa();
        cuenta.intentos_fallidos = 3;
        cuenta.cuenta_bloqueada_hasta = Some(Utc::now().naive_utc() - Duration::minutes(1));
        let repo = MemoryRepo::with_account(cuenta);
        let (service, _, _) = servicio(repo.clone());

        let outcome = service.attempt_login("laura@example.com", "@Apolo1234").await.unwrap();
        assert_eq!(
            outcome,
            LoginOutcome::Success {
                subject: "laura@example.com".to_string(),
                role: "usuario".to_string(),
            }
        );

        let cuenta = repo.get(1);
        assert_eq!(cuenta.intentos_fallidos, 0);
        assert_eq!(cuenta.cuenta_bloqueada_hasta, None);
    }

    #[tokio::test]
    async fn test_expired_lock_then_failure_counts_from_zero() {
        let mut cuenta = cuenta_activa();
        cuenta.intentos_fallidos = 3;
        cuenta.cuenta_bloqueada_hasta = Some(Utc::now().naive_utc() - Duration::minutes(1));
        let repo = MemoryRepo::with_account(cuenta);
        let (service, _, notifier) = servicio(repo.clone());

        // Tentative fraîche sur compte déverrouillé : 1er échec, pas de blocage
        let outcome = service.attempt_login("laura@example.com", "mala").await.unwrap();
        assert_eq!(outcome, LoginOutcome::InvalidCredentials);
        assert_eq!(repo.get(1).intentos_fallidos, 1);
        assert_eq!(repo.get(1).cuenta_bloqueada_hasta, None);
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_resets_counter_and_clears_lock() {
        let mut cuenta = cuenta_activa();
        cuenta.intentos_fallidos = 2;
        let repo = MemoryRepo::with_account(cuenta);
        let (service, _, _) = servicio(repo.clone());

        let outcome = service.attempt_login("laura@example.com", "@Apolo1234").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Success { .. }));
        assert_eq!(repo.get(1).intentos_fallidos, 0);
        assert_eq!(repo.get(1).cuenta_bloqueada_hasta, None);
    }

    #[tokio::test]
    async fn test_unknown_email_reported_as_invalid_credentials() {
        let repo = MemoryRepo::default();
        let (service, verifier, _) = servicio(repo);

        let outcome = service.attempt_login("nadie@example.com", "loquesea").await.unwrap();
        assert_eq!(outcome, LoginOutcome::InvalidCredentials);
        // Pas de hash à comparer, le verifier n'est pas appelé
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_below_threshold_do_not_lock() {
        let repo = MemoryRepo::with_account(cuenta_activa());
        let (service, _, notifier) = servicio(repo.clone());

        for esperado in 1..MAX_INTENTOS_FALLIDOS {
            let outcome = service.attempt_login("laura@example.com", "mala").await.unwrap();
            assert_eq!(outcome, LoginOutcome::InvalidCredentials);
            assert_eq!(repo.get(1).intentos_fallidos, esperado);
            assert_eq!(repo.get(1).cuenta_bloqueada_hasta, None);
        }
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }
}

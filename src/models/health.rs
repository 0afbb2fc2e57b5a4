use chrono::{DateTime, Utc};
use serde::Serialize;

/// Réponse de GET /health : état du service et heure serveur (UTC).
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub servicio: String,
    pub hora_servidor: DateTime<Utc>,
}

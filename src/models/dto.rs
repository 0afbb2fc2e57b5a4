// Structures de requête/réponse de l'API (le schéma JSON reste celui du
// backend Python que ce service remplace : champs en espagnol)
use serde::{Deserialize, Serialize};
use validator::Validate;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub mensaje: String,
    pub usuario: String,
    pub rol: String,
    pub access_token: String,
    pub tipo_token: String,
}

// ---------------------------------------------------------------------------
// Inscription
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Récupération de mot de passe
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Consultation de prix
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LatestPriceQuery {
    pub product_name: String,
    pub market_name: String,
}

#[derive(Debug, Serialize)]
pub struct ProductOption {
    pub id: i32,
    pub nombre: String,
}

#[derive(Debug, Serialize)]
pub struct PlazaOption {
    pub id: i32,
    pub nombre: String,
    pub ciudad: String,
}

// ---------------------------------------------------------------------------
// Historique de prix
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub months: Option<i64>,
}

// ---------------------------------------------------------------------------
// Comparaison entre plazas
// ---------------------------------------------------------------------------

/// plaza_names accepte une liste séparée par des virgules
/// (ex: ?plaza_names=Plaza Mayorista,Plaza Minorista)
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub product_name: String,
    pub plaza_names: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlazaComparison {
    pub plaza: String,
    pub ciudad: String,
    pub precio_promedio: f64,
    pub precio_minimo: f64,
    pub precio_maximo: f64,
    pub ultimo_precio: f64,
    pub ultima_fecha: String,
    pub total_registros: usize,
}

#[derive(Debug, Serialize)]
pub struct GlobalPriceStats {
    pub precio_promedio_global: f64,
    pub precio_minimo_global: f64,
    pub precio_maximo_global: f64,
    pub diferencia_max_min: f64,
}

// ---------------------------------------------------------------------------
// Plazas (administration)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlazaCreate {
    pub nombre: String,
    pub direccion: String,
    pub ciudad: String,
    pub coordenadas: String, // format attendu : "(lat, lng)"
    pub horarios: Option<String>,
    pub numero_comerciantes: Option<i32>,
    pub tipos_productos: Option<String>,
    pub datos_contacto: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct EstadoQuery {
    pub estado: String, // "activa" ou "inactiva"
}

#[derive(Debug, Serialize)]
pub struct PlazaDetalle {
    pub plaza_id: i32,
    pub nombre: String,
    pub direccion: Option<String>,
    pub ciudad: String,
    pub horarios: Option<String>,
    pub numero_comerciantes: Option<i32>,
    pub tipos_productos: Vec<String>,
    pub datos_contacto: Option<String>,
    pub estado: Option<String>,
}

// ---------------------------------------------------------------------------
// Prédictions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    pub product_name: String,
    pub months_ahead: Option<usize>,
}

/// Une ligne de prévision, les prix formatés en devise ("$1,234.56").
/// Les noms de champs reprennent les colonnes du rapport historique.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictedPrice {
    #[serde(rename = "Fecha")]
    pub fecha: String,
    #[serde(rename = "Predicted Price (per Kg)")]
    pub precio_predicho: String,
    #[serde(rename = "Estimated Min")]
    pub minimo_estimado: String,
    #[serde(rename = "Estimated Max")]
    pub maximo_estimado: String,
    #[serde(rename = "Confidence Level (%)")]
    pub nivel_confianza: f64,
}

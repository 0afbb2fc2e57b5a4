// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - users : Utilisateurs (table usuarios, auth + verrouillage de compte)
//   - email_link : Liens de récupération/vérification (table enlaces_correo)
//   - product : Produits agricoles (table productos)
//   - plaza : Plazas de mercado (table plazas_mercado)
//   - price : Prix courants par produit/plaza (table precios)
//   - price_history : Historique de prix (table historial_precios)
//   - dto : Data Transfer Objects pour les réponses API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Le schéma garde les noms de colonnes en espagnol (BD legacy du
//     backend Python que ce service remplace)
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod health;
pub mod users;
pub mod email_link;
pub mod product;
pub mod plaza;
pub mod price;
pub mod price_history;
pub mod dto;

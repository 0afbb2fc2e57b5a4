// ============================================================================
// MODÈLE : USERS
// ============================================================================
//
// Description:
//   Modèle de la table usuarios (schéma legacy en espagnol).
//
// Colonnes de la table usuarios:
//   - usuario_id (INTEGER, PRIMARY KEY, SERIAL)
//   - nombre (VARCHAR, NOT NULL)
//   - correo (VARCHAR, UNIQUE, NOT NULL) - index pour le lookup au login
//   - contrasena_hash (VARCHAR, NOT NULL) - hash argon2 au format PHC
//   - rol (VARCHAR, DEFAULT 'usuario') - 'usuario' ou 'admin'
//   - intentos_fallidos (INTEGER, DEFAULT 0) - compteur d'échecs consécutifs
//   - cuenta_bloqueada_hasta (TIMESTAMP, NULL) - fin du blocage temporaire
//
// Points d'attention:
//   - intentos_fallidos et cuenta_bloqueada_hasta ne sont modifiés que par
//     le flux de login (machine à états de verrouillage)
//   - cuenta_bloqueada_hasta = NULL signifie compte actif
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub usuario_id: i32,

    pub nombre: String,

    #[sea_orm(unique)]
    pub correo: String,

    #[serde(skip_serializing)] // Ne jamais exposer le hash en JSON
    pub contrasena_hash: String,

    pub rol: String,

    pub intentos_fallidos: i32,

    pub cuenta_bloqueada_hasta: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::email_link::Entity")]
    EmailLink,
}

impl Related<super::email_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmailLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

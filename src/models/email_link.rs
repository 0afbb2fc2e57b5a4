// ============================================================================
// MODÈLE : EMAIL LINKS
// ============================================================================
//
// Description:
//   Modèle de la table enlaces_correo : tokens à usage unique et durée
//   limitée pour la récupération de mot de passe (et vérification d'email).
//
// Colonnes de la table enlaces_correo:
//   - enlace_id (INTEGER, PRIMARY KEY, SERIAL)
//   - usuario_id (INTEGER, NOT NULL, FK vers usuarios)
//   - enlace_url (VARCHAR(500), UNIQUE, NOT NULL) - UUID v4
//   - tipo (VARCHAR(30), NOT NULL) - ex: 'recuperacion_password'
//   - expira_en (TIMESTAMP, NOT NULL) - création + 1 heure
//   - usado (BOOLEAN, DEFAULT FALSE)
//   - fecha_creacion (TIMESTAMP, DEFAULT CURRENT_TIMESTAMP)
//
// Workflow:
//   1. User demande la récupération via POST /password/recover/{correo}
//   2. Backend génère un token UUID v4 et l'insère dans cette table
//   3. Backend envoie un email avec le lien contenant le token
//   4. User clique, le frontend appelle POST /password/reset/{token}
//   5. Backend vérifie: token existe, non expiré, non utilisé
//   6. Backend change le mot de passe et met usado = true
//
// Points d'attention:
//   - Un token ne peut être utilisé qu'une seule fois (usado = true)
//   - Token expire après 1 heure
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enlaces_correo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub enlace_id: i32,

    pub usuario_id: i32,

    #[sea_orm(unique)]
    pub enlace_url: String,

    pub tipo: String,

    pub expira_en: DateTime,

    pub usado: bool,

    pub fecha_creacion: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UsuarioId",
        to = "super::users::Column::UsuarioId"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Table plazas_mercado : plazas physiques où les prix sont relevés.
/// Le champ estado ('activa' / 'inactiva') filtre toutes les consultations
/// de prix; une plaza inactive ne renvoie aucune donnée.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plazas_mercado")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub plaza_id: i32,

    pub nombre: String,

    pub ciudad: String,

    pub direccion: Option<String>,

    pub coordenadas: Option<String>, // format "(lat, lng)"

    pub horarios: Option<String>,

    pub numero_comerciantes: Option<i32>,

    pub tipos_productos: Option<String>, // CSV, transformé en liste dans les réponses

    pub datos_contacto: Option<String>,

    pub estado: Option<String>,

    pub fecha_actualizacion: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::price::Entity")]
    Price,
}

impl Related<super::price::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Price.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Table historial_precios : série temporelle des prix relevés pour chaque
/// enregistrement de precios. C'est la source de l'analyse de tendances.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "historial_precios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub historial_id: i32,

    pub precio_id: i32,

    pub precio_historico: Decimal,

    pub fecha_precio: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::price::Entity",
        from = "Column::PrecioId",
        to = "super::price::Column::PrecioId"
    )]
    Price,
}

impl Related<super::price::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Price.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

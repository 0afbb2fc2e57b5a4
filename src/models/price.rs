use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Table precios : prix au kilogramme (COP) d'un produit dans une plaza
/// à une date donnée. DECIMAL(10,2) côté PostgreSQL.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "precios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub precio_id: i32,

    pub producto_id: i32,

    pub plaza_id: i32,

    pub precio_por_kg: Decimal,

    pub fecha: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductoId",
        to = "super::product::Column::ProductoId"
    )]
    Product,

    #[sea_orm(
        belongs_to = "super::plaza::Entity",
        from = "Column::PlazaId",
        to = "super::plaza::Column::PlazaId"
    )]
    Plaza,

    #[sea_orm(has_many = "super::price_history::Entity")]
    PriceHistory,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::plaza::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plaza.def()
    }
}

impl Related<super::price_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

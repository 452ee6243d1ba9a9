//! `SeaORM` Entity for fuels table.

use super::sea_orm_active_enums::FuelType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fuels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub refueling_id: Uuid,
    pub fuel_type: FuelType,
    #[sea_orm(column_type = "Decimal(Some((15, 3)))")]
    pub liters: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 3)))")]
    pub value_per_liter: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub cost: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::refuelings::Entity",
        from = "Column::RefuelingId",
        to = "super::refuelings::Column::Id"
    )]
    Refuelings,
}

impl Related<super::refuelings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Refuelings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

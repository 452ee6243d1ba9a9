//! `SeaORM` Entity for refuelings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "refuelings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub accounted: bool,
    pub accounted_by: Option<String>,
    pub first_refueling: bool,
    pub full_tank: bool,
    pub odometer: i64,
    pub distance: i64,
    #[sea_orm(column_type = "Decimal(Some((15, 3)))", nullable)]
    pub average_consumption: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((15, 3)))")]
    pub liters: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub cost_per_liter: Decimal,
    pub place: Option<String>,
    pub event_date: Date,
    pub period_movement_id: Option<Uuid>,
    pub vehicle_id: Uuid,
    pub movement_class_id: Uuid,
    pub financial_period_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fuels::Entity")]
    Fuels,
    #[sea_orm(
        belongs_to = "super::vehicles::Entity",
        from = "Column::VehicleId",
        to = "super::vehicles::Column::Id"
    )]
    Vehicles,
}

impl Related<super::fuels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fuels.def()
    }
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

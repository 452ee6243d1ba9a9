//! `SeaORM` Entity for movements table.
//!
//! Period and fixed movements share the table; `kind` tells them apart
//! and the columns of the other kind stay null.

use super::sea_orm_active_enums::{FixedMovementState, MovementKind, MovementState};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub kind: MovementKind,
    pub identification: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub value: Decimal,
    pub contact: Option<String>,
    // period movements
    pub due_date: Option<Date>,
    pub financial_period_id: Option<Uuid>,
    pub state: Option<MovementState>,
    // fixed movements
    pub start_date: Option<Date>,
    pub total_quotes: Option<i32>,
    pub starting_quote: Option<i32>,
    pub fixed_state: Option<FixedMovementState>,
    pub auto_launch: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::financial_periods::Entity",
        from = "Column::FinancialPeriodId",
        to = "super::financial_periods::Column::Id"
    )]
    FinancialPeriods,
    #[sea_orm(has_many = "super::apportionments::Entity")]
    Apportionments,
    #[sea_orm(has_one = "super::payments::Entity")]
    Payments,
}

impl Related<super::financial_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialPeriods.def()
    }
}

impl Related<super::apportionments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Apportionments.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

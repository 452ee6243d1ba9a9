//! `SeaORM` Entity for closings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "closings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub financial_period_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub revenues: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub expenses: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub credit_card_expenses: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub debit_card_expenses: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub cash_expenses: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub accumulated: Decimal,
    pub closing_date: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::financial_periods::Entity",
        from = "Column::FinancialPeriodId",
        to = "super::financial_periods::Column::Id"
    )]
    FinancialPeriods,
}

impl Related<super::financial_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialPeriods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

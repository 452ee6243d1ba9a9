//! `SeaORM` Entity for wallet_balances table.

use super::sea_orm_active_enums::{BalanceType, ReasonType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub wallet_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub actual_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub old_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub transaction_value: Decimal,
    pub movement_code: Option<String>,
    pub observations: Option<String>,
    pub movement_date_time: DateTime,
    pub balance_type: BalanceType,
    pub reason_type: ReasonType,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id"
    )]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

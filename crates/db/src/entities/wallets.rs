//! `SeaORM` Entity for wallets table.

use super::sea_orm_active_enums::WalletType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub wallet_type: WalletType,
    pub bank: Option<String>,
    pub agency: Option<String>,
    pub account: Option<String>,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub actual_balance: Decimal,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::wallet_balances::Entity")]
    WalletBalances,
}

impl Related<super::wallet_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

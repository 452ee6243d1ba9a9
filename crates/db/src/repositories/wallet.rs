//! Wallet repository for database operations.
//!
//! Every change of a wallet balance goes through [`WalletBalance`] and is
//! stored in the same transaction as the new wallet balance.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;
use webbudget_core::financial::WalletBalance;
use webbudget_core::registration::Wallet;
use webbudget_shared::types::{PageRequest, PageResponse};

use super::error::{RepositoryError, RepositoryResult};
use super::mapping;
use crate::entities::{cards, payments, wallet_balances, wallets};

/// Wallet repository.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists wallets by name, optionally only the active ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, only_active: bool) -> RepositoryResult<Vec<Wallet>> {
        let mut query = wallets::Entity::find().order_by_asc(wallets::Column::Name);
        if only_active {
            query = query.filter(wallets::Column::Active.eq(true));
        }
        Ok(query
            .all(&self.db)
            .await?
            .into_iter()
            .map(mapping::wallet)
            .collect())
    }

    /// Finds a wallet by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> RepositoryResult<Option<Wallet>> {
        Ok(wallets::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(mapping::wallet))
    }

    /// Inserts or updates a wallet.
    ///
    /// The balance of an existing wallet is never overwritten; use
    /// [`Self::adjust_balance`] to change it. New wallets start with the
    /// given balance recorded as an adjustment.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a database error.
    pub async fn save(&self, wallet: &Wallet) -> RepositoryResult<Wallet> {
        wallet.validate()?;
        let now = chrono::Utc::now();

        let existing = wallets::Entity::find_by_id(wallet.id).one(&self.db).await?;
        let model = if let Some(existing) = existing {
            let mut active: wallets::ActiveModel = existing.into();
            active.name = Set(wallet.name.clone());
            active.wallet_type = Set(wallet.wallet_type.into());
            active.bank = Set(wallet.bank.clone());
            active.agency = Set(wallet.agency.clone());
            active.account = Set(wallet.account.clone());
            active.description = Set(wallet.description.clone());
            active.active = Set(wallet.active);
            active.updated_at = Set(now.into());
            active.update(&self.db).await?
        } else {
            let txn = self.db.begin().await?;
            let mut fresh = wallet.clone();
            fresh.actual_balance = Decimal::ZERO;
            let model = wallets::ActiveModel {
                id: Set(fresh.id),
                name: Set(fresh.name.clone()),
                wallet_type: Set(fresh.wallet_type.into()),
                bank: Set(fresh.bank.clone()),
                agency: Set(fresh.agency.clone()),
                account: Set(fresh.account.clone()),
                description: Set(fresh.description.clone()),
                actual_balance: Set(Decimal::ZERO),
                active: Set(fresh.active),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(&txn)
            .await?;

            let model = if wallet.actual_balance.is_zero() {
                model
            } else {
                let balance =
                    WalletBalance::adjustment(&mut fresh, wallet.actual_balance, now.naive_utc())?;
                insert_balance(&txn, &balance).await?;
                update_balance(&txn, model, fresh.actual_balance).await?
            };
            txn.commit().await?;
            model
        };

        info!(wallet_id = %model.id, name = %model.name, "Wallet saved");
        Ok(mapping::wallet(model))
    }

    /// Deletes a wallet without history.
    ///
    /// # Errors
    ///
    /// Returns `InUse` when balances, cards or payments refer to it,
    /// `NotFound`, or a database error.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let balances = wallet_balances::Entity::find()
            .filter(wallet_balances::Column::WalletId.eq(id))
            .count(&self.db)
            .await?;
        let cards = cards::Entity::find()
            .filter(cards::Column::WalletId.eq(id))
            .count(&self.db)
            .await?;
        let payments = payments::Entity::find()
            .filter(payments::Column::WalletId.eq(id))
            .count(&self.db)
            .await?;
        if balances + cards + payments > 0 {
            return Err(RepositoryError::InUse(
                "Wallet has balance history, cards or payments".to_string(),
            ));
        }

        let result = wallets::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Wallet", id));
        }
        info!(wallet_id = %id, "Wallet deleted");
        Ok(())
    }

    /// Sets the balance of a wallet, recording the difference as an adjustment.
    ///
    /// # Errors
    ///
    /// Returns `AmountOutOfRange` for targets a money column cannot hold,
    /// `NotFound`, or a database error.
    pub async fn adjust_balance(
        &self,
        id: Uuid,
        target: Decimal,
        observations: Option<String>,
    ) -> RepositoryResult<WalletBalance> {
        let txn = self.db.begin().await?;
        let model = lock_wallet(&txn, id).await?;
        let mut wallet = mapping::wallet(model.clone());

        let mut balance =
            WalletBalance::adjustment(&mut wallet, target, chrono::Utc::now().naive_utc())?;
        balance.observations = observations;
        insert_balance(&txn, &balance).await?;
        update_balance(&txn, model, wallet.actual_balance).await?;
        txn.commit().await?;

        info!(
            wallet_id = %id,
            old_balance = %balance.old_balance,
            actual_balance = %balance.actual_balance,
            "Wallet balance adjusted"
        );
        Ok(balance)
    }

    /// Moves `value` from one wallet to another.
    ///
    /// Both rows are locked in ascending ID order, so opposite transfers
    /// between the same wallets wait for each other instead of deadlocking.
    ///
    /// # Errors
    ///
    /// Returns a financial error for invalid transfers, `NotFound`, or a
    /// database error.
    pub async fn transfer(
        &self,
        source_id: Uuid,
        target_id: Uuid,
        value: Decimal,
        observations: Option<String>,
    ) -> RepositoryResult<(WalletBalance, WalletBalance)> {
        let txn = self.db.begin().await?;
        let (first, second) = if source_id <= target_id {
            (source_id, target_id)
        } else {
            (target_id, source_id)
        };
        let first_model = lock_wallet(&txn, first).await?;
        let second_model = lock_wallet(&txn, second).await?;
        let (source_model, target_model) = if first == source_id {
            (first_model, second_model)
        } else {
            (second_model, first_model)
        };
        let mut source = mapping::wallet(source_model.clone());
        let mut target = mapping::wallet(target_model.clone());

        let (mut debit, mut credit) = WalletBalance::transference(
            &mut source,
            &mut target,
            value,
            chrono::Utc::now().naive_utc(),
        )?;
        debit.observations.clone_from(&observations);
        credit.observations = observations;

        insert_balance(&txn, &debit).await?;
        insert_balance(&txn, &credit).await?;
        update_balance(&txn, source_model, source.actual_balance).await?;
        update_balance(&txn, target_model, target.actual_balance).await?;
        txn.commit().await?;

        info!(
            source_wallet_id = %source_id,
            target_wallet_id = %target_id,
            value = %value,
            "Wallet transference completed"
        );
        Ok((debit, credit))
    }

    /// Lists one page of the balance history of a wallet, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_balances(
        &self,
        id: Uuid,
        page: &PageRequest,
    ) -> RepositoryResult<PageResponse<WalletBalance>> {
        let page = page.normalized();
        let paginator = wallet_balances::Entity::find()
            .filter(wallet_balances::Column::WalletId.eq(id))
            .order_by_desc(wallet_balances::Column::MovementDateTime)
            .order_by_desc(wallet_balances::Column::CreatedAt)
            .paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let data = paginator
            .fetch_page(page.page_index())
            .await?
            .into_iter()
            .map(mapping::wallet_balance)
            .collect();
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }
}

/// Loads a wallet for update inside a transaction.
pub(crate) async fn lock_wallet<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> RepositoryResult<wallets::Model> {
    wallets::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(RepositoryError::not_found("Wallet", id))
}

/// Processes an unprocessed balance against its wallet and stores both.
pub(crate) async fn apply_balance<C: ConnectionTrait>(
    conn: &C,
    mut balance: WalletBalance,
) -> RepositoryResult<WalletBalance> {
    let model = lock_wallet(conn, balance.wallet_id).await?;
    let mut wallet = mapping::wallet(model.clone());
    balance.process_balances(&mut wallet)?;
    insert_balance(conn, &balance).await?;
    update_balance(conn, model, wallet.actual_balance).await?;
    info!(
        wallet_id = %wallet.id,
        transaction_value = %balance.transaction_value,
        actual_balance = %balance.actual_balance,
        "Wallet balance updated"
    );
    Ok(balance)
}

async fn insert_balance<C: ConnectionTrait>(
    conn: &C,
    balance: &WalletBalance,
) -> RepositoryResult<()> {
    wallet_balances::ActiveModel {
        id: Set(Uuid::now_v7()),
        wallet_id: Set(balance.wallet_id),
        actual_balance: Set(balance.actual_balance),
        old_balance: Set(balance.old_balance),
        transaction_value: Set(balance.transaction_value),
        movement_code: Set(balance.movement_code.clone()),
        observations: Set(balance.observations.clone()),
        movement_date_time: Set(balance.movement_date_time),
        balance_type: Set(balance.balance_type.into()),
        reason_type: Set(balance.reason_type.into()),
        created_at: Set(chrono::Utc::now().into()),
    }
    .insert(conn)
    .await?;
    Ok(())
}

async fn update_balance<C: ConnectionTrait>(
    conn: &C,
    model: wallets::Model,
    actual_balance: Decimal,
) -> RepositoryResult<wallets::Model> {
    let mut active: wallets::ActiveModel = model.into();
    active.actual_balance = Set(actual_balance);
    active.updated_at = Set(chrono::Utc::now().into());
    Ok(active.update(conn).await?)
}

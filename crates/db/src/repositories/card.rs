//! Card repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;
use webbudget_core::financial::CardRef;
use webbudget_core::registration::{Card, CardType};

use super::error::{RepositoryError, RepositoryResult};
use super::mapping;
use crate::entities::{cards, payments, sea_orm_active_enums, wallets};

/// Card repository.
#[derive(Debug, Clone)]
pub struct CardRepository {
    db: DatabaseConnection,
}

impl CardRepository {
    /// Creates a new card repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists cards by name, optionally of one type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, card_type: Option<CardType>) -> RepositoryResult<Vec<Card>> {
        let mut query = cards::Entity::find().order_by_asc(cards::Column::Name);
        if let Some(card_type) = card_type {
            query = query
                .filter(cards::Column::CardType.eq(sea_orm_active_enums::CardType::from(card_type)));
        }
        Ok(query
            .all(&self.db)
            .await?
            .into_iter()
            .map(mapping::card)
            .collect())
    }

    /// Finds a card by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> RepositoryResult<Option<Card>> {
        Ok(cards::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(mapping::card))
    }

    /// Finds the payment reference of a card.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn find_ref(&self, id: Uuid) -> RepositoryResult<CardRef> {
        let card = self
            .find(id)
            .await?
            .ok_or(RepositoryError::not_found("Card", id))?;
        Ok(CardRef {
            id: card.id,
            card_type: card.card_type,
            wallet_id: card.wallet_id,
        })
    }

    /// Inserts or updates a card.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `NotFound` for a missing wallet, or a
    /// database error.
    pub async fn save(&self, card: &Card) -> RepositoryResult<Card> {
        card.validate()?;
        if let Some(wallet_id) = card.wallet_id
            && wallets::Entity::find_by_id(wallet_id)
                .one(&self.db)
                .await?
                .is_none()
        {
            return Err(RepositoryError::not_found("Wallet", wallet_id));
        }

        let now = chrono::Utc::now().into();
        let model = match cards::Entity::find_by_id(card.id).one(&self.db).await? {
            Some(existing) => {
                let mut active: cards::ActiveModel = existing.into();
                active.name = Set(card.name.clone());
                active.flag = Set(card.flag.clone());
                active.card_type = Set(card.card_type.into());
                active.credit_limit = Set(card.credit_limit);
                active.expiration_day = Set(card.expiration_day);
                active.active = Set(card.active);
                active.wallet_id = Set(card.wallet_id);
                active.updated_at = Set(now);
                active.update(&self.db).await?
            }
            None => {
                cards::ActiveModel {
                    id: Set(card.id),
                    name: Set(card.name.clone()),
                    flag: Set(card.flag.clone()),
                    card_type: Set(card.card_type.into()),
                    credit_limit: Set(card.credit_limit),
                    expiration_day: Set(card.expiration_day),
                    active: Set(card.active),
                    wallet_id: Set(card.wallet_id),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await?
            }
        };

        info!(card_id = %model.id, name = %model.name, "Card saved");
        Ok(mapping::card(model))
    }

    /// Deletes a card no payment used.
    ///
    /// # Errors
    ///
    /// Returns `InUse`, `NotFound`, or a database error.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let used = payments::Entity::find()
            .filter(payments::Column::CardId.eq(id))
            .count(&self.db)
            .await?;
        if used > 0 {
            return Err(RepositoryError::InUse(format!(
                "Card was used in {used} payments"
            )));
        }

        let result = cards::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Card", id));
        }
        info!(card_id = %id, "Card deleted");
        Ok(())
    }
}

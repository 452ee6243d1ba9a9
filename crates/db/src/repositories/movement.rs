//! Period movement repository for database operations.
//!
//! Period and fixed movements share the `movements` table; the helpers at
//! the bottom of this module load and store the common parts and are
//! reused by the launch, closing and refueling flows.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;
use webbudget_core::financial::{
    Apportionment, CardRef, FinancialError, Movement, MovementState, Payment, PeriodMovement,
};
use webbudget_shared::types::{PageRequest, PageResponse};

use super::error::{RepositoryError, RepositoryResult};
use super::mapping;
use super::wallet::apply_balance;
use crate::entities::sea_orm_active_enums::{self, MovementKind};
use crate::entities::{
    apportionments, cards, cost_centers, financial_periods, movement_classes, movements, payments,
};

/// Period movement repository.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    db: DatabaseConnection,
}

impl MovementRepository {
    /// Creates a new movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists one page of period movements by due date, optionally of one
    /// period or state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        financial_period_id: Option<Uuid>,
        state: Option<MovementState>,
        page: &PageRequest,
    ) -> RepositoryResult<PageResponse<PeriodMovement>> {
        let page = page.normalized();
        let mut query = movements::Entity::find()
            .filter(movements::Column::Kind.eq(MovementKind::Period))
            .order_by_asc(movements::Column::DueDate)
            .order_by_asc(movements::Column::Identification);
        if let Some(period_id) = financial_period_id {
            query = query.filter(movements::Column::FinancialPeriodId.eq(period_id));
        }
        if let Some(state) = state {
            query = query
                .filter(movements::Column::State.eq(sea_orm_active_enums::MovementState::from(state)));
        }

        let paginator = query.paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page_index()).await?;
        let data = load_period_movements(&self.db, models).await?;
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Finds a period movement by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> RepositoryResult<Option<PeriodMovement>> {
        let model = movements::Entity::find_by_id(id)
            .filter(movements::Column::Kind.eq(MovementKind::Period))
            .one(&self.db)
            .await?;
        match model {
            Some(model) => Ok(load_period_movements(&self.db, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Creates an open period movement with its apportionments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing references, `PeriodClosed`, a
    /// validation error, or a database error.
    pub async fn create(&self, mut movement: PeriodMovement) -> RepositoryResult<PeriodMovement> {
        let txn = self.db.begin().await?;
        let id = insert_period_movement(&txn, &mut movement).await?;
        txn.commit().await?;

        info!(
            movement_id = %id,
            code = %movement.movement.code,
            value = %movement.movement.value,
            "Movement created"
        );
        self.get(id).await
    }

    /// Updates an open period movement and its apportionments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `MovementNotOpen`, `PeriodClosed`, a validation
    /// error, or a database error.
    pub async fn update(
        &self,
        id: Uuid,
        mut changes: PeriodMovement,
    ) -> RepositoryResult<PeriodMovement> {
        let txn = self.db.begin().await?;
        let existing = lock_period_movement(&txn, id).await?;
        existing.ensure_editable()?;
        ensure_period_open(&txn, changes.financial_period_id).await?;

        resolve_apportionments(&txn, &mut changes.movement).await?;
        changes.movement.validate()?;

        let model = movements::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Movement", id))?;
        let mut active: movements::ActiveModel = model.into();
        active.identification = Set(changes.movement.identification.clone());
        active.description = Set(changes.movement.description.clone());
        active.value = Set(changes.movement.value);
        active.contact = Set(changes.movement.contact.clone());
        active.due_date = Set(Some(changes.due_date));
        active.financial_period_id = Set(Some(changes.financial_period_id));
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&txn).await?;

        replace_apportionments(&txn, id, &changes.movement).await?;
        txn.commit().await?;

        info!(movement_id = %id, value = %changes.movement.value, "Movement updated");
        self.get(id).await
    }

    /// Deletes an open period movement.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `MovementNotOpen`, or a database error.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        let existing = lock_period_movement(&txn, id).await?;
        existing.ensure_editable()?;
        movements::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(movement_id = %id, "Movement deleted");
        Ok(())
    }

    /// Pays an open movement, moving money out of or into the paying wallet.
    ///
    /// The card of the payment is reloaded so its type and wallet are the
    /// stored ones.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `MovementNotOpen`, a payment error, or a
    /// database error.
    pub async fn pay(&self, id: Uuid, mut payment: Payment) -> RepositoryResult<PeriodMovement> {
        let txn = self.db.begin().await?;
        let mut movement = lock_period_movement(&txn, id).await?;

        if let Some(card) = payment.card.take() {
            payment.card = Some(load_card_ref(&txn, card.id).await?);
        }

        let balance = movement.pay(payment, chrono::Utc::now().naive_utc())?;
        let Some(payment) = movement.payment.as_ref() else {
            return Err(RepositoryError::Financial(FinancialError::MovementNotOpen));
        };

        payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            movement_id: Set(id),
            paid_on: Set(payment.paid_on),
            discount: Set(payment.discount),
            paid_value: Set(payment.paid_value),
            payment_method: Set(payment.payment_method.into()),
            card_id: Set(payment.card.as_ref().map(|c| c.id)),
            wallet_id: Set(payment.wallet_id),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&txn)
        .await?;
        set_state(&txn, id, MovementState::Paid).await?;
        if let Some(balance) = balance {
            apply_balance(&txn, balance).await?;
        }
        txn.commit().await?;

        info!(
            movement_id = %id,
            paid_value = %payment.paid_value,
            method = ?payment.payment_method,
            "Movement paid"
        );
        self.get(id).await
    }

    /// Reverts the payment of a paid movement, returning the money to its wallet.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `MovementNotOpen` unless paid, or a database error.
    pub async fn revert_payment(&self, id: Uuid) -> RepositoryResult<PeriodMovement> {
        let txn = self.db.begin().await?;
        let mut movement = lock_period_movement(&txn, id).await?;

        let balance = movement.revert_payment(chrono::Utc::now().naive_utc())?;
        payments::Entity::delete_many()
            .filter(payments::Column::MovementId.eq(id))
            .exec(&txn)
            .await?;
        set_state(&txn, id, MovementState::Open).await?;
        if let Some(balance) = balance {
            apply_balance(&txn, balance).await?;
        }
        txn.commit().await?;

        info!(movement_id = %id, "Movement payment reverted");
        self.get(id).await
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<PeriodMovement> {
        self.find(id)
            .await?
            .ok_or(RepositoryError::not_found("Movement", id))
    }
}

/// Loads a period movement for update inside a transaction.
pub(crate) async fn lock_period_movement<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> RepositoryResult<PeriodMovement> {
    let model = movements::Entity::find_by_id(id)
        .filter(movements::Column::Kind.eq(MovementKind::Period))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(RepositoryError::not_found("Movement", id))?;
    load_period_movements(conn, vec![model])
        .await?
        .pop()
        .ok_or(RepositoryError::not_found("Movement", id))
}

/// Reads a period holding a share lock until the transaction ends.
///
/// The lock conflicts with the exclusive lock taken by a closing, so a period
/// cannot be closed while a movement entering it is uncommitted.
fn period_for_share(financial_period_id: Uuid) -> Select<financial_periods::Entity> {
    financial_periods::Entity::find_by_id(financial_period_id).lock_shared()
}

/// Checks that a period exists and accepts movements.
pub(crate) async fn ensure_period_open<C: ConnectionTrait>(
    conn: &C,
    financial_period_id: Uuid,
) -> RepositoryResult<()> {
    let period = period_for_share(financial_period_id)
        .one(conn)
        .await?
        .ok_or(RepositoryError::not_found(
            "Financial period",
            financial_period_id,
        ))?;
    mapping::financial_period(period).ensure_open()?;
    Ok(())
}

/// Validates and stores a new open period movement, returning its ID.
pub(crate) async fn insert_period_movement<C: ConnectionTrait>(
    conn: &C,
    movement: &mut PeriodMovement,
) -> RepositoryResult<Uuid> {
    ensure_period_open(conn, movement.financial_period_id).await?;
    resolve_apportionments(conn, &mut movement.movement).await?;
    movement.movement.validate()?;

    let id = Uuid::now_v7();
    let mut active = movement_active_model(id, &movement.movement, MovementKind::Period);
    active.due_date = Set(Some(movement.due_date));
    active.financial_period_id = Set(Some(movement.financial_period_id));
    active.state = Set(Some(MovementState::Open.into()));
    active.insert(conn).await?;
    replace_apportionments(conn, id, &movement.movement).await?;

    movement.movement.id = Some(id);
    movement.state = MovementState::Open;
    movement.payment = None;
    Ok(id)
}

/// Builds the columns shared by every movement kind.
pub(crate) fn movement_active_model(
    id: Uuid,
    movement: &Movement,
    kind: MovementKind,
) -> movements::ActiveModel {
    let now = chrono::Utc::now();
    movements::ActiveModel {
        id: Set(id),
        code: Set(movement.code.clone()),
        kind: Set(kind),
        identification: Set(movement.identification.clone()),
        description: Set(movement.description.clone()),
        value: Set(movement.value),
        contact: Set(movement.contact.clone()),
        due_date: Set(None),
        financial_period_id: Set(None),
        state: Set(None),
        start_date: Set(None),
        total_quotes: Set(None),
        starting_quote: Set(None),
        fixed_state: Set(None),
        auto_launch: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

/// Replaces the stored references of each apportionment with the current
/// cost center and movement class.
///
/// An apportionment without cost center is charged to its class's one.
pub(crate) async fn resolve_apportionments<C: ConnectionTrait>(
    conn: &C,
    movement: &mut Movement,
) -> RepositoryResult<()> {
    for apportionment in &mut movement.apportionments {
        let Some(class_id) = apportionment.movement_class.as_ref().map(|c| c.id) else {
            return Err(FinancialError::IncompleteApportionment.into());
        };
        let (class, class_cost_center) = movement_classes::Entity::find_by_id(class_id)
            .find_also_related(cost_centers::Entity)
            .one(conn)
            .await?
            .and_then(|(class, cc)| cc.map(|cc| (class, cc)))
            .ok_or(RepositoryError::not_found("Movement class", class_id))?;

        let cost_center = match apportionment.cost_center.as_ref().map(|c| c.id) {
            Some(cost_center_id) if cost_center_id != class_cost_center.id => {
                cost_centers::Entity::find_by_id(cost_center_id)
                    .one(conn)
                    .await?
                    .ok_or(RepositoryError::not_found("Cost center", cost_center_id))?
            }
            _ => class_cost_center.clone(),
        };

        apportionment.movement_class = Some(mapping::movement_class_ref(&class, &class_cost_center));
        apportionment.cost_center = Some(mapping::cost_center_ref(&cost_center));
    }
    Ok(())
}

/// Makes the stored apportionments of a movement match `movement`.
///
/// Rows no longer present are removed, saved ones updated and new ones
/// inserted. The database checks the total at commit.
pub(crate) async fn replace_apportionments<C: ConnectionTrait>(
    conn: &C,
    movement_id: Uuid,
    movement: &Movement,
) -> RepositoryResult<()> {
    let kept: Vec<Uuid> = movement
        .apportionments
        .iter()
        .filter_map(|a| a.id)
        .collect();
    apportionments::Entity::delete_many()
        .filter(apportionments::Column::MovementId.eq(movement_id))
        .filter(apportionments::Column::Id.is_not_in(kept))
        .exec(conn)
        .await?;

    for apportionment in &movement.apportionments {
        let (Some(cost_center), Some(class)) =
            (&apportionment.cost_center, &apportionment.movement_class)
        else {
            return Err(FinancialError::IncompleteApportionment.into());
        };
        let active = apportionments::ActiveModel {
            id: apportionment.id.map_or(NotSet, Set),
            code: Set(apportionment.code.clone()),
            movement_id: Set(movement_id),
            cost_center_id: Set(cost_center.id),
            movement_class_id: Set(class.id),
            value: Set(apportionment.value),
        };
        if apportionment.is_saved() {
            active.update(conn).await?;
        } else {
            let mut active = active;
            active.id = Set(Uuid::now_v7());
            active.insert(conn).await?;
        }
    }
    Ok(())
}

/// Loads the apportionments of the given movements, keyed by movement ID.
pub(crate) async fn load_apportionments<C: ConnectionTrait>(
    conn: &C,
    movement_ids: &[Uuid],
) -> RepositoryResult<HashMap<Uuid, Vec<Apportionment>>> {
    if movement_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = apportionments::Entity::find()
        .filter(apportionments::Column::MovementId.is_in(movement_ids.iter().copied()))
        .order_by_asc(apportionments::Column::Code)
        .all(conn)
        .await?;

    let class_ids: HashSet<Uuid> = rows.iter().map(|r| r.movement_class_id).collect();
    let classes: HashMap<Uuid, (movement_classes::Model, cost_centers::Model)> =
        movement_classes::Entity::find()
            .filter(movement_classes::Column::Id.is_in(class_ids))
            .find_also_related(cost_centers::Entity)
            .all(conn)
            .await?
            .into_iter()
            .filter_map(|(class, cc)| cc.map(|cc| (class.id, (class, cc))))
            .collect();
    let cost_center_ids: HashSet<Uuid> = rows.iter().map(|r| r.cost_center_id).collect();
    let centers: HashMap<Uuid, cost_centers::Model> = cost_centers::Entity::find()
        .filter(cost_centers::Column::Id.is_in(cost_center_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|cc| (cc.id, cc))
        .collect();

    let mut by_movement: HashMap<Uuid, Vec<Apportionment>> = HashMap::new();
    for row in rows {
        let apportionment = Apportionment {
            id: Some(row.id),
            code: row.code,
            value: row.value,
            cost_center: centers.get(&row.cost_center_id).map(mapping::cost_center_ref),
            movement_class: classes
                .get(&row.movement_class_id)
                .map(|(class, cc)| mapping::movement_class_ref(class, cc)),
        };
        by_movement.entry(row.movement_id).or_default().push(apportionment);
    }
    Ok(by_movement)
}

/// Builds the common movement data of a row.
pub(crate) fn base_movement(model: &movements::Model, apportionments: Vec<Apportionment>) -> Movement {
    Movement {
        id: Some(model.id),
        code: model.code.clone(),
        identification: model.identification.clone(),
        description: model.description.clone(),
        value: model.value,
        contact: model.contact.clone(),
        apportionments,
        deleted_apportionments: Vec::new(),
    }
}

pub(crate) async fn load_period_movements<C: ConnectionTrait>(
    conn: &C,
    models: Vec<movements::Model>,
) -> RepositoryResult<Vec<PeriodMovement>> {
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let mut apportioned = load_apportionments(conn, &ids).await?;
    let mut paid = load_payments(conn, &ids).await?;

    models
        .into_iter()
        .map(|model| {
            let (Some(due_date), Some(period_id), Some(state)) =
                (model.due_date, model.financial_period_id, model.state)
            else {
                return Err(RepositoryError::Database(DbErr::Custom(format!(
                    "Movement {} is missing period columns",
                    model.id
                ))));
            };
            let base = base_movement(&model, apportioned.remove(&model.id).unwrap_or_default());
            let mut period_movement = PeriodMovement::new(base, period_id, due_date);
            period_movement.state = state.into();
            period_movement.payment = paid.remove(&model.id);
            Ok(period_movement)
        })
        .collect()
}

async fn load_payments<C: ConnectionTrait>(
    conn: &C,
    movement_ids: &[Uuid],
) -> RepositoryResult<HashMap<Uuid, Payment>> {
    if movement_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = payments::Entity::find()
        .filter(payments::Column::MovementId.is_in(movement_ids.iter().copied()))
        .all(conn)
        .await?;
    let card_ids: HashSet<Uuid> = rows.iter().filter_map(|p| p.card_id).collect();
    let cards_by_id: HashMap<Uuid, cards::Model> = if card_ids.is_empty() {
        HashMap::new()
    } else {
        cards::Entity::find()
            .filter(cards::Column::Id.is_in(card_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|card| (card.id, card))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|row| {
            let card = row.card_id.and_then(|id| cards_by_id.get(&id)).map(|card| CardRef {
                id: card.id,
                card_type: card.card_type.into(),
                wallet_id: card.wallet_id,
            });
            let payment = Payment {
                paid_on: row.paid_on,
                discount: row.discount,
                paid_value: row.paid_value,
                payment_method: row.payment_method.into(),
                card,
                wallet_id: row.wallet_id,
            };
            (row.movement_id, payment)
        })
        .collect())
}

async fn load_card_ref<C: ConnectionTrait>(conn: &C, id: Uuid) -> RepositoryResult<CardRef> {
    let card = cards::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(RepositoryError::not_found("Card", id))?;
    Ok(CardRef {
        id: card.id,
        card_type: card.card_type.into(),
        wallet_id: card.wallet_id,
    })
}

async fn set_state<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    state: MovementState,
) -> RepositoryResult<()> {
    let model = movements::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(RepositoryError::not_found("Movement", id))?;
    let mut active: movements::ActiveModel = model.into();
    active.state = Set(Some(state.into()));
    active.updated_at = Set(chrono::Utc::now().into());
    active.update(conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_period_is_read_for_share() {
        let sql = period_for_share(Uuid::now_v7()).build(DbBackend::Postgres).sql;
        assert!(sql.contains("FOR SHARE"), "{sql}");
    }
}

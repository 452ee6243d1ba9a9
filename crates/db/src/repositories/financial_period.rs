//! Financial period repository: periods, closings and budget consumption.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;
use webbudget_core::budget::{ApportionedValue, BudgetConsumptionReport, BudgetService};
use webbudget_core::financial::{Closing, ClosingEntry, FinancialPeriod, MovementState};
use webbudget_core::registration::MovementClassType;

use super::error::{RepositoryError, RepositoryResult};
use super::mapping;
use super::movement::load_period_movements;
use super::movement_class::MovementClassRepository;
use crate::entities::sea_orm_active_enums::{self, MovementKind};
use crate::entities::{apportionments, closings, financial_periods, movements};

/// Financial period repository.
#[derive(Debug, Clone)]
pub struct FinancialPeriodRepository {
    db: DatabaseConnection,
}

impl FinancialPeriodRepository {
    /// Creates a new financial period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists periods, newest first, optionally only the open ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, only_open: bool) -> RepositoryResult<Vec<FinancialPeriod>> {
        let mut query =
            financial_periods::Entity::find().order_by_desc(financial_periods::Column::StartDate);
        if only_open {
            query = query.filter(financial_periods::Column::Closed.eq(false));
        }
        Ok(query
            .all(&self.db)
            .await?
            .into_iter()
            .map(mapping::financial_period)
            .collect())
    }

    /// Finds a period by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> RepositoryResult<Option<FinancialPeriod>> {
        Ok(financial_periods::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(mapping::financial_period))
    }

    /// Creates an open period that overlaps no other.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriodRange`, `OverlappingPeriod`, `Conflict` for a
    /// taken identification, or a database error.
    pub async fn create(&self, period: &FinancialPeriod) -> RepositoryResult<FinancialPeriod> {
        let existing = self.list(false).await?;
        period.validate(&existing)?;
        if existing
            .iter()
            .any(|p| p.identification == period.identification)
        {
            return Err(RepositoryError::Conflict(format!(
                "Financial period '{}' already exists",
                period.identification
            )));
        }

        let now = chrono::Utc::now().into();
        let model = financial_periods::ActiveModel {
            id: Set(period.id),
            identification: Set(period.identification.clone()),
            start_date: Set(period.start),
            end_date: Set(period.end),
            closed: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(
            financial_period_id = %model.id,
            identification = %model.identification,
            start = %model.start_date,
            end = %model.end_date,
            "Financial period created"
        );
        Ok(mapping::financial_period(model))
    }

    /// Deletes an open period without movements.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `PeriodClosed`, `InUse`, or a database error.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let period = self
            .find(id)
            .await?
            .ok_or(RepositoryError::not_found("Financial period", id))?;
        period.ensure_open()?;

        let used = movements::Entity::find()
            .filter(movements::Column::FinancialPeriodId.eq(id))
            .count(&self.db)
            .await?;
        if used > 0 {
            return Err(RepositoryError::InUse(format!(
                "Financial period has {used} movements"
            )));
        }

        financial_periods::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        info!(financial_period_id = %id, "Financial period deleted");
        Ok(())
    }

    /// Closes a period: totals its movements, accumulates the previous
    /// closing and marks the paid movements as accounted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `PeriodClosed`, `OpenMovementsInPeriod`, or a
    /// database error.
    pub async fn close(&self, id: Uuid, closing_date: NaiveDate) -> RepositoryResult<Closing> {
        let txn = self.db.begin().await?;
        let model = financial_periods::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Financial period", id))?;
        let period = mapping::financial_period(model.clone());
        period.ensure_open()?;

        let rows = movements::Entity::find()
            .filter(movements::Column::Kind.eq(MovementKind::Period))
            .filter(movements::Column::FinancialPeriodId.eq(id))
            .all(&txn)
            .await?;
        let entries: Vec<ClosingEntry> = load_period_movements(&txn, rows.clone())
            .await?
            .into_iter()
            .map(|m| ClosingEntry {
                value: m
                    .payment
                    .as_ref()
                    .map_or(m.movement.value, |p| p.paid_value),
                is_revenue: m.movement.is_revenue(),
                payment_method: m.payment.as_ref().map(|p| p.payment_method),
                state: m.state,
            })
            .collect();

        let previous_accumulated = closings::Entity::find()
            .filter(closings::Column::ClosingDate.lte(closing_date))
            .order_by_desc(closings::Column::ClosingDate)
            .order_by_desc(closings::Column::CreatedAt)
            .one(&txn)
            .await?
            .map_or(rust_decimal::Decimal::ZERO, |c| c.accumulated);

        let closing = Closing::calculate(id, closing_date, &entries, previous_accumulated)?;

        closings::ActiveModel {
            id: Set(Uuid::now_v7()),
            financial_period_id: Set(id),
            revenues: Set(closing.revenues),
            expenses: Set(closing.expenses),
            credit_card_expenses: Set(closing.credit_card_expenses),
            debit_card_expenses: Set(closing.debit_card_expenses),
            cash_expenses: Set(closing.cash_expenses),
            balance: Set(closing.balance),
            accumulated: Set(closing.accumulated),
            closing_date: Set(closing.closing_date),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        let paid_state = sea_orm_active_enums::MovementState::from(MovementState::Paid);
        let mut accounted = 0_usize;
        for row in rows.into_iter().filter(|r| r.state == Some(paid_state)) {
            let mut active: movements::ActiveModel = row.into();
            active.state = Set(Some(MovementState::Accounted.into()));
            active.update(&txn).await?;
            accounted += 1;
        }

        let mut active: financial_periods::ActiveModel = model.into();
        active.closed = Set(true);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&txn).await?;
        txn.commit().await?;

        info!(
            financial_period_id = %id,
            revenues = %closing.revenues,
            expenses = %closing.expenses,
            balance = %closing.balance,
            accumulated = %closing.accumulated,
            accounted_movements = accounted,
            "Financial period closed"
        );
        Ok(closing)
    }

    /// Finds the closing of a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_closing(&self, id: Uuid) -> RepositoryResult<Option<Closing>> {
        Ok(closings::Entity::find()
            .filter(closings::Column::FinancialPeriodId.eq(id))
            .one(&self.db)
            .await?
            .map(mapping::closing))
    }

    /// Reports how much of each class budget the period's movements consumed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn budget_consumption(
        &self,
        id: Uuid,
        class_type: MovementClassType,
    ) -> RepositoryResult<BudgetConsumptionReport> {
        if self.find(id).await?.is_none() {
            return Err(RepositoryError::not_found("Financial period", id));
        }

        let classes = MovementClassRepository::new(self.db.clone())
            .list(Some(class_type), None)
            .await?;
        let values: Vec<ApportionedValue> = apportionments::Entity::find()
            .inner_join(movements::Entity)
            .filter(movements::Column::Kind.eq(MovementKind::Period))
            .filter(movements::Column::FinancialPeriodId.eq(id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| ApportionedValue {
                movement_class_id: a.movement_class_id,
                value: a.value,
            })
            .collect();

        Ok(BudgetService::consumption(class_type, classes, &values))
    }
}

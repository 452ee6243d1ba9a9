//! Fixed movement repository: recurring movements and their launches.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;
use webbudget_core::financial::{FixedMovement, FixedMovementState, Launch, plan_launch};

use super::error::{RepositoryError, RepositoryResult};
use super::mapping;
use super::movement::{
    base_movement, insert_period_movement, load_apportionments, movement_active_model,
    replace_apportionments, resolve_apportionments,
};
use crate::entities::sea_orm_active_enums::{self, MovementKind};
use crate::entities::{financial_periods, launches, movements};

/// Fixed movement repository.
#[derive(Debug, Clone)]
pub struct FixedMovementRepository {
    db: DatabaseConnection,
}

impl FixedMovementRepository {
    /// Creates a new fixed movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists fixed movements by identification, optionally only the active ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, only_active: bool) -> RepositoryResult<Vec<FixedMovement>> {
        let mut query = movements::Entity::find()
            .filter(movements::Column::Kind.eq(MovementKind::Fixed))
            .order_by_asc(movements::Column::Identification);
        if only_active {
            query = query.filter(movements::Column::FixedState.eq(
                sea_orm_active_enums::FixedMovementState::from(FixedMovementState::Active),
            ));
        }
        let models = query.all(&self.db).await?;
        load_fixed_movements(&self.db, models).await
    }

    /// Finds a fixed movement by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> RepositoryResult<Option<FixedMovement>> {
        let model = movements::Entity::find_by_id(id)
            .filter(movements::Column::Kind.eq(MovementKind::Fixed))
            .one(&self.db)
            .await?;
        match model {
            Some(model) => Ok(load_fixed_movements(&self.db, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Creates an active fixed movement.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing references, a validation error, or a
    /// database error.
    pub async fn create(&self, mut fixed: FixedMovement) -> RepositoryResult<FixedMovement> {
        let txn = self.db.begin().await?;
        resolve_apportionments(&txn, &mut fixed.movement).await?;
        fixed.validate()?;

        let id = Uuid::now_v7();
        let mut active = movement_active_model(id, &fixed.movement, MovementKind::Fixed);
        active.start_date = Set(Some(fixed.start_date));
        active.total_quotes = Set(fixed.total_quotes);
        active.starting_quote = Set(Some(fixed.starting_quote));
        active.fixed_state = Set(Some(FixedMovementState::Active.into()));
        active.auto_launch = Set(fixed.auto_launch);
        active.insert(&txn).await?;
        replace_apportionments(&txn, id, &fixed.movement).await?;
        txn.commit().await?;

        info!(
            fixed_movement_id = %id,
            identification = %fixed.movement.identification,
            total_quotes = ?fixed.total_quotes,
            "Fixed movement created"
        );
        self.get(id).await
    }

    /// Updates an active fixed movement. Launched period movements keep
    /// their values.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `FixedMovementFinished`, a validation error, or
    /// a database error.
    pub async fn update(
        &self,
        id: Uuid,
        mut changes: FixedMovement,
    ) -> RepositoryResult<FixedMovement> {
        let txn = self.db.begin().await?;
        let model = lock_fixed(&txn, id).await?;
        if model.fixed_state == Some(sea_orm_active_enums::FixedMovementState::Finished) {
            return Err(webbudget_core::financial::FinancialError::FixedMovementFinished.into());
        }
        resolve_apportionments(&txn, &mut changes.movement).await?;
        changes.validate()?;

        let mut active: movements::ActiveModel = model.into();
        active.identification = Set(changes.movement.identification.clone());
        active.description = Set(changes.movement.description.clone());
        active.value = Set(changes.movement.value);
        active.contact = Set(changes.movement.contact.clone());
        active.start_date = Set(Some(changes.start_date));
        active.total_quotes = Set(changes.total_quotes);
        active.starting_quote = Set(Some(changes.starting_quote));
        active.auto_launch = Set(changes.auto_launch);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&txn).await?;
        replace_apportionments(&txn, id, &changes.movement).await?;
        txn.commit().await?;

        info!(fixed_movement_id = %id, "Fixed movement updated");
        self.get(id).await
    }

    /// Deletes a fixed movement; the movements it launched stay.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = movements::Entity::delete_many()
            .filter(movements::Column::Id.eq(id))
            .filter(movements::Column::Kind.eq(MovementKind::Fixed))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Fixed movement", id));
        }
        info!(fixed_movement_id = %id, "Fixed movement deleted");
        Ok(())
    }

    /// Launches the next quote of a fixed movement into a period.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `FixedMovementFinished`, `PeriodClosed`,
    /// `AlreadyLaunched`, or a database error.
    pub async fn launch(&self, id: Uuid, financial_period_id: Uuid) -> RepositoryResult<Launch> {
        let txn = self.db.begin().await?;
        let launch = launch_into(&txn, id, financial_period_id).await?;
        txn.commit().await?;
        Ok(launch)
    }

    /// Launches every active auto-launch fixed movement into a period.
    ///
    /// Movements that cannot be launched are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn launch_automatic(&self, financial_period_id: Uuid) -> RepositoryResult<Vec<Launch>> {
        let candidates = movements::Entity::find()
            .filter(movements::Column::Kind.eq(MovementKind::Fixed))
            .filter(movements::Column::AutoLaunch.eq(true))
            .filter(movements::Column::FixedState.eq(
                sea_orm_active_enums::FixedMovementState::from(FixedMovementState::Active),
            ))
            .all(&self.db)
            .await?;

        let mut launched = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let txn = self.db.begin().await?;
            match launch_into(&txn, candidate.id, financial_period_id).await {
                Ok(launch) => {
                    txn.commit().await?;
                    launched.push(launch);
                }
                Err(RepositoryError::Database(e)) => return Err(e.into()),
                Err(e) => {
                    warn!(
                        fixed_movement_id = %candidate.id,
                        error = %e,
                        "Skipping automatic launch"
                    );
                }
            }
        }
        Ok(launched)
    }

    /// Lists the launches of a fixed movement, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_launches(&self, id: Uuid) -> RepositoryResult<Vec<Launch>> {
        Ok(launches::Entity::find()
            .filter(launches::Column::FixedMovementId.eq(id))
            .order_by_asc(launches::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(launch)
            .collect())
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<FixedMovement> {
        self.find(id)
            .await?
            .ok_or(RepositoryError::not_found("Fixed movement", id))
    }
}

async fn launch_into<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    financial_period_id: Uuid,
) -> RepositoryResult<Launch> {
    let model = lock_fixed(conn, id).await?;
    let fixed = load_fixed_movements(conn, vec![model.clone()])
        .await?
        .pop()
        .ok_or(RepositoryError::not_found("Fixed movement", id))?;
    let period = financial_periods::Entity::find_by_id(financial_period_id)
        .one(conn)
        .await?
        .map(mapping::financial_period)
        .ok_or(RepositoryError::not_found(
            "Financial period",
            financial_period_id,
        ))?;

    let previous = launches::Entity::find()
        .filter(launches::Column::FixedMovementId.eq(id))
        .all(conn)
        .await?;
    let already_in_period = previous
        .iter()
        .any(|l| l.financial_period_id == financial_period_id);

    let mut plan = plan_launch(id, &fixed, &period, previous.len(), already_in_period)?;
    let movement_id = insert_period_movement(conn, &mut plan.movement).await?;
    plan.launch.period_movement_id = Some(movement_id);

    let launch_id = Uuid::now_v7();
    launches::ActiveModel {
        id: Set(launch_id),
        code: Set(plan.launch.code.clone()),
        quote_number: Set(plan.launch.quote_number),
        total_quotes: Set(plan.launch.total_quotes),
        financial_period_id: Set(financial_period_id),
        fixed_movement_id: Set(id),
        period_movement_id: Set(movement_id),
        created_at: Set(chrono::Utc::now().into()),
    }
    .insert(conn)
    .await?;
    plan.launch.id = Some(launch_id);

    if plan.finishes() {
        let mut active: movements::ActiveModel = model.into();
        active.fixed_state = Set(Some(FixedMovementState::Finished.into()));
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(conn).await?;
        info!(fixed_movement_id = %id, "Fixed movement finished");
    }

    info!(
        fixed_movement_id = %id,
        financial_period_id = %financial_period_id,
        movement_id = %movement_id,
        quote = ?plan.launch.quote_number,
        "Fixed movement launched"
    );
    Ok(plan.launch)
}

async fn lock_fixed<C: ConnectionTrait>(conn: &C, id: Uuid) -> RepositoryResult<movements::Model> {
    movements::Entity::find_by_id(id)
        .filter(movements::Column::Kind.eq(MovementKind::Fixed))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(RepositoryError::not_found("Fixed movement", id))
}

async fn load_fixed_movements<C: ConnectionTrait>(
    conn: &C,
    models: Vec<movements::Model>,
) -> RepositoryResult<Vec<FixedMovement>> {
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let mut apportioned = load_apportionments(conn, &ids).await?;

    models
        .into_iter()
        .map(|model| {
            let (Some(start_date), Some(state)) = (model.start_date, model.fixed_state) else {
                return Err(RepositoryError::Database(DbErr::Custom(format!(
                    "Movement {} is missing fixed columns",
                    model.id
                ))));
            };
            let base = base_movement(&model, apportioned.remove(&model.id).unwrap_or_default());
            let mut fixed = FixedMovement::new(base, start_date);
            fixed.total_quotes = model.total_quotes;
            fixed.starting_quote = model.starting_quote.unwrap_or(1);
            fixed.state = state.into();
            fixed.auto_launch = model.auto_launch;
            Ok(fixed)
        })
        .collect()
}

fn launch(model: launches::Model) -> Launch {
    Launch {
        id: Some(model.id),
        code: model.code,
        quote_number: model.quote_number,
        total_quotes: model.total_quotes,
        financial_period_id: model.financial_period_id,
        fixed_movement_id: model.fixed_movement_id,
        period_movement_id: Some(model.period_movement_id),
    }
}

//! Repository behaviour against a mocked database.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use uuid::Uuid;
use webbudget_core::financial::{
    FinancialError, FinancialPeriod, Movement, MovementState, PeriodMovement,
};
use webbudget_db::entities::sea_orm_active_enums::{
    MovementKind, MovementState as DbMovementState, WalletType,
};
use webbudget_db::entities::{
    apportionments, cost_centers, financial_periods, movement_classes, movements, payments,
    wallets,
};
use webbudget_db::{
    CostCenterRepository, FinancialPeriodRepository, MovementClassRepository, MovementRepository,
    RepositoryError, WalletRepository,
};

fn count(n: i64) -> Vec<BTreeMap<&'static str, Value>> {
    vec![BTreeMap::from([("num_items", Value::BigInt(Some(n)))])]
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    chrono::Utc::now().into()
}

fn period_model(identification: &str, start: NaiveDate, end: NaiveDate) -> financial_periods::Model {
    financial_periods::Model {
        id: Uuid::now_v7(),
        identification: identification.to_string(),
        start_date: start,
        end_date: end,
        closed: false,
        created_at: now(),
        updated_at: now(),
    }
}

fn movement_model(state: DbMovementState) -> movements::Model {
    movements::Model {
        id: Uuid::now_v7(),
        code: "AB12CD".to_string(),
        kind: MovementKind::Period,
        identification: "Groceries".to_string(),
        description: None,
        value: dec!(150.00),
        contact: Some("Market".to_string()),
        due_date: Some(date(2026, 10, 10)),
        financial_period_id: Some(Uuid::now_v7()),
        state: Some(state),
        start_date: None,
        total_quotes: None,
        starting_quote: None,
        fixed_state: None,
        auto_launch: false,
        created_at: now(),
        updated_at: now(),
    }
}

/// Appends the empty results read while loading a movement without
/// apportionments or payment.
fn with_empty_details(db: MockDatabase) -> MockDatabase {
    db.append_query_results([Vec::<apportionments::Model>::new()])
        .append_query_results([Vec::<movement_classes::Model>::new()])
        .append_query_results([Vec::<cost_centers::Model>::new()])
        .append_query_results([Vec::<payments::Model>::new()])
}

fn wallet_model(id: Uuid, actual_balance: Decimal) -> wallets::Model {
    wallets::Model {
        id,
        name: "Checking".to_string(),
        wallet_type: WalletType::Bank,
        bank: Some("Bank".to_string()),
        agency: Some("0001".to_string()),
        account: Some("12345-6".to_string()),
        description: None,
        actual_balance,
        active: true,
        created_at: now(),
        updated_at: now(),
    }
}

fn connection(db: MockDatabase) -> DatabaseConnection {
    db.into_connection()
}

#[rstest]
#[case::by_movement_classes(2, 0, 0)]
#[case::by_vehicles(0, 1, 0)]
#[case::by_children(0, 0, 3)]
#[tokio::test]
async fn cost_center_in_use_cannot_be_deleted(
    #[case] classes: i64,
    #[case] vehicles: i64,
    #[case] children: i64,
) {
    let db = connection(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([count(classes)])
            .append_query_results([count(vehicles)])
            .append_query_results([count(children)]),
    );

    let result = CostCenterRepository::new(db).delete(Uuid::now_v7()).await;

    assert!(matches!(result, Err(RepositoryError::InUse(_))));
}

#[tokio::test]
async fn unused_cost_center_is_deleted() {
    let db = connection(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([count(0)])
            .append_query_results([count(0)])
            .append_query_results([count(0)])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]),
    );

    let result = CostCenterRepository::new(db).delete(Uuid::now_v7()).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn deleting_missing_cost_center_is_not_found() {
    let id = Uuid::now_v7();
    let db = connection(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([count(0)])
            .append_query_results([count(0)])
            .append_query_results([count(0)])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]),
    );

    let result = CostCenterRepository::new(db).delete(id).await;

    assert!(matches!(
        result,
        Err(RepositoryError::NotFound { entity: "Cost center", id: missing }) if missing == id
    ));
}

#[tokio::test]
async fn movement_class_used_by_apportionments_cannot_be_deleted() {
    let db = connection(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([count(3)]));

    let result = MovementClassRepository::new(db).delete(Uuid::now_v7()).await;

    assert!(matches!(result, Err(RepositoryError::InUse(message)) if message.contains('3')));
}

#[tokio::test]
async fn wallets_are_mapped_to_domain() {
    let model = wallet_model(Uuid::now_v7(), dec!(1520.35));
    let db = connection(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![model.clone()]]),
    );

    let wallets = WalletRepository::new(db).list(true).await.unwrap();

    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].id, model.id);
    assert_eq!(wallets[0].actual_balance, dec!(1520.35));
    assert_eq!(
        wallets[0].wallet_type,
        webbudget_core::registration::WalletType::Bank
    );
}

#[tokio::test]
async fn overlapping_period_is_rejected_before_insert() {
    let existing = period_model("10/2026", date(2026, 10, 1), date(2026, 10, 31));
    let db = connection(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![existing]]),
    );
    let period = FinancialPeriod {
        id: Uuid::now_v7(),
        identification: "10-11/2026".to_string(),
        start: date(2026, 10, 15),
        end: date(2026, 11, 15),
        closed: false,
    };

    let result = FinancialPeriodRepository::new(db).create(&period).await;

    assert!(matches!(
        result,
        Err(RepositoryError::Financial(FinancialError::OverlappingPeriod(other))) if other == "10/2026"
    ));
}

#[tokio::test]
async fn duplicated_period_identification_conflicts() {
    let existing = period_model("10/2026", date(2026, 10, 1), date(2026, 10, 31));
    let db = connection(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![existing]]),
    );
    let period = FinancialPeriod {
        id: Uuid::now_v7(),
        identification: "10/2026".to_string(),
        start: date(2026, 11, 1),
        end: date(2026, 11, 30),
        closed: false,
    };

    let result = FinancialPeriodRepository::new(db).create(&period).await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
async fn closed_period_cannot_be_deleted() {
    let mut closed = period_model("09/2026", date(2026, 9, 1), date(2026, 9, 30));
    closed.closed = true;
    let db = connection(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![closed]]),
    );

    let result = FinancialPeriodRepository::new(db).delete(Uuid::now_v7()).await;

    assert!(matches!(
        result,
        Err(RepositoryError::Financial(FinancialError::PeriodClosed))
    ));
}

#[tokio::test]
async fn period_movement_is_loaded_with_its_state() {
    let model = movement_model(DbMovementState::Paid);
    let db = connection(with_empty_details(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![model.clone()]]),
    ));

    let movement = MovementRepository::new(db)
        .find(model.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(movement.movement.id, Some(model.id));
    assert_eq!(movement.movement.code, "AB12CD");
    assert_eq!(movement.state, MovementState::Paid);
    assert_eq!(movement.due_date, date(2026, 10, 10));
    assert!(movement.payment.is_none());
}

#[tokio::test]
async fn missing_period_movement_is_none() {
    let db = connection(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<movements::Model>::new()]),
    );

    let movement = MovementRepository::new(db).find(Uuid::now_v7()).await.unwrap();

    assert!(movement.is_none());
}

#[rstest]
#[case::paid(DbMovementState::Paid)]
#[case::accounted(DbMovementState::Accounted)]
#[tokio::test]
async fn closed_movement_cannot_be_deleted(#[case] state: DbMovementState) {
    let model = movement_model(state);
    let db = connection(with_empty_details(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![model.clone()]]),
    ));

    let result = MovementRepository::new(db).delete(model.id).await;

    assert!(matches!(
        result,
        Err(RepositoryError::Financial(FinancialError::MovementNotOpen))
    ));
}

#[tokio::test]
async fn transfer_locks_the_lower_wallet_id_first() {
    let low = Uuid::from_u128(1);
    let high = Uuid::from_u128(2);
    // Rows come back in lock order. The high wallet is the source and is
    // already at the lowest balance a money column holds, so the debit fails
    // only when the second locked row is taken as the source.
    let db = connection(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![wallet_model(low, dec!(10))]])
            .append_query_results([vec![wallet_model(high, dec!(-9_999_999_999_999.00))]]),
    );

    let result = WalletRepository::new(db).transfer(high, low, dec!(5), None).await;

    assert!(matches!(
        result,
        Err(RepositoryError::Financial(FinancialError::AmountOutOfRange(value))) if value == dec!(-5)
    ));
}

#[tokio::test]
async fn movement_is_not_created_in_a_closed_period() {
    let mut closed = period_model("09/2026", date(2026, 9, 1), date(2026, 9, 30));
    closed.closed = true;
    let movement = PeriodMovement::new(
        Movement::new("Groceries", dec!(80)),
        closed.id,
        date(2026, 9, 15),
    );
    let db = connection(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![closed]]),
    );

    let result = MovementRepository::new(db).create(movement).await;

    assert!(matches!(
        result,
        Err(RepositoryError::Financial(FinancialError::PeriodClosed))
    ));
}

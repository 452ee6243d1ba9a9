//! Seeds a fresh WebBudget database.
//!
//! Registers every authorization, an administrators group holding all of
//! them and a first user in that group. Running it again changes nothing.
//!
//! The administrator comes from `ADMIN_NAME`, `ADMIN_EMAIL` and
//! `ADMIN_PASSWORD`. With `--sample`, an empty database also gets a cost
//! center, two movement classes and a wallet to try the API with.
//!
//! Usage: cargo run --bin seeder [-- --sample]

use anyhow::{Context, bail};
use tracing::info;
use webbudget_core::auth::check_password_policy;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use webbudget_core::configuration::Group;
use webbudget_core::registration::{
    CostCenter, MovementClass, MovementClassType, Wallet, WalletType,
};
use webbudget_db::{
    CostCenterRepository, CreateUserInput, GroupRepository, MovementClassRepository,
    UserRepository, WalletRepository,
};
use webbudget_shared::AppConfig;

const ADMINISTRATORS: &str = "Administrators";

async fn seed_sample(db: &DatabaseConnection) -> anyhow::Result<()> {
    let cost_centers = CostCenterRepository::new(db.clone());
    if !cost_centers.list(false).await?.is_empty() {
        info!("Registrations present, sample data skipped");
        return Ok(());
    }

    let mut home = CostCenter::new("Home");
    home.expenses_budget = Decimal::new(3000, 0);
    home.revenues_budget = Decimal::new(5000, 0);
    let home = cost_centers.save(&home).await?;

    let classes = MovementClassRepository::new(db.clone());
    let mut salary = MovementClass::new("Salary", MovementClassType::In, home.to_ref());
    salary.budget = Decimal::new(5000, 0);
    classes.save(&salary).await?;
    let mut groceries = MovementClass::new("Groceries", MovementClassType::Out, home.to_ref());
    groceries.budget = Decimal::new(1200, 0);
    classes.save(&groceries).await?;

    WalletRepository::new(db.clone())
        .save(&Wallet::new("Cash", WalletType::Personal))
        .await?;

    info!(cost_center_id = %home.id, "Sample data seeded");
    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = webbudget_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    let groups = GroupRepository::new(db.clone());
    let registered = groups.sync_authorizations().await?;
    info!(registered, "Authorizations synchronized");

    let group_id = match groups
        .list()
        .await?
        .into_iter()
        .find(|g| g.name == ADMINISTRATORS)
    {
        Some(existing) => {
            // Catch up with functionalities added since the last run
            let mut group = groups
                .find(existing.id)
                .await?
                .context("Administrators group vanished")?;
            let before = group.grants.len();
            for authorization in Group::administrators(ADMINISTRATORS).grants {
                group.grant(authorization);
            }
            if group.grants.len() != before {
                groups.save(&group).await?;
                info!(grants = group.grants.len(), "Administrators group updated");
            }
            group.id
        }
        None => {
            let group = Group::administrators(ADMINISTRATORS);
            groups.save(&group).await?;
            info!(group_id = %group.id, "Administrators group created");
            group.id
        }
    };

    if std::env::args().any(|arg| arg == "--sample") {
        seed_sample(&db).await?;
    }

    let users = UserRepository::new(db);
    let email = env_or("ADMIN_EMAIL", "admin@webbudget.local").trim().to_lowercase();
    if users.email_exists(&email).await? {
        info!(email = %email, "Administrator already registered");
        return Ok(());
    }

    let Ok(password) = std::env::var("ADMIN_PASSWORD") else {
        bail!("ADMIN_PASSWORD must be set to create the administrator");
    };
    check_password_policy(&password, &password)?;

    let admin = users
        .create(CreateUserInput {
            name: env_or("ADMIN_NAME", "Administrator"),
            email,
            password,
            group_id: Some(group_id),
        })
        .await?;
    info!(user_id = %admin.id, "Administrator created");
    Ok(())
}

//! PostgreSQL connection management, migrations, health and transactions.

mod config;
mod connector;
mod health;
mod transaction;

pub use config::PostgresConfig;
pub use connector::{connect, connect_from_config, connect_from_config_with_retry, run_migrations};
pub use health::check_health;
pub use transaction::{TransactionFuture, with_transaction};

pub use sea_orm::{ConnectOptions, DatabaseConnection, DatabaseTransaction, DbErr};
pub use sea_orm_migration::MigratorTrait;

//! Standalone runner for the catalog schema: `cargo run -p migration -- up`.
//! Reads `DATABASE_URL` like the API does.

use migration::Migrator;
use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}

use anyhow::Context;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::config;
use crate::database::DatabaseManager;
use crate::seed::seed_database;

/// Seeds the database named by `DATABASE_URL`, whatever the client mode
pub async fn handle(bootstrap: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    if bootstrap || config.database.bootstrap_schema {
        DatabaseManager::bootstrap(&pool)
            .await
            .context("failed to create database schema")?;
    }

    let report = seed_database(&pool).await?;
    utils::output_success(
        &output_format,
        &format!(
            "Seeded {} users and {} tenders",
            report.users_created, report.tenders_created
        ),
        Some(json!({
            "users_created": report.users_created,
            "tenders_created": report.tenders_created,
        })),
    )
}

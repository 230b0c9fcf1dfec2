use anyhow::Context;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: &AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    let result = DatabaseManager::migrate(&pool).await;
    DatabaseManager::close(pool).await;
    result?;

    println!("Migrations applied");
    Ok(())
}

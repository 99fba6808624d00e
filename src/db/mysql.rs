use crate::config::Config;
use sea_orm::{Database, DatabaseConnection};

pub type DbPool = DatabaseConnection;

pub async fn create_mysql_pool(config: &Config) -> Result<DbPool, anyhow::Error> {
    let url = config.mysql_url();
    let db = Database::connect(&url).await?;

    super::schema::setup(&db).await?;

    Ok(db)
}

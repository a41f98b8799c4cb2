use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::error::StoreError;

use super::DocumentStore;

pub struct SqliteStore {
    db_pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let db_pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::query("CREATE TABLE IF NOT EXISTS documents (name TEXT PRIMARY KEY, body TEXT NOT NULL)")
            .execute(&db_pool)
            .await?;

        Ok(Self { db_pool })
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT body FROM documents WHERE name=?")
            .bind(name)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(row.map(|(body,)| body))
    }

    async fn put(&self, name: &str, body: String) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO documents (name,body) VALUES (?,?) ON CONFLICT(name) DO UPDATE SET body=excluded.body")
            .bind(name)
            .bind(body)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db_pool).await?;
        Ok(())
    }
}

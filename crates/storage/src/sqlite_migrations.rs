//! SQLite table provisioning, same shape as the PostgreSQL schema.

use sqlx::SqlitePool;

use crate::error::StorageError;

pub(crate) async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS models (
            id INTEGER PRIMARY KEY,
            name TEXT,
            username TEXT NOT NULL UNIQUE,
            posts TEXT,
            videos TEXT,
            likes TEXT,
            categories TEXT,
            url TEXT,
            image TEXT,
            instagram TEXT,
            tiktok TEXT,
            twitter TEXT,
            pornhub TEXT,
            description TEXT,
            price TEXT,
            twitch TEXT,
            reddit TEXT,
            youtube TEXT,
            location TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_categories_name ON categories (name)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS model_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            model_id INTEGER NOT NULL REFERENCES models(id),
            category_id INTEGER NOT NULL REFERENCES categories(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_model_categories_pair
         ON model_categories (model_id, category_id)",
    )
    .execute(pool)
    .await?;

    tracing::info!("SQLite catalog tables ready");
    Ok(())
}

//! PostgreSQL table provisioning for catalog-sync.

use sqlx::PgPool;

use crate::error::StorageError;

/// Create the catalog tables if missing. Safe to run on every start.
///
/// `model_categories` carries no uniqueness over `(model_id, category_id)`;
/// the association synchronizer is what keeps pairs distinct.
pub(crate) async fn run_pg_migrations(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS models (
            id BIGINT PRIMARY KEY,
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
            id BIGSERIAL PRIMARY KEY,
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
            id BIGSERIAL PRIMARY KEY,
            model_id BIGINT NOT NULL REFERENCES models(id),
            category_id BIGINT NOT NULL REFERENCES categories(id)
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

    tracing::info!("PostgreSQL catalog tables ready");
    Ok(())
}

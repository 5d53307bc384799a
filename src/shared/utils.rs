use anyhow::Context;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use serde::Deserialize;

use crate::shared::config::DatabaseConfig;
use crate::shared::error::AppError;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_conn(cfg: &DatabaseConfig) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(&cfg.url);
    Pool::builder()
        .max_size(cfg.max_connections)
        .build(manager)
        .context("failed to build database pool")
}

/// Run database migrations
pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    let mut conn = pool.get().context("failed to get connection for migrations")?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("migration error: {e}"))?;
    Ok(())
}

/// Bridge a Diesel closure onto the blocking thread pool. One connection
/// checkout per operation; pool exhaustion surfaces as a 500.
pub async fn run_blocking<T, F>(pool: &DbPool, f: F) -> Result<T, AppError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| AppError::Internal(format!("database pool: {e}")))?;
        f(&mut conn)
    })
    .await
    .map_err(|e| AppError::Internal(format!("blocking task failed: {e}")))?
}

/// Common list-endpoint query string: `?search=` narrows the listing by a
/// case-insensitive substring over the entity's headline fields.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

/// Turns a raw search term into an ILIKE pattern, or None for blank input.
pub fn search_pattern(search: Option<&str>) -> Option<String> {
    let term = search?.trim();
    if term.is_empty() {
        return None;
    }
    Some(format!("%{term}%"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_pattern_wraps_term() {
        assert_eq!(search_pattern(Some("acme")), Some("%acme%".to_string()));
    }

    #[test]
    fn search_pattern_ignores_blank() {
        assert_eq!(search_pattern(Some("   ")), None);
        assert_eq!(search_pattern(None), None);
    }
}

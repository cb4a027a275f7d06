//! PostgreSQL connection and migration support.

use std::collections::HashSet;

use anyhow::Context;
use bookshelf_kernel::{settings::DatabaseSettings, Migration};
use sqlx::postgres::{PgPool, PgPoolOptions};

const MIGRATIONS_TABLE: &str = "_bookshelf_migrations";

/// Open a connection pool and verify the server answers.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    tracing::info!(
        target: "bookshelf-db",
        max_connections = settings.max_connections,
        "connecting to PostgreSQL"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await
        .with_context(|| "failed to connect to PostgreSQL")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .with_context(|| "PostgreSQL connection check failed")?;

    Ok(pool)
}

/// Apply every migration not yet recorded, in the order given.
/// Returns the number of migrations applied by this call.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::raw_sql(&format!(
        "CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
            module TEXT NOT NULL,
            id TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (module, id)
        )"
    ))
    .execute(pool)
    .await
    .with_context(|| "failed to create migrations table")?;

    let applied: HashSet<(String, String)> =
        sqlx::query_as::<_, (String, String)>(&format!("SELECT module, id FROM {MIGRATIONS_TABLE}"))
            .fetch_all(pool)
            .await
            .with_context(|| "failed to read applied migrations")?
            .into_iter()
            .collect();

    let pending = pending_migrations(migrations, &applied);
    for (module, migration) in &pending {
        tracing::info!(target: "bookshelf-db", module = %module, id = migration.id, "applying migration");

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        sqlx::query(&format!(
            "INSERT INTO {MIGRATIONS_TABLE} (module, id) VALUES ($1, $2)"
        ))
        .bind(module.as_str())
        .bind(migration.id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
    }

    Ok(pending.len())
}

fn pending_migrations<'a>(
    migrations: &'a [(String, Migration)],
    applied: &HashSet<(String, String)>,
) -> Vec<&'a (String, Migration)> {
    migrations
        .iter()
        .filter(|(module, migration)| !applied.contains(&(module.clone(), migration.id.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migration(id: &'static str) -> Migration {
        Migration {
            id,
            up: "SELECT 1",
        }
    }

    #[test]
    fn pending_skips_recorded_migrations() {
        let migrations = vec![
            ("books".to_string(), migration("001_create_books")),
            ("books".to_string(), migration("002_add_index")),
        ];
        let applied = HashSet::from([("books".to_string(), "001_create_books".to_string())]);

        let pending = pending_migrations(&migrations, &applied);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1.id, "002_add_index");
    }

    #[test]
    fn same_id_in_other_module_is_still_pending() {
        let migrations = vec![("authors".to_string(), migration("001_create_books"))];
        let applied = HashSet::from([("books".to_string(), "001_create_books".to_string())]);

        assert_eq!(pending_migrations(&migrations, &applied).len(), 1);
    }
}

use anyhow::Context;
use rusqlite::Connection;

/// Schema migrations compiled into the binary, applied in order.
pub const MIGRATIONS: &[(&str, &str)] = &[(
    "001_reservations.sql",
    include_str!("../../migrations/001_reservations.sql"),
)];

/// Applies every migration not yet recorded in `_migrations`, each inside its
/// own transaction. Returns how many ran.
pub fn run_migrations(conn: &Connection, migrations: &[(&str, &str)]) -> anyhow::Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    let mut applied = 0;
    for (name, sql) in migrations {
        let seen: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;
        if seen {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .context("failed to open migration transaction")?;
        tx.execute_batch(sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;
        tx.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])
            .with_context(|| format!("failed to record migration: {name}"))?;
        tx.commit()
            .with_context(|| format!("failed to commit migration: {name}"))?;

        tracing::info!(migration = %name, "applied migration");
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_apply_once() {
        let conn = Connection::open_in_memory().unwrap();

        assert_eq!(run_migrations(&conn, MIGRATIONS).unwrap(), MIGRATIONS.len());
        assert_eq!(run_migrations(&conn, MIGRATIONS).unwrap(), 0);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM reservations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_failed_migration_rolls_back() {
        let conn = Connection::open_in_memory().unwrap();
        let broken = [("900_broken.sql", "CREATE TABLE half (id INTEGER); NOT SQL;")];

        assert!(run_migrations(&conn, &broken).is_err());

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'half'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
        let recorded: i64 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(recorded, 0);
    }
}

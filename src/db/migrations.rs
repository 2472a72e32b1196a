use std::fs;
use std::path::Path;

use anyhow::Context;
use rusqlite::{params, Connection};

/// Applies every `*.sql` file in `dir` not yet recorded in `_migrations`, in file-name order.
pub fn run_migrations(conn: &Connection, dir: &Path) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    anyhow::ensure!(
        dir.is_dir(),
        "migrations directory not found: {}",
        dir.display()
    );

    let mut files: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("failed to read migrations directory: {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    files.sort();

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;
        if applied {
            continue;
        }

        let sql = fs::read_to_string(&path)
            .with_context(|| format!("failed to read migration file: {name}"))?;

        conn.execute_batch(&sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;
        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", params![name])
            .with_context(|| format!("failed to record migration: {name}"))?;

        tracing::info!(migration = %name, "applied migration");
    }

    Ok(())
}

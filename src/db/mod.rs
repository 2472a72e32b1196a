pub mod migrations;
pub mod queries;

use std::path::Path;

use anyhow::Context;
use rusqlite::Connection;

/// Migrations shipped with the crate.
pub const DEFAULT_MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    init_db_with_migrations(path, Path::new(DEFAULT_MIGRATIONS_DIR))
}

pub fn init_db_with_migrations(path: &str, migrations_dir: &Path) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn, migrations_dir)?;

    Ok(conn)
}

//! Database schema migrations
//!
//! Versioned migrations for the table layout of the cell database. These are
//! distinct from cell value migrations (see `store::migrator`): they change
//! tables, not the JSON held inside a row.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - users upgrading from any older
//!    version run every step after their recorded version
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Idempotent** - every step checks before it alters, so a crash between
//!    the step and the version insert is harmless
//! 4. **Use ALTER TABLE** - prefer it over DROP/CREATE to preserve data

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    if !table_exists(pool, "schema_version").await? {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name = ?
        )
        "#,
    )
    .bind(table)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    info!("All migrations completed successfully");
    Ok(())
}

/// Migration v1: Add revision and updated_at columns to cells
///
/// **Background:** Early builds stored only key/value. The revision counter
/// lets sibling processes notice that a key changed underneath them.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add revision tracking to cells");

    if column_exists(pool, "cells", "revision").await? {
        info!("  revision column already exists - skipping");
    } else {
        sqlx::query("ALTER TABLE cells ADD COLUMN revision INTEGER NOT NULL DEFAULT 0")
            .execute(pool)
            .await?;
        info!("  ✓ Added revision column to cells table");
    }

    // SQLite cannot ALTER in a column with a CURRENT_TIMESTAMP default
    if column_exists(pool, "cells", "updated_at").await? {
        info!("  updated_at column already exists - skipping");
    } else {
        sqlx::query("ALTER TABLE cells ADD COLUMN updated_at TIMESTAMP")
            .execute(pool)
            .await?;
        info!("  ✓ Added updated_at column to cells table");
    }

    Ok(())
}

async fn column_exists(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?",
    )
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Migration v2: Copy legacy settings rows into cells
///
/// **Background:** The first desktop build persisted everything in a
/// `settings(key, value)` table. Keys already present in `cells` win.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Copy legacy settings into cells");

    if !table_exists(pool, "settings").await? {
        info!("  No legacy settings table - skipping");
        return Ok(());
    }

    let copied = sqlx::query(
        r#"
        INSERT OR IGNORE INTO cells (key, value)
        SELECT key, value FROM settings WHERE value IS NOT NULL
        "#,
    )
    .execute(pool)
    .await?
    .rows_affected();

    info!("  ✓ Copied {} legacy settings into cells", copied);
    Ok(())
}

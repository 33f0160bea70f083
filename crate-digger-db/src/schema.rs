//! SQLite schema creation and migration.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database is newer than this build: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
    #[error("Cannot create database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 2;

/// Create all tables and indexes if they don't exist.
///
/// Idempotent: safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    if get_schema_version(conn)? < CURRENT_VERSION {
        set_schema_version(conn, CURRENT_VERSION)?;
    }
    Ok(())
}

/// Open or create a collection database at the given path, creating parent
/// directories as needed.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        log::info!("Creating collection database at {}", path.display());
        create_schema(&conn)?;
    } else if version != CURRENT_VERSION {
        migrate(&conn, version)?;
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Run migrations from `from_version` up to `CURRENT_VERSION`.
fn migrate(conn: &Connection, from_version: i32) -> Result<(), SchemaError> {
    if from_version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: from_version,
        });
    }

    let mut version = from_version;
    while version < CURRENT_VERSION {
        match version {
            1 => {
                conn.execute_batch(
                    "ALTER TABLE vinyls ADD COLUMN purchase_location_id INTEGER REFERENCES locations(id) ON DELETE SET NULL;
                     ALTER TABLE vinyls ADD COLUMN double_lp BOOLEAN NOT NULL DEFAULT 0;
                     CREATE INDEX IF NOT EXISTS idx_vinyls_location ON vinyls(purchase_location_id);",
                )?;
            }
            _ => {}
        }
        version += 1;
        set_schema_version(conn, version)?;
    }
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Collection members
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE
);

-- Records in the shared collection
CREATE TABLE IF NOT EXISTS vinyls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artist TEXT NOT NULL COLLATE NOCASE,
    album TEXT NOT NULL COLLATE NOCASE,
    date_purchased TEXT,
    purchase_location_id INTEGER REFERENCES locations(id) ON DELETE SET NULL,
    price REAL,
    length INTEGER,
    notes TEXT,
    play_count INTEGER NOT NULL DEFAULT 0,
    image_url TEXT,
    double_lp BOOLEAN NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(artist, album)
);
CREATE INDEX IF NOT EXISTS idx_vinyls_location ON vinyls(purchase_location_id);

CREATE TABLE IF NOT EXISTS vinyl_owners (
    vinyl_id INTEGER NOT NULL REFERENCES vinyls(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (vinyl_id, user_id)
);

CREATE TABLE IF NOT EXISTS vinyl_likes (
    vinyl_id INTEGER NOT NULL REFERENCES vinyls(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (vinyl_id, user_id)
);

-- Listening history
CREATE TABLE IF NOT EXISTS plays (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vinyl_id INTEGER NOT NULL REFERENCES vinyls(id) ON DELETE CASCADE,
    played_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_plays_vinyl ON plays(vinyl_id);

CREATE TABLE IF NOT EXISTS play_listeners (
    play_id INTEGER NOT NULL REFERENCES plays(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (play_id, user_id)
);

-- Shared want list
CREATE TABLE IF NOT EXISTS wantlist (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artist TEXT NOT NULL COLLATE NOCASE,
    album TEXT NOT NULL COLLATE NOCASE,
    image_url TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(artist, album)
);

CREATE TABLE IF NOT EXISTS want_searchers (
    want_id INTEGER NOT NULL REFERENCES wantlist(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (want_id, user_id)
);

-- Record stores
CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE,
    address TEXT,
    physical BOOLEAN NOT NULL DEFAULT 1
);
"#;

//! Write operations for members, records, plays, the want list and stores.

use crate_digger_core::records::{Location, PlayLog, User, Vinyl, WantItem};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },
    #[error("Already exists: {entity_type} '{key}'")]
    Duplicate { entity_type: String, key: String },
}

impl OperationError {
    pub fn not_found(entity_type: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: &str, key: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.to_string(),
            key: key.into(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Outcome of adding to the want list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WantStatus {
    Added,
    /// Already on the list; any new searchers were still attached.
    Duplicate,
}

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether an error came from a UNIQUE or PRIMARY KEY constraint.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Map a unique-constraint failure to [`OperationError::Duplicate`].
fn on_duplicate(entity_type: &str, key: &str) -> impl FnOnce(rusqlite::Error) -> OperationError {
    let entity_type = entity_type.to_string();
    let key = key.to_string();
    move |err| {
        if is_unique_violation(&err) {
            OperationError::duplicate(&entity_type, key)
        } else {
            OperationError::Sqlite(err)
        }
    }
}

/// Look up a member id by name (case-insensitive).
fn user_id(conn: &Connection, name: &str) -> Result<i64, OperationError> {
    conn.query_row("SELECT id FROM users WHERE name = ?1", params![name], |row| row.get(0))
        .optional()?
        .ok_or_else(|| OperationError::not_found("user", name))
}

/// Look up a record store id by name (case-insensitive).
fn location_id(conn: &Connection, name: &str) -> Result<i64, OperationError> {
    conn.query_row("SELECT id FROM locations WHERE name = ?1", params![name.trim()], |row| {
        row.get(0)
    })
    .optional()?
    .ok_or_else(|| OperationError::not_found("location", name))
}

// ── User Operations ─────────────────────────────────────────────────────────

/// Add a collection member.
pub fn insert_user(conn: &Connection, name: &str) -> Result<User, OperationError> {
    let name = name.trim();
    conn.execute("INSERT INTO users (name) VALUES (?1)", params![name])
        .map_err(on_duplicate("user", name))?;
    Ok(User {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

// ── Vinyl Operations ────────────────────────────────────────────────────────

/// Insert a record along with its owners and likes, which are given by
/// member name. The purchase location, if any, must be a known store.
/// Returns the new record id.
pub fn insert_vinyl(conn: &Connection, vinyl: &Vinyl) -> Result<i64, OperationError> {
    let key = format!("{} - {}", vinyl.artist, vinyl.album);
    let tx = conn.unchecked_transaction()?;

    let location = match &vinyl.purchase_location {
        Some(name) => Some(location_id(&tx, name)?),
        None => None,
    };
    tx.execute(
        "INSERT INTO vinyls (artist, album, date_purchased, purchase_location_id, price, length,
                             notes, play_count, image_url, double_lp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            vinyl.artist,
            vinyl.album,
            vinyl.date_purchased.map(|d| d.format(DATE_FORMAT).to_string()),
            location,
            vinyl.price,
            vinyl.length,
            vinyl.notes,
            vinyl.play_count,
            vinyl.image_url,
            vinyl.double_lp,
        ],
    )
    .map_err(on_duplicate("vinyl", &key))?;
    let vinyl_id = tx.last_insert_rowid();

    for owner in &vinyl.owners {
        add_owner(&tx, vinyl_id, user_id(&tx, owner)?)?;
    }
    for fan in &vinyl.liked_by {
        add_like(&tx, vinyl_id, user_id(&tx, fan)?)?;
    }

    tx.commit()?;
    log::debug!("Inserted vinyl {} as #{}", key, vinyl_id);
    Ok(vinyl_id)
}

/// Record that a member owns a record. Repeated calls are no-ops.
pub fn add_owner(conn: &Connection, vinyl_id: i64, user_id: i64) -> Result<(), OperationError> {
    conn.execute(
        "INSERT OR IGNORE INTO vinyl_owners (vinyl_id, user_id) VALUES (?1, ?2)",
        params![vinyl_id, user_id],
    )?;
    Ok(())
}

/// Record that a member likes a record. Repeated calls are no-ops.
pub fn add_like(conn: &Connection, vinyl_id: i64, user_id: i64) -> Result<(), OperationError> {
    conn.execute(
        "INSERT OR IGNORE INTO vinyl_likes (vinyl_id, user_id) VALUES (?1, ?2)",
        params![vinyl_id, user_id],
    )?;
    Ok(())
}

// ── Play Operations ─────────────────────────────────────────────────────────

/// Log one play of a record in the collection and bump its play count.
///
/// The record is matched by artist and album, case-insensitively. Returns
/// the new play id, or `NotFound` when the album is not in the collection.
pub fn log_play(conn: &Connection, play: &PlayLog) -> Result<i64, OperationError> {
    let tx = conn.unchecked_transaction()?;

    let vinyl_id: i64 = tx
        .query_row(
            "SELECT id FROM vinyls WHERE artist = ?1 AND album = ?2",
            params![play.artist, play.album],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| OperationError::not_found("vinyl", format!("{} - {}", play.artist, play.album)))?;

    tx.execute(
        "UPDATE vinyls SET play_count = play_count + 1 WHERE id = ?1",
        params![vinyl_id],
    )?;
    tx.execute(
        "INSERT INTO plays (vinyl_id, played_at) VALUES (?1, ?2)",
        params![vinyl_id, play.played_at.to_rfc3339()],
    )?;
    let play_id = tx.last_insert_rowid();

    for listener in &play.listeners {
        tx.execute(
            "INSERT OR IGNORE INTO play_listeners (play_id, user_id) VALUES (?1, ?2)",
            params![play_id, listener],
        )?;
    }

    tx.commit()?;
    log::info!("Logged play of {} - {}", play.artist, play.album);
    Ok(play_id)
}

// ── Want List Operations ────────────────────────────────────────────────────

/// Add an entry to the shared want list, attaching its searchers by name.
pub fn add_want(conn: &Connection, item: &WantItem) -> Result<WantStatus, OperationError> {
    let tx = conn.unchecked_transaction()?;

    let inserted = tx.execute(
        "INSERT OR IGNORE INTO wantlist (artist, album, image_url, notes) VALUES (?1, ?2, ?3, ?4)",
        params![item.artist, item.album, item.image_url, item.notes],
    )?;
    let want_id: i64 = tx.query_row(
        "SELECT id FROM wantlist WHERE artist = ?1 AND album = ?2",
        params![item.artist, item.album],
        |row| row.get(0),
    )?;

    for searcher in &item.searchers {
        tx.execute(
            "INSERT OR IGNORE INTO want_searchers (want_id, user_id) VALUES (?1, ?2)",
            params![want_id, user_id(&tx, searcher)?],
        )?;
    }

    tx.commit()?;
    Ok(if inserted == 0 {
        WantStatus::Duplicate
    } else {
        WantStatus::Added
    })
}

// ── Location Operations ─────────────────────────────────────────────────────

/// Add a record store. Returns the new location id.
pub fn insert_location(conn: &Connection, location: &Location) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO locations (name, address, physical) VALUES (?1, ?2, ?3)",
        params![location.name, location.address, location.physical],
    )
    .map_err(on_duplicate("location", &location.name))?;
    Ok(conn.last_insert_rowid())
}

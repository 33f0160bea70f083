//! Read queries over the collection database.
//!
//! Rows are converted to typed records in the `row_to_*` functions at the
//! bottom of this file and nowhere else.

use chrono::NaiveDate;
use crate_digger_core::query::ListScope;
use crate_digger_core::records::{Location, User, Vinyl, WantItem};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::operations::{DATE_FORMAT, OperationError};

const VINYL_COLUMNS: &str = "v.id, v.artist, v.album, v.date_purchased, v.price, v.length, v.notes, \
     v.play_count, v.image_url, pl.name, v.double_lp";

/// Records joined with the store they were bought at.
const VINYL_FROM: &str = "vinyls v LEFT JOIN locations pl ON pl.id = v.purchase_location_id";

/// A store, artist or record ranked by how many rows it accounts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCount {
    pub title: String,
    pub count: u64,
}

/// Row counts across the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub users: u64,
    pub vinyls: u64,
    pub plays: u64,
    pub wants: u64,
    pub locations: u64,
}

// ── User Lookups ────────────────────────────────────────────────────────────

/// Find a member by name (case-insensitive).
pub fn find_user_by_name(conn: &Connection, name: &str) -> Result<Option<User>, OperationError> {
    conn.query_row(
        "SELECT id, name FROM users WHERE name = ?1",
        params![name.trim()],
        row_to_user,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>, OperationError> {
    let mut stmt = conn.prepare("SELECT id, name FROM users ORDER BY name")?;
    let rows = stmt.query_map([], row_to_user)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Vinyl Lookups ───────────────────────────────────────────────────────────

/// Every record, ordered by artist then album.
pub fn all_vinyls(conn: &Connection) -> Result<Vec<Vinyl>, OperationError> {
    let sql = format!("SELECT {VINYL_COLUMNS} FROM {VINYL_FROM} ORDER BY v.artist, v.album");
    query_vinyls(conn, &sql, params![])
}

/// Records whose artist or album contains `term` (case-insensitive).
pub fn search_vinyls(conn: &Connection, term: &str) -> Result<Vec<Vinyl>, OperationError> {
    let sql = format!(
        "SELECT {VINYL_COLUMNS} FROM {VINYL_FROM}
         WHERE v.artist LIKE ?1 ESCAPE '\\' OR v.album LIKE ?1 ESCAPE '\\'
         ORDER BY v.artist, v.album"
    );
    query_vinyls(conn, &sql, params![like_pattern(term)])
}

/// Records owned by the named member.
pub fn vinyls_owned_by(conn: &Connection, name: &str) -> Result<Vec<Vinyl>, OperationError> {
    let sql = format!(
        "SELECT {VINYL_COLUMNS} FROM {VINYL_FROM}
         JOIN vinyl_owners o ON o.vinyl_id = v.id
         JOIN users u ON u.id = o.user_id
         WHERE u.name = ?1
         ORDER BY v.artist, v.album"
    );
    query_vinyls(conn, &sql, params![name])
}

/// Records liked by the named member.
pub fn vinyls_liked_by(conn: &Connection, name: &str) -> Result<Vec<Vinyl>, OperationError> {
    let sql = format!(
        "SELECT {VINYL_COLUMNS} FROM {VINYL_FROM}
         JOIN vinyl_likes l ON l.vinyl_id = v.id
         JOIN users u ON u.id = l.user_id
         WHERE u.name = ?1
         ORDER BY v.artist, v.album"
    );
    query_vinyls(conn, &sql, params![name])
}

/// Exact (case-insensitive) lookup by artist and album.
pub fn find_vinyl(conn: &Connection, artist: &str, album: &str) -> Result<Option<Vinyl>, OperationError> {
    let sql = format!("SELECT {VINYL_COLUMNS} FROM {VINYL_FROM} WHERE v.artist = ?1 AND v.album = ?2");
    Ok(query_vinyls(conn, &sql, params![artist.trim(), album.trim()])?
        .into_iter()
        .next())
}

/// Records for a list command: everything, one member's records, or a search.
pub fn vinyls_in_scope(conn: &Connection, scope: &ListScope) -> Result<Vec<Vinyl>, OperationError> {
    match scope {
        ListScope::Full => all_vinyls(conn),
        ListScope::Member(name) => vinyls_owned_by(conn, name),
        ListScope::Search(term) => search_vinyls(conn, term),
    }
}

/// The most-played records, ties broken by artist and album.
pub fn top_played(conn: &Connection, limit: usize) -> Result<Vec<Vinyl>, OperationError> {
    let sql = format!(
        "SELECT {VINYL_COLUMNS} FROM {VINYL_FROM}
         WHERE v.play_count > 0
         ORDER BY v.play_count DESC, v.artist, v.album
         LIMIT ?1"
    );
    query_vinyls(conn, &sql, params![limit as i64])
}

fn query_vinyls(conn: &Connection, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Vinyl>, OperationError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, row_to_vinyl)?;
    let mut vinyls = rows.collect::<Result<Vec<_>, _>>()?;
    for vinyl in &mut vinyls {
        vinyl.owners = member_names(conn, "vinyl_owners", "vinyl_id", vinyl.id)?;
        vinyl.liked_by = member_names(conn, "vinyl_likes", "vinyl_id", vinyl.id)?;
    }
    Ok(vinyls)
}

// ── Want List Lookups ───────────────────────────────────────────────────────

/// Want list entries: everything, one member's searches, or a search.
pub fn want_list(conn: &Connection, scope: &ListScope) -> Result<Vec<WantItem>, OperationError> {
    let (sql, arg) = match scope {
        ListScope::Full => (
            "SELECT w.id, w.artist, w.album, w.image_url, w.notes FROM wantlist w
             ORDER BY w.artist, w.album",
            None,
        ),
        ListScope::Member(name) => (
            "SELECT w.id, w.artist, w.album, w.image_url, w.notes FROM wantlist w
             JOIN want_searchers s ON s.want_id = w.id
             JOIN users u ON u.id = s.user_id
             WHERE u.name = ?1
             ORDER BY w.artist, w.album",
            Some(name.clone()),
        ),
        ListScope::Search(term) => (
            "SELECT w.id, w.artist, w.album, w.image_url, w.notes FROM wantlist w
             WHERE w.artist LIKE ?1 ESCAPE '\\' OR w.album LIKE ?1 ESCAPE '\\'
             ORDER BY w.artist, w.album",
            Some(like_pattern(term)),
        ),
    };

    let mut stmt = conn.prepare(sql)?;
    let rows = match &arg {
        Some(arg) => stmt.query_map(params![arg], row_to_want)?,
        None => stmt.query_map([], row_to_want)?,
    };
    let mut items = rows.collect::<Result<Vec<_>, _>>()?;
    for item in &mut items {
        item.searchers = member_names(conn, "want_searchers", "want_id", item.id)?;
    }
    Ok(items)
}

// ── Location Lookups ────────────────────────────────────────────────────────

pub fn physical_locations(conn: &Connection) -> Result<Vec<Location>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, address, physical FROM locations WHERE physical = 1 ORDER BY name",
    )?;
    let rows = stmt.query_map([], row_to_location)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Rankings ────────────────────────────────────────────────────────────────

/// Artists ranked by how many of their albums are in the collection, or
/// owned by `member`.
pub fn artist_album_counts(
    conn: &Connection,
    member: Option<&str>,
    limit: usize,
) -> Result<Vec<RankedCount>, OperationError> {
    match member {
        None => query_ranking(
            conn,
            "SELECT v.artist, COUNT(*) AS n FROM vinyls v
             GROUP BY v.artist
             ORDER BY n DESC, v.artist
             LIMIT ?1",
            params![limit as i64],
        ),
        Some(name) => query_ranking(
            conn,
            "SELECT v.artist, COUNT(*) AS n FROM vinyls v
             JOIN vinyl_owners o ON o.vinyl_id = v.id
             JOIN users u ON u.id = o.user_id
             WHERE u.name = ?1
             GROUP BY v.artist
             ORDER BY n DESC, v.artist
             LIMIT ?2",
            params![name, limit as i64],
        ),
    }
}

/// Records ranked by plays: overall, among plays `member` listened to, or
/// limited to records matching a search term.
pub fn play_counts(conn: &Connection, scope: &ListScope, limit: usize) -> Result<Vec<RankedCount>, OperationError> {
    match scope {
        ListScope::Full => Ok(top_played(conn, limit)?
            .into_iter()
            .map(|v| RankedCount {
                title: format!("{} - {}", v.artist, v.album),
                count: u64::from(v.play_count),
            })
            .collect()),
        ListScope::Member(name) => query_ranking(
            conn,
            "SELECT v.artist || ' - ' || v.album, COUNT(*) AS n FROM plays p
             JOIN vinyls v ON v.id = p.vinyl_id
             JOIN play_listeners l ON l.play_id = p.id
             JOIN users u ON u.id = l.user_id
             WHERE u.name = ?1
             GROUP BY v.id
             ORDER BY n DESC, v.artist, v.album
             LIMIT ?2",
            params![name, limit as i64],
        ),
        ListScope::Search(term) => query_ranking(
            conn,
            "SELECT v.artist || ' - ' || v.album, v.play_count FROM vinyls v
             WHERE v.play_count > 0
               AND (v.artist LIKE ?1 ESCAPE '\\' OR v.album LIKE ?1 ESCAPE '\\')
             ORDER BY v.play_count DESC, v.artist, v.album
             LIMIT ?2",
            params![like_pattern(term), limit as i64],
        ),
    }
}

/// Stores ranked by how many records were bought there, overall or among
/// the records `member` owns.
pub fn location_purchase_counts(
    conn: &Connection,
    member: Option<&str>,
    limit: usize,
) -> Result<Vec<RankedCount>, OperationError> {
    match member {
        None => query_ranking(
            conn,
            "SELECT l.name, COUNT(*) AS n FROM vinyls v
             JOIN locations l ON l.id = v.purchase_location_id
             GROUP BY l.id
             ORDER BY n DESC, l.name
             LIMIT ?1",
            params![limit as i64],
        ),
        Some(name) => query_ranking(
            conn,
            "SELECT l.name, COUNT(*) AS n FROM vinyls v
             JOIN locations l ON l.id = v.purchase_location_id
             JOIN vinyl_owners o ON o.vinyl_id = v.id
             JOIN users u ON u.id = o.user_id
             WHERE u.name = ?1
             GROUP BY l.id
             ORDER BY n DESC, l.name
             LIMIT ?2",
            params![name, limit as i64],
        ),
    }
}

fn query_ranking(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<RankedCount>, OperationError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, row_to_ranked)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

pub fn collection_stats(conn: &Connection) -> Result<CollectionStats, OperationError> {
    let count = |table: &str| -> Result<u64, OperationError> {
        let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n as u64)
    };
    Ok(CollectionStats {
        users: count("users")?,
        vinyls: count("vinyls")?,
        plays: count("plays")?,
        wants: count("wantlist")?,
        locations: count("locations")?,
    })
}

// ── Row Mapping ─────────────────────────────────────────────────────────────

/// Sorted member names from a `(<key>, user_id)` link table.
fn member_names(conn: &Connection, table: &str, key: &str, id: i64) -> Result<Vec<String>, OperationError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT u.name FROM {table} t JOIN users u ON u.id = t.user_id WHERE t.{key} = ?1 ORDER BY u.name"
    ))?;
    let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn row_to_vinyl(row: &Row) -> rusqlite::Result<Vinyl> {
    let date: Option<String> = row.get(3)?;
    Ok(Vinyl {
        id: row.get(0)?,
        artist: row.get(1)?,
        album: row.get(2)?,
        // Hand-entered dates that don't parse are treated as unknown.
        date_purchased: date.and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
        price: row.get(4)?,
        length: row.get(5)?,
        notes: row.get(6)?,
        play_count: row.get(7)?,
        image_url: row.get(8)?,
        purchase_location: row.get(9)?,
        double_lp: row.get(10)?,
        owners: Vec::new(),
        liked_by: Vec::new(),
    })
}

fn row_to_want(row: &Row) -> rusqlite::Result<WantItem> {
    Ok(WantItem {
        id: row.get(0)?,
        artist: row.get(1)?,
        album: row.get(2)?,
        image_url: row.get(3)?,
        notes: row.get(4)?,
        searchers: Vec::new(),
    })
}

fn row_to_ranked(row: &Row) -> rusqlite::Result<RankedCount> {
    let count: i64 = row.get(1)?;
    Ok(RankedCount {
        title: row.get(0)?,
        count: count as u64,
    })
}

fn row_to_location(row: &Row) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        physical: row.get(3)?,
    })
}

//! SQLite persistence layer for the record collection.
//!
//! Provides schema creation, write operations and read queries over
//! members, records, plays, the want list and record stores, backed by
//! SQLite (via rusqlite with the bundled feature). Rows cross this boundary
//! only as the typed records from `crate_digger_core::records`.

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    OperationError, WantStatus, add_like, add_owner, add_want, insert_location, insert_user,
    insert_vinyl, log_play,
};
pub use queries::{
    CollectionStats, RankedCount, all_vinyls, artist_album_counts, collection_stats,
    find_user_by_name, find_vinyl, list_users, location_purchase_counts, physical_locations,
    play_counts, search_vinyls, top_played, vinyls_in_scope, vinyls_liked_by, vinyls_owned_by,
    want_list,
};
pub use schema::{SchemaError, open_database, open_memory};

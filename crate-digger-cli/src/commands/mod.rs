pub(crate) mod add;
pub(crate) mod check;
pub(crate) mod config;
pub(crate) mod info;
pub(crate) mod list;
pub(crate) mod play;
pub(crate) mod random;
pub(crate) mod seed;
pub(crate) mod top;
pub(crate) mod want;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use rusqlite::Connection;

use crate_digger_core::records::Vinyl;
use crate_digger_core::{AppConfig, CatalogQuery, LookupQuery, SpotifyUrl};
use crate_digger_db::{OperationError, find_user_by_name, find_vinyl, open_database, search_vinyls};
use crate_digger_discogs::{CatalogMatcher, DiscogsClient, DiscogsCredentials};
use crate_digger_session::{
    ActorId, SessionController, SessionItem, SessionRequest, SessionStore,
};
use crate_digger_spotify::{ReleaseSource, ReleaseSummary, SpotifyClient, SpotifyCredentials};

use crate::error::CliError;
use crate::spinner::with_spinner;
use crate::terminal::{COMMAND_SURFACE, TerminalTransport, drive};

/// Most options a single-choice menu can offer.
pub(crate) const MAX_CHOICES: usize = 25;

/// Shared handle to the collection database. Completion callbacks run after
/// the command returns control, so they hold their own clone.
pub(crate) type Db = Arc<Mutex<Connection>>;

pub(crate) fn lock(db: &Db) -> MutexGuard<'_, Connection> {
    db.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything a command handler needs.
pub(crate) struct Context {
    pub config: AppConfig,
    pub db: Db,
    pub requester: ActorId,
}

impl Context {
    pub(crate) fn open(config: AppConfig, db_path: &Path, requester: ActorId) -> Result<Self, CliError> {
        let conn = open_database(db_path)?;
        Ok(Self {
            config,
            db: Arc::new(Mutex::new(conn)),
            requester,
        })
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        lock(&self.db)
    }

    /// Member name of the requester: the configured mapping for their
    /// handle, or the handle itself.
    pub(crate) fn member(&self) -> String {
        self.config
            .users
            .resolve(self.requester.as_str())
            .unwrap_or(self.requester.as_str())
            .to_string()
    }

    /// Members listening along: the requester plus everyone in `with`, each
    /// given as a member name, a chat handle or `@handle`.
    pub(crate) fn listening_members(&self, with: &[String]) -> Vec<String> {
        let mut members = vec![self.member()];
        for name in with {
            let Some(member) = self.member_named(name) else {
                continue;
            };
            if !members.iter().any(|m| m.eq_ignore_ascii_case(&member)) {
                members.push(member);
            }
        }
        members
    }

    /// Member name for a handle or name typed by the requester; unknown
    /// names are kept as given.
    pub(crate) fn member_named(&self, name: &str) -> Option<String> {
        let name = name.trim().trim_start_matches('@');
        if name.is_empty() {
            return None;
        }
        let users = &self.config.users;
        Some(users.resolve(name).or_else(|| users.member(name)).unwrap_or(name).to_string())
    }

    pub(crate) fn matcher(&self) -> Result<CatalogMatcher<DiscogsClient>, CliError> {
        let creds = DiscogsCredentials::from_settings(&self.config.discogs)?;
        Ok(CatalogMatcher::new(DiscogsClient::new(creds)?).with_thresholds(self.config.matching))
    }

    pub(crate) fn spotify(&self) -> Result<SpotifyClient, CliError> {
        let creds = SpotifyCredentials::from_settings(&self.config.spotify)?;
        Ok(SpotifyClient::new(creds)?)
    }

    /// Open a session on the terminal and block until it closes.
    pub(crate) async fn run_session<T: SessionItem>(&self, request: SessionRequest<T>) -> Result<(), CliError> {
        let controller = SessionController::new(
            Arc::new(SessionStore::new()),
            Arc::new(TerminalTransport::new()),
            self.config.session.page_size,
        );
        let surface = controller.start(COMMAND_SURFACE, request).await?;
        drive(&controller, surface, &self.requester).await
    }
}

/// Store ids of `members`. Names that aren't collection members are skipped.
pub(crate) fn listener_ids(db: &Db, members: &[String]) -> Result<Vec<i64>, CliError> {
    let conn = lock(db);
    let mut ids = Vec::new();
    for member in members {
        match find_user_by_name(&conn, member)? {
            Some(user) if !ids.contains(&user.id) => ids.push(user.id),
            Some(_) => {}
            None => log::warn!("{} is not a collection member; not logged as a listener", member),
        }
    }
    Ok(ids)
}

/// An album named on the command line. Spotify links also carry the
/// release details they resolved to.
#[derive(Debug)]
pub(crate) struct AlbumTarget {
    pub query: CatalogQuery,
    pub release: Option<ReleaseSummary>,
}

/// Resolve `"Artist - Album"` or a Spotify link to an album.
pub(crate) async fn album_target(ctx: &Context, words: &[String]) -> Result<AlbumTarget, CliError> {
    let text = words.join(" ");
    match LookupQuery::parse(&text) {
        LookupQuery::Spotify(url) => {
            let spotify = ctx.spotify()?;
            with_spinner("Looking up the Spotify link", target_from_link(&spotify, &url)).await
        }
        LookupQuery::Pair(query) => Ok(AlbumTarget { query, release: None }),
        LookupQuery::Search(_) => Err(CliError::usage(format!(
            "Expected \"Artist - Album\" or a Spotify link, got \"{}\"",
            text.trim()
        ))),
    }
}

pub(crate) async fn target_from_link<S: ReleaseSource>(source: &S, url: &SpotifyUrl) -> Result<AlbumTarget, CliError> {
    let release = source.lookup_release(url).await?;
    Ok(AlbumTarget {
        query: CatalogQuery::new(release.artists.as_str(), release.title.as_str()),
        release: Some(release),
    })
}

/// How a lookup matched records in the collection.
#[derive(Debug)]
pub(crate) enum RecordMatch {
    Nothing(String),
    One(Vinyl),
    /// At most [`MAX_CHOICES`] records, with the term that found them.
    Several(Vec<Vinyl>, String),
}

/// An exact artist/album match, or else a search on the album title.
pub(crate) fn match_pair(conn: &Connection, query: &CatalogQuery) -> Result<RecordMatch, CliError> {
    match find_vinyl(conn, &query.artist, &query.album)? {
        Some(vinyl) => Ok(RecordMatch::One(vinyl)),
        None => match_term(conn, &query.album),
    }
}

/// Records whose artist or album contains `term`.
pub(crate) fn match_term(conn: &Connection, term: &str) -> Result<RecordMatch, CliError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(CliError::usage("Tell me which record"));
    }
    let mut matches = search_vinyls(conn, term)?;
    Ok(match matches.len() {
        0 => RecordMatch::Nothing(term.to_string()),
        1 => RecordMatch::One(matches.remove(0)),
        n => {
            if n > MAX_CHOICES {
                log::info!("{} records match \"{}\"; offering the first {}", n, term, MAX_CHOICES);
                matches.truncate(MAX_CHOICES);
            }
            RecordMatch::Several(matches, term.to_string())
        }
    })
}

/// Match free-form lookup text against the collection. Spotify links are
/// resolved to their release first.
pub(crate) async fn match_records(ctx: &Context, words: &[String]) -> Result<RecordMatch, CliError> {
    let text = words.join(" ");
    let query = match LookupQuery::parse(&text) {
        LookupQuery::Spotify(_) => album_target(ctx, words).await?.query,
        LookupQuery::Pair(query) => query,
        LookupQuery::Search(term) => return match_term(&ctx.conn(), &term),
    };
    match_pair(&ctx.conn(), &query)
}

/// Parse `"Artist - Album"` from positional words.
pub(crate) fn parse_pair(words: &[String]) -> Result<CatalogQuery, CliError> {
    let text = words.join(" ");
    CatalogQuery::parse_pair(&text)
        .ok_or_else(|| CliError::usage(format!("Expected \"Artist - Album\", got \"{}\"", text.trim())))
}

/// Report a duplicate as a normal outcome; pass other errors through.
pub(crate) fn report_duplicate<T>(result: Result<T, OperationError>, what: &str) -> Result<Option<T>, CliError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_duplicate() => {
            println!(
                "{} {} already exists",
                "!".if_supports_color(Stdout, |t| t.yellow()),
                what
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn success(message: impl std::fmt::Display) {
    println!("{} {}", "✓".if_supports_color(Stdout, |t| t.green()), message);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate_digger_db::{insert_user, insert_vinyl, open_memory};

    /// A context over an in-memory collection with members Dan and Morgan.
    /// `config` is TOML, e.g. a `[users]` table of handles.
    pub(crate) fn context(config: &str, requester: &str) -> Context {
        let conn = open_memory().unwrap();
        insert_user(&conn, "Dan").unwrap();
        insert_user(&conn, "Morgan").unwrap();
        Context {
            config: AppConfig::from_toml_str(config, |_| None).unwrap(),
            db: Arc::new(Mutex::new(conn)),
            requester: ActorId::new(requester),
        }
    }

    pub(crate) fn add_records(ctx: &Context, records: &[(&str, &str)]) {
        let conn = ctx.conn();
        for (artist, album) in records {
            insert_vinyl(&conn, &Vinyl::new(*artist, *album)).unwrap();
        }
    }
}

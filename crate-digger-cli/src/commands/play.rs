use chrono::Utc;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate_digger_core::LookupQuery;
use crate_digger_core::records::{PlayLog, Vinyl};
use crate_digger_db::{OperationError, log_play};
use crate_digger_session::{Presentation, SessionKind, SessionRequest, TerminalReason};

use crate::commands::random::record_play;
use crate::commands::{Context, RecordMatch, listener_ids, match_pair, match_term, success};
use crate::error::CliError;
use crate::spinner::with_spinner;

/// Log a play from a Spotify link, an exact "Artist - Album", or a search,
/// for the requester and everyone in `with`.
pub(crate) async fn run_play(ctx: &Context, words: &[String], with: &[String]) -> Result<(), CliError> {
    let members = ctx.listening_members(with);
    let found = match LookupQuery::parse(&words.join(" ")) {
        LookupQuery::Spotify(url) => {
            let spotify = ctx.spotify()?;
            let release = with_spinner("Looking up the Spotify link", spotify.lookup_release(&url)).await?;
            return log_lookup(ctx, &release.artists, &release.title, &members);
        }
        LookupQuery::Pair(query) => match_pair(&ctx.conn(), &query)?,
        LookupQuery::Search(term) => match_term(&ctx.conn(), &term)?,
    };

    match found {
        RecordMatch::Nothing(term) => {
            println!("Nothing in the collection matches \"{term}\".");
            Ok(())
        }
        RecordMatch::One(vinyl) => {
            success(record_play(&ctx.db, &members, &vinyl));
            Ok(())
        }
        RecordMatch::Several(matches, term) => ctx.run_session(choice_request(ctx, matches, &term, members)).await,
    }
}

/// A menu of `matches`; picking one logs a play of it.
fn choice_request(ctx: &Context, matches: Vec<Vinyl>, term: &str, members: Vec<String>) -> SessionRequest<Vinyl> {
    let db = ctx.db.clone();
    SessionRequest::new(
        SessionKind::SingleChoice,
        matches,
        ctx.requester.clone(),
        ctx.config.session.choice_ttl,
    )
    .presentation(
        Presentation::new("Which one are you playing?")
            .with_prompt(format!("Several records match \"{term}\".")),
    )
    .on_terminal(move |end| async move {
        match (end.reason, end.item) {
            (TerminalReason::Selected, Some(vinyl)) => {
                let note = record_play(&db, &members, &vinyl);
                Some(format!("{} - {}\n{}", vinyl.artist, vinyl.album, note))
            }
            _ => None,
        }
    })
}

/// Log a play for a release identified outside the collection.
fn log_lookup(ctx: &Context, artist: &str, album: &str, members: &[String]) -> Result<(), CliError> {
    let play = PlayLog {
        artist: artist.to_string(),
        album: album.to_string(),
        listeners: listener_ids(&ctx.db, members)?,
        played_at: Utc::now(),
    };
    match log_play(&ctx.conn(), &play) {
        Ok(_) => {
            success(format!("Logged a play of {artist} - {album} for {}", members.join(", ")));
            Ok(())
        }
        Err(OperationError::NotFound { .. }) => {
            println!(
                "{} - {} {}",
                artist,
                album,
                "isn't in the collection".if_supports_color(Stdout, |t| t.yellow())
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

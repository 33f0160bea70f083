use crate_digger_core::LookupQuery;
use crate_digger_core::records::WantItem;
use crate_digger_db::{WantStatus, add_want, find_user_by_name};

use crate::commands::{Context, success};
use crate::error::CliError;
use crate::spinner::with_spinner;

/// Add a release to the want list by Spotify link or "Artist - Album".
pub(crate) async fn run_want_add(ctx: &Context, query: &str, notes: &[String]) -> Result<(), CliError> {
    let spotify = ctx.spotify()?;
    let url = match LookupQuery::parse(query) {
        LookupQuery::Spotify(url) => url,
        LookupQuery::Pair(pair) => {
            let found = with_spinner(
                format!("Searching Spotify for {pair}"),
                spotify.find_album(&pair.artist, &pair.album),
            )
            .await?;
            match found {
                Some(url) => url,
                None => {
                    println!("Spotify has no album matching {pair}.");
                    return Ok(());
                }
            }
        }
        LookupQuery::Search(_) => {
            return Err(CliError::usage("Expected a Spotify link or \"Artist - Album\""));
        }
    };
    let release = with_spinner("Looking up the release", spotify.lookup_release(&url)).await?;

    let member = ctx.member();
    let searchers = match find_user_by_name(&ctx.conn(), &member)? {
        Some(user) => vec![user.name],
        None => {
            log::warn!("{} is not a collection member; adding without a searcher", member);
            Vec::new()
        }
    };
    let notes = notes.join(" ");
    let item = WantItem {
        id: 0,
        artist: release.artists,
        album: release.title,
        image_url: release.artwork_url,
        notes: (!notes.is_empty()).then_some(notes),
        searchers,
    };

    match add_want(&ctx.conn(), &item)? {
        WantStatus::Added => success(format!("Added {} - {} to the want list", item.artist, item.album)),
        WantStatus::Duplicate => println!("{} - {} is already on the want list", item.artist, item.album),
    }
    Ok(())
}

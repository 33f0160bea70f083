use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate_digger_core::CatalogQuery;

use crate::commands::{AlbumTarget, Context, album_target, success};
use crate::error::CliError;
use crate::spinner::with_spinner;

/// Check the catalog for a non-promotional vinyl pressing of an album named
/// by "Artist - Album", a Spotify link, or the flags.
pub(crate) async fn run_check(
    ctx: &Context,
    words: &[String],
    artist: Option<String>,
    album: Option<String>,
) -> Result<(), CliError> {
    let target = match (artist, album) {
        (Some(artist), Some(album)) => AlbumTarget {
            query: CatalogQuery::new(artist, album),
            release: None,
        },
        _ => album_target(ctx, words).await?,
    };
    let query = &target.query;
    let matcher = ctx.matcher()?;

    let found = with_spinner(format!("Searching the catalog for {query}"), matcher.resolve_query(query)).await?;
    if let Some(date) = target.release.as_ref().and_then(|r| r.release_date.as_deref()) {
        println!("  Released: {date}");
    }
    match found {
        Some(m) => {
            success(format!(
                "{} exists on vinyl",
                query.if_supports_color(Stdout, |t| t.bold())
            ));
            println!(
                "  Master:  {} (#{}, score {:.2})",
                m.candidate.raw_title, m.candidate.external_id, m.candidate.similarity_score
            );
            println!("  Pressing: {} [{}]", m.variant.title, m.variant.format_label);
        }
        None => {
            println!(
                "{} No vinyl pressing found for {}",
                "✗".if_supports_color(Stdout, |t| t.red()),
                query.if_supports_color(Stdout, |t| t.bold())
            );
        }
    }
    Ok(())
}

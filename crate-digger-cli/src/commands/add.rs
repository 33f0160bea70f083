use chrono::NaiveDate;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate_digger_core::records::Vinyl;
use crate_digger_db::{add_like, find_user_by_name, find_vinyl, insert_vinyl};

use crate::commands::{AlbumTarget, Context, album_target, parse_pair, report_duplicate, success};
use crate::error::CliError;
use crate::spinner::with_spinner;

/// Purchase details given on the command line.
#[derive(Debug, Default)]
pub(crate) struct Purchase {
    pub store: Option<String>,
    pub date: Option<NaiveDate>,
    pub double_lp: bool,
}

/// Add a record owned by the requester, optionally only if the catalog
/// confirms a vinyl pressing exists.
pub(crate) async fn run_add(
    ctx: &Context,
    words: &[String],
    purchase: Purchase,
    verify: bool,
) -> Result<(), CliError> {
    let target = album_target(ctx, words).await?;
    let query = &target.query;

    if verify {
        let matcher = ctx.matcher()?;
        let exists = with_spinner(
            format!("Checking the catalog for {query}"),
            matcher.exists(&query.artist, &query.album),
        )
        .await?;
        if !exists {
            println!(
                "{} No vinyl pressing of {} found; not added",
                "✗".if_supports_color(Stdout, |t| t.red()),
                query
            );
            return Ok(());
        }
    }

    let member = ctx.member();
    let conn = ctx.conn();
    let owners = match find_user_by_name(&conn, &member)? {
        Some(user) => vec![user.name],
        None => {
            log::warn!("{} is not a collection member; adding without an owner", member);
            Vec::new()
        }
    };
    let vinyl = new_vinyl(&target, owners, purchase);

    if let Some(id) = report_duplicate(insert_vinyl(&conn, &vinyl), &query.to_string())? {
        success(format!("Added {query} (#{id})"));
    }
    Ok(())
}

/// The record to insert. Artwork comes from the Spotify release, if any.
fn new_vinyl(target: &AlbumTarget, owners: Vec<String>, purchase: Purchase) -> Vinyl {
    Vinyl {
        date_purchased: purchase.date,
        purchase_location: purchase.store,
        double_lp: purchase.double_lp,
        image_url: target.release.as_ref().and_then(|r| r.artwork_url.clone()),
        owners,
        ..Vinyl::new(target.query.artist.as_str(), target.query.album.as_str())
    }
}

/// Mark a record as liked by the requester.
pub(crate) fn run_like(ctx: &Context, words: &[String]) -> Result<(), CliError> {
    let query = parse_pair(words)?;
    let conn = ctx.conn();

    let Some(vinyl) = find_vinyl(&conn, &query.artist, &query.album)? else {
        println!("{query} isn't in the collection");
        return Ok(());
    };
    let member = ctx.member();
    let Some(user) = find_user_by_name(&conn, &member)? else {
        return Err(CliError::usage(format!("{member} is not a collection member")));
    };

    add_like(&conn, vinyl.id, user.id)?;
    success(format!("{} likes {} - {}", user.name, vinyl.artist, vinyl.album));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate_digger_core::CatalogQuery;
    use crate_digger_spotify::ReleaseSummary;

    #[test]
    fn test_linked_release_supplies_artwork() {
        let target = AlbumTarget {
            query: CatalogQuery::new("Burial", "Untrue"),
            release: Some(ReleaseSummary {
                artists: "Burial".to_string(),
                title: "Untrue".to_string(),
                artwork_url: Some("https://i.scdn.co/image/untrue".to_string()),
                release_date: None,
                track_count: Some(13),
            }),
        };
        let purchase = Purchase {
            store: Some("Rough Trade".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 2, 3),
            double_lp: true,
        };

        let vinyl = new_vinyl(&target, vec!["Dan".to_string()], purchase);
        assert_eq!(vinyl.artist, "Burial");
        assert_eq!(vinyl.album, "Untrue");
        assert_eq!(vinyl.image_url.as_deref(), Some("https://i.scdn.co/image/untrue"));
        assert_eq!(vinyl.purchase_location.as_deref(), Some("Rough Trade"));
        assert_eq!(vinyl.date_purchased, NaiveDate::from_ymd_opt(2024, 2, 3));
        assert!(vinyl.double_lp);
        assert_eq!(vinyl.owners, vec!["Dan"]);
    }

    #[test]
    fn test_pair_has_no_artwork() {
        let target = AlbumTarget {
            query: CatalogQuery::new("Burial", "Untrue"),
            release: None,
        };
        let vinyl = new_vinyl(&target, Vec::new(), Purchase::default());
        assert_eq!(vinyl.image_url, None);
        assert_eq!(vinyl.purchase_location, None);
        assert!(!vinyl.double_lp);
    }
}

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate_digger_core::ListScope;
use crate_digger_db::{RankedCount, artist_album_counts, collection_stats, location_purchase_counts, play_counts};

use crate::commands::Context;
use crate::error::CliError;

/// Artists with the most albums, overall or among a member's records.
pub(crate) fn run_top(ctx: &Context, member: Option<&str>, limit: usize) -> Result<(), CliError> {
    let member = member.and_then(|m| ctx.member_named(m));
    let rows = artist_album_counts(&ctx.conn(), member.as_deref(), limit)?;
    let title = match &member {
        Some(name) => format!("Top Artists by Album Count for {name}"),
        None => "Top Artists by Album Count".to_string(),
    };
    print_ranking(&title, &rows, ("album", "albums"), "No records yet.");
    Ok(())
}

/// Most-played records: overall, for a member, or matching a search.
pub(crate) fn run_top_plays(ctx: &Context, args: &[String], limit: usize) -> Result<(), CliError> {
    let scope = ListScope::parse(&args.join(" "), &ctx.config.users);
    let rows = play_counts(&ctx.conn(), &scope, limit)?;
    let title = match &scope {
        ListScope::Full => "Top Albums by Play Count".to_string(),
        ListScope::Member(name) => format!("Top Albums by Play Count for {name}"),
        ListScope::Search(term) => format!("Top Albums by Play Count matching \"{term}\""),
    };
    print_ranking(&title, &rows, ("play", "plays"), "Nothing has been played yet.");
    Ok(())
}

/// Stores the most records were bought at.
pub(crate) fn run_top_locations(ctx: &Context, member: Option<&str>, limit: usize) -> Result<(), CliError> {
    let member = member.and_then(|m| ctx.member_named(m));
    let rows = location_purchase_counts(&ctx.conn(), member.as_deref(), limit)?;
    let title = match &member {
        Some(name) => format!("Top Locations by Purchase Count for {name}"),
        None => "Top Locations by Purchase Count".to_string(),
    };
    print_ranking(&title, &rows, ("purchase", "purchases"), "No purchase locations recorded yet.");
    Ok(())
}

fn print_ranking(title: &str, rows: &[RankedCount], unit: (&str, &str), empty: &str) {
    if rows.is_empty() {
        println!("{empty}");
        return;
    }
    println!("{}", title.if_supports_color(Stdout, |t| t.bold()));
    for (i, row) in rows.iter().enumerate() {
        println!("{}", ranking_line(i + 1, row, unit));
    }
}

fn ranking_line(rank: usize, row: &RankedCount, (one, many): (&str, &str)) -> String {
    let noun = if row.count == 1 { one } else { many };
    format!(
        "{:>3}. {} {}",
        rank,
        row.title,
        format!("({} {noun})", row.count).if_supports_color(Stdout, |t| t.dimmed())
    )
}

pub(crate) fn run_stats(ctx: &Context) -> Result<(), CliError> {
    let stats = collection_stats(&ctx.conn())?;
    println!("{}", "Collection".if_supports_color(Stdout, |t| t.bold()));
    println!("  Members:   {}", stats.users);
    println!("  Records:   {}", stats.vinyls);
    println!("  Plays:     {}", stats.plays);
    println!("  Wanted:    {}", stats.wants);
    println!("  Stores:    {}", stats.locations);
    Ok(())
}

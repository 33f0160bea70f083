use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate_digger_core::records::Vinyl;
use crate_digger_session::{Presentation, SessionKind, SessionRequest, TerminalReason};

use crate::commands::{Context, RecordMatch, match_records};
use crate::error::CliError;

/// Show a record's details, through a menu when several records match.
pub(crate) async fn run_info(ctx: &Context, words: &[String]) -> Result<(), CliError> {
    match match_records(ctx, words).await? {
        RecordMatch::Nothing(term) => {
            println!("No matching records found for \"{term}\".");
            Ok(())
        }
        RecordMatch::One(vinyl) => {
            println!(
                "{}\n{}",
                format!("{} - {}", vinyl.artist, vinyl.album).if_supports_color(Stdout, |t| t.bold()),
                record_details(&vinyl)
            );
            Ok(())
        }
        RecordMatch::Several(matches, term) => ctx.run_session(details_request(ctx, matches, &term)).await,
    }
}

fn details_request(ctx: &Context, matches: Vec<Vinyl>, term: &str) -> SessionRequest<Vinyl> {
    SessionRequest::new(
        SessionKind::SingleChoice,
        matches,
        ctx.requester.clone(),
        ctx.config.session.choice_ttl,
    )
    .presentation(
        Presentation::new("Which record?").with_prompt(format!("Several records match \"{term}\".")),
    )
    .on_terminal(|end| async move {
        match (end.reason, end.item) {
            (TerminalReason::Selected, Some(vinyl)) => Some(format!(
                "{} - {}\n{}",
                vinyl.artist,
                vinyl.album,
                record_details(&vinyl)
            )),
            _ => None,
        }
    })
}

/// Purchase, play and format details, one field per line.
pub(crate) fn record_details(vinyl: &Vinyl) -> String {
    let purchased = match (vinyl.date_purchased, vinyl.purchase_location.as_deref()) {
        (Some(date), Some(store)) => format!("{date} @ {store}"),
        (Some(date), None) => date.to_string(),
        (None, Some(store)) => format!("@ {store}"),
        (None, None) => "Unknown".to_string(),
    };
    let mut lines = vec![format!("  Purchased:  {purchased}")];
    if let Some(price) = vinyl.price {
        lines.push(format!("  Price:      {price:.2}"));
    }
    lines.push(format!("  Play count: {}", vinyl.play_count));
    lines.push(match vinyl.length {
        Some(minutes) => format!("  Length:     {minutes} min"),
        None => "  Length:     Unknown".to_string(),
    });
    if !vinyl.owners.is_empty() {
        lines.push(format!("  Owners:     {}", vinyl.owners.join(", ")));
    }
    if !vinyl.liked_by.is_empty() {
        lines.push(format!("  Liked by:   {}", vinyl.liked_by.join(", ")));
    }
    let notes = vinyl.notes.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or("-");
    lines.push(format!("  Notes:      {notes}"));
    lines.push(format!("  {}", if vinyl.double_lp { "Double LP" } else { "Single LP" }));
    lines.join("\n")
}

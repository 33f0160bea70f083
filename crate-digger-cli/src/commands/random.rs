use chrono::Utc;
use rusqlite::Connection;

use crate_digger_core::ListScope;
use crate_digger_core::records::{PlayLog, Vinyl};
use crate_digger_db::{all_vinyls, log_play, physical_locations, search_vinyls, vinyls_liked_by};
use crate_digger_session::{Presentation, SessionKind, SessionRequest, TerminalReason};

use crate::commands::{Context, Db, listener_ids, lock};
use crate::error::CliError;

/// Records to pick from: everything, a member's likes, or a search.
fn random_pool(conn: &Connection, scope: &ListScope) -> Result<(Vec<Vinyl>, String), CliError> {
    Ok(match scope {
        ListScope::Full => (all_vinyls(conn)?, "Random Pick".to_string()),
        ListScope::Member(name) => (vinyls_liked_by(conn, name)?, format!("Random Pick from {name}'s Likes")),
        ListScope::Search(term) => (search_vinyls(conn, term)?, format!("Random Pick matching \"{term}\"")),
    })
}

/// Reroll through the collection, a member's likes or a search; "play"
/// logs it for everyone listening.
pub(crate) async fn run_random(ctx: &Context, args: &[String], with: &[String]) -> Result<(), CliError> {
    let scope = ListScope::parse(&args.join(" "), &ctx.config.users);
    let (vinyls, title) = random_pool(&ctx.conn(), &scope)?;
    if vinyls.is_empty() {
        println!("No records to pick from.");
        return Ok(());
    }

    let db = ctx.db.clone();
    let members = ctx.listening_members(with);
    let request = SessionRequest::new(
        SessionKind::RerollPick,
        vinyls,
        ctx.requester.clone(),
        ctx.config.session.list_ttl,
    )
    .presentation(Presentation::new(title).with_commit("Play"))
    .on_terminal(move |end| async move {
        match (end.reason, end.item) {
            (TerminalReason::Committed, Some(vinyl)) => Some(record_play(&db, &members, &vinyl)),
            _ => None,
        }
    });
    ctx.run_session(request).await
}

/// Log a play of `vinyl` with `members` listening and describe the outcome.
pub(crate) fn record_play(db: &Db, members: &[String], vinyl: &Vinyl) -> String {
    let play = match listener_ids(db, members) {
        Ok(listeners) => PlayLog {
            artist: vinyl.artist.clone(),
            album: vinyl.album.clone(),
            listeners,
            played_at: Utc::now(),
        },
        Err(e) => return format!("Could not log the play: {e}"),
    };
    match log_play(&lock(db), &play) {
        Ok(_) => format!(
            "Logged a play for {} ({} total)",
            members.join(", "),
            vinyl.play_count + 1
        ),
        Err(e) => {
            log::error!("Failed to log play of {} - {}: {}", vinyl.artist, vinyl.album, e);
            format!("Could not log the play: {e}")
        }
    }
}

/// Reroll through the physical record stores.
pub(crate) async fn run_random_store(ctx: &Context) -> Result<(), CliError> {
    let stores = physical_locations(&ctx.conn())?;
    if stores.is_empty() {
        println!("No record stores yet; add one with `location add`.");
        return Ok(());
    }

    let request = SessionRequest::new(
        SessionKind::RerollPick,
        stores,
        ctx.requester.clone(),
        ctx.config.session.list_ttl,
    )
    .presentation(Presentation::new("Random Record Store"));
    ctx.run_session(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{add_records, context};
    use crate_digger_db::{add_like, find_user_by_name, find_vinyl};

    fn members(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn listener_count(db: &Db) -> i64 {
        lock(db)
            .query_row("SELECT COUNT(*) FROM play_listeners", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_record_play_logs_for_member() {
        let ctx = context("", "dan");
        add_records(&ctx, &[("Radiohead", "OK Computer")]);
        let vinyl = find_vinyl(&ctx.conn(), "Radiohead", "OK Computer").unwrap().unwrap();

        let note = record_play(&ctx.db, &members(&["Dan"]), &vinyl);
        assert_eq!(note, "Logged a play for Dan (1 total)");
        let stored = find_vinyl(&ctx.conn(), "Radiohead", "OK Computer").unwrap().unwrap();
        assert_eq!(stored.play_count, 1);
        assert_eq!(listener_count(&ctx.db), 1);
    }

    #[test]
    fn test_record_play_logs_every_listener() {
        let ctx = context("", "dan");
        add_records(&ctx, &[("Portishead", "Dummy")]);
        let vinyl = find_vinyl(&ctx.conn(), "Portishead", "Dummy").unwrap().unwrap();

        let note = record_play(&ctx.db, &members(&["Dan", "Morgan", "Alex"]), &vinyl);
        assert_eq!(note, "Logged a play for Dan, Morgan, Alex (1 total)");
        assert_eq!(listener_count(&ctx.db), 2);
    }

    #[test]
    fn test_record_play_for_missing_album_reports_failure() {
        let ctx = context("", "dan");
        let note = record_play(&ctx.db, &members(&["Dan"]), &Vinyl::new("Radiohead", "Kid A"));
        assert!(note.starts_with("Could not log the play"));
    }

    #[test]
    fn test_random_pool_follows_scope() {
        let ctx = context("[users]\ndiscodan = \"Dan\"\n", "discodan");
        add_records(
            &ctx,
            &[("Radiohead", "Kid A"), ("Radiohead", "OK Computer"), ("Portishead", "Dummy")],
        );
        {
            let conn = ctx.conn();
            let dummy = find_vinyl(&conn, "Portishead", "Dummy").unwrap().unwrap();
            let dan = find_user_by_name(&conn, "Dan").unwrap().unwrap();
            add_like(&conn, dummy.id, dan.id).unwrap();
        }
        let pool = |args: &str| {
            let scope = ListScope::parse(args, &ctx.config.users);
            let (vinyls, title) = random_pool(&ctx.conn(), &scope).unwrap();
            (vinyls.into_iter().map(|v| v.album).collect::<Vec<_>>(), title)
        };

        assert_eq!(pool("").0.len(), 3);
        assert_eq!(pool("dan"), (vec!["Dummy".to_string()], "Random Pick from Dan's Likes".to_string()));
        assert_eq!(
            pool("radiohead"),
            (
                vec!["Kid A".to_string(), "OK Computer".to_string()],
                "Random Pick matching \"radiohead\"".to_string()
            )
        );
        assert!(pool("beatles").0.is_empty());
    }
}

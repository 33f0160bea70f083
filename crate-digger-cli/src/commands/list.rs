use crate_digger_core::ListScope;
use crate_digger_db::{vinyls_in_scope, want_list};
use crate_digger_session::{Presentation, SessionKind, SessionRequest};

use crate::commands::Context;
use crate::error::CliError;

fn scope_title(scope: &ListScope, full: &str, member_suffix: &str) -> String {
    match scope {
        ListScope::Full => full.to_string(),
        ListScope::Member(name) => format!("{name}'s {member_suffix}"),
        ListScope::Search(term) => format!("{full} matching \"{term}\""),
    }
}

/// Page through the collection, one member's records, or a search.
pub(crate) async fn run_list(ctx: &Context, args: &[String]) -> Result<(), CliError> {
    let scope = ListScope::parse(&args.join(" "), &ctx.config.users);
    let vinyls = vinyls_in_scope(&ctx.conn(), &scope)?;
    if vinyls.is_empty() {
        println!("No records found.");
        return Ok(());
    }
    log::debug!("Listing {} record(s) for {:?}", vinyls.len(), scope);

    let request = SessionRequest::new(
        SessionKind::PaginatedList,
        vinyls,
        ctx.requester.clone(),
        ctx.config.session.list_ttl,
    )
    .presentation(Presentation::new(scope_title(&scope, "The Collection", "Records")));
    ctx.run_session(request).await
}

/// Page through the want list, one member's searches, or a search.
pub(crate) async fn run_want_list(ctx: &Context, args: &[String]) -> Result<(), CliError> {
    let scope = ListScope::parse(&args.join(" "), &ctx.config.users);
    let items = want_list(&ctx.conn(), &scope)?;
    if items.is_empty() {
        println!("The want list is empty.");
        return Ok(());
    }

    let request = SessionRequest::new(
        SessionKind::PaginatedList,
        items,
        ctx.requester.clone(),
        ctx.config.session.list_ttl,
    )
    .presentation(Presentation::new(scope_title(&scope, "Want List", "Want List")));
    ctx.run_session(request).await
}

use crate_digger_core::records::Location;
use crate_digger_db::{insert_location, insert_user, list_users};

use crate::commands::{Context, report_duplicate, success};
use crate::error::CliError;

pub(crate) fn run_user_add(ctx: &Context, name: &str) -> Result<(), CliError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::usage("Member name cannot be empty"));
    }
    if let Some(user) = report_duplicate(insert_user(&ctx.conn(), name), &format!("Member {name}"))? {
        success(format!("Added member {} (#{})", user.name, user.id));
    }
    Ok(())
}

pub(crate) fn run_user_list(ctx: &Context) -> Result<(), CliError> {
    let users = list_users(&ctx.conn())?;
    if users.is_empty() {
        println!("No members yet; add one with `user add`.");
    }
    for user in users {
        println!("  {}", user.name);
    }
    Ok(())
}

pub(crate) fn run_location_add(
    ctx: &Context,
    name: &str,
    address: Option<String>,
    online: bool,
) -> Result<(), CliError> {
    let location = Location {
        id: 0,
        name: name.trim().to_string(),
        address,
        physical: !online,
    };
    if let Some(id) = report_duplicate(insert_location(&ctx.conn(), &location), &format!("Store {}", location.name))? {
        success(format!("Added store {} (#{id})", location.name));
    }
    Ok(())
}

//! crate-digger CLI
//!
//! Terminal front end for a shared vinyl collection: browse and search the
//! collection, check the catalog for vinyl pressings, pick something to play
//! and log plays.

mod cli_types;
mod commands;
mod error;
mod spinner;
mod terminal;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate_digger_core::AppConfig;
use crate_digger_session::ActorId;

use cli_types::{Cli, Commands, ConfigAction, LocationAction, TopRanking, UserAction, WantAction};
use commands::Context;
use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".if_supports_color(Stderr, |t| t.red()), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load()?;

    if let Commands::Config { action } = &cli.command {
        match action {
            ConfigAction::Show => commands::config::run_config_show(&config, cli.db.as_deref()),
            ConfigAction::Path => commands::config::run_config_path(),
        }
        return Ok(());
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path.clone());
    let requester = cli
        .requester
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "me".to_string());
    let ctx = Context::open(config, &db_path, ActorId::new(requester))?;
    log::debug!("Acting as {} ({}) on {}", ctx.requester, ctx.member(), db_path.display());

    let rt = tokio::runtime::Runtime::new().map_err(|e| CliError::runtime(e.to_string()))?;
    let result = rt.block_on(dispatch(&ctx, cli.command));
    // A pending stdin read cannot be cancelled; don't wait for it.
    rt.shutdown_background();
    result
}

async fn dispatch(ctx: &Context, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Check { query, artist, album } => commands::check::run_check(ctx, &query, artist, album).await,
        Commands::List { args } => commands::list::run_list(ctx, &args).await,
        Commands::Want { action } => match action {
            WantAction::List { args } => commands::list::run_want_list(ctx, &args).await,
            WantAction::Add { query, notes } => commands::want::run_want_add(ctx, &query, &notes).await,
        },
        Commands::Random { args, with } => commands::random::run_random(ctx, &args, &with).await,
        Commands::RandomStore => commands::random::run_random_store(ctx).await,
        Commands::Play { query, with } => commands::play::run_play(ctx, &query, &with).await,
        Commands::Info { query } => commands::info::run_info(ctx, &query).await,
        Commands::Add {
            query,
            verify,
            bought_at,
            bought_on,
            double_lp,
        } => {
            let purchase = commands::add::Purchase {
                store: bought_at,
                date: bought_on,
                double_lp,
            };
            commands::add::run_add(ctx, &query, purchase, verify).await
        }
        Commands::Like { query } => commands::add::run_like(ctx, &query),
        Commands::Top { ranking, member, limit } => match ranking {
            None => commands::top::run_top(ctx, member.as_deref(), limit),
            Some(TopRanking::Plays { args, limit }) => commands::top::run_top_plays(ctx, &args, limit),
            Some(TopRanking::Locations { member, limit }) => {
                commands::top::run_top_locations(ctx, member.as_deref(), limit)
            }
        },
        Commands::Stats => commands::top::run_stats(ctx),
        Commands::User { action } => match action {
            UserAction::Add { name } => commands::seed::run_user_add(ctx, &name),
            UserAction::List => commands::seed::run_user_list(ctx),
        },
        Commands::Location { action } => match action {
            LocationAction::Add { name, address, online } => {
                commands::seed::run_location_add(ctx, &name, address, online)
            }
        },
        Commands::Config { .. } => Ok(()),
    }
}

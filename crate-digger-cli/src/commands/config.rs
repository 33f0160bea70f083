use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate_digger_core::{AppConfig, ValueSource, config_path};

fn mask_value(s: &str) -> String {
    match s.char_indices().nth(2) {
        Some((end, _)) => format!("{}****", &s[..end]),
        None => "****".to_string(),
    }
}

/// Show current settings and their sources.
pub(crate) fn run_config_show(config: &AppConfig, db_override: Option<&Path>) {
    println!("{}", "crate-digger Configuration".if_supports_color(Stdout, |t| t.bold()));
    println!();

    match config_path() {
        Some(p) if p.exists() => println!(
            "  Config file: {} {}",
            p.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        ),
        Some(p) => println!(
            "  Config file: {} {}",
            p.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        ),
        None => println!(
            "  Config file: {}",
            "could not determine path".if_supports_color(Stdout, |t| t.red()),
        ),
    }
    println!();

    let database = match db_override {
        Some(path) => (path.display().to_string(), "--db flag".to_string()),
        None => (
            config.database_path.display().to_string(),
            config.source("database.path").to_string(),
        ),
    };
    let fields: [(&str, Option<String>, bool); 5] = [
        ("discogs.key", config.discogs.key.clone(), false),
        ("discogs.secret", config.discogs.secret.clone(), true),
        ("discogs.user_agent", Some(config.discogs.user_agent.clone()), false),
        ("spotify.client_id", config.spotify.client_id.clone(), false),
        ("spotify.client_secret", config.spotify.client_secret.clone(), true),
    ];

    for (name, value, is_secret) in fields {
        let source_str = format!("({})", config.source(name));
        match value {
            Some(v) => println!(
                "  {} {} {}",
                format!("{name}:").if_supports_color(Stdout, |t| t.cyan()),
                if is_secret { mask_value(&v) } else { v },
                source_str.if_supports_color(Stdout, |t| t.dimmed()),
            ),
            None => println!(
                "  {} {} {}",
                format!("{name}:").if_supports_color(Stdout, |t| t.cyan()),
                "not set".if_supports_color(Stdout, |t| t.yellow()),
                source_str.if_supports_color(Stdout, |t| t.dimmed()),
            ),
        }
    }
    println!(
        "  {} {} {}",
        "database.path:".if_supports_color(Stdout, |t| t.cyan()),
        database.0,
        format!("({})", database.1).if_supports_color(Stdout, |t| t.dimmed()),
    );
    println!();

    let session = &config.session;
    println!(
        "  Sessions: lists {}s, choices {}s, {} per page",
        session.list_ttl.as_secs(),
        session.choice_ttl.as_secs(),
        session.page_size
    );
    println!(
        "  Matching: coarse {:.2}, title {:.2}",
        config.matching.coarse, config.matching.title
    );

    if config.users.is_empty() {
        println!("  Users: {}", "none mapped".if_supports_color(Stdout, |t| t.dimmed()));
    } else {
        println!("  Users:");
        for (handle, member) in config.users.entries() {
            println!("    @{handle} -> {member}");
        }
    }
    if matches!(config.source("discogs.key"), ValueSource::Missing) {
        println!();
        println!(
            "  {}",
            "Set DISCOGS_KEY / DISCOGS_SECRET or add a [discogs] section to enable catalog checks."
                .if_supports_color(Stdout, |t| t.dimmed())
        );
    }
}

/// Print the config file path.
pub(crate) fn run_config_path() {
    match config_path() {
        Some(p) => println!("{}", p.display()),
        None => eprintln!("Could not determine config directory"),
    }
}

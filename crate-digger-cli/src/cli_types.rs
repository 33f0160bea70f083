//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "crate-digger")]
#[command(about = "Browse, check and log plays from a shared vinyl collection", long_about = None)]
pub(crate) struct Cli {
    /// Chat handle to act as (defaults to $USER)
    #[arg(long = "as", global = true, value_name = "HANDLE")]
    pub requester: Option<String>,

    /// Collection database (overrides config and $CRATE_DIGGER_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Check whether a vinyl pressing of an album exists in the catalog
    Check {
        /// Spotify link or "Artist - Album"
        query: Vec<String>,

        #[arg(long, requires = "album")]
        artist: Option<String>,

        #[arg(long, requires = "artist")]
        album: Option<String>,
    },

    /// Browse the collection: everything, one member's records, or a search
    List {
        /// Member name or search term
        args: Vec<String>,
    },

    /// Manage the shared want list
    Want {
        #[command(subcommand)]
        action: WantAction,
    },

    /// Pick a random record: from everything, a member's likes, or a search
    Random {
        /// Member name or search term
        args: Vec<String>,

        /// Also log the play for these members
        #[arg(long = "with", value_name = "MEMBER", value_delimiter = ',')]
        with: Vec<String>,
    },

    /// Pick a random physical record store
    RandomStore,

    /// Log a play from a Spotify link, "Artist - Album" or a search term
    Play {
        query: Vec<String>,

        /// Other members listening along
        #[arg(long = "with", value_name = "MEMBER", value_delimiter = ',')]
        with: Vec<String>,
    },

    /// Show a record's details
    Info {
        /// Spotify link, "Artist - Album" or a search term
        query: Vec<String>,
    },

    /// Add a record to the collection, owned by the requester
    Add {
        /// Spotify link or "Artist - Album"
        query: Vec<String>,

        /// Only add it if the catalog lists a vinyl pressing
        #[arg(long)]
        verify: bool,

        /// Store it was bought at (must be a known location)
        #[arg(long, value_name = "STORE")]
        bought_at: Option<String>,

        /// Purchase date, YYYY-MM-DD
        #[arg(long, value_name = "DATE")]
        bought_on: Option<NaiveDate>,

        #[arg(long)]
        double_lp: bool,
    },

    /// Mark a record as liked by the requester
    Like {
        /// "Artist - Album"
        query: Vec<String>,
    },

    /// Rankings: artists by album count, or plays and locations
    #[command(args_conflicts_with_subcommands = true)]
    Top {
        #[command(subcommand)]
        ranking: Option<TopRanking>,

        /// Only count this member's records
        member: Option<String>,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Row counts across the collection
    Stats,

    /// Manage collection members
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage record stores
    Location {
        #[command(subcommand)]
        action: LocationAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum WantAction {
    /// Browse the want list: everything, one member's searches, or a search
    List {
        args: Vec<String>,
    },

    /// Add an album by Spotify link or "Artist - Album"
    Add {
        query: String,

        /// Free-form notes, e.g. a pressing to look for
        notes: Vec<String>,
    },
}

#[derive(Subcommand)]
pub(crate) enum TopRanking {
    /// Albums by play count: overall, for a member, or matching a search
    Plays {
        /// Member name or search term
        args: Vec<String>,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Record stores by number of purchases
    Locations {
        /// Only count this member's records
        member: Option<String>,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub(crate) enum UserAction {
    /// Add a member
    Add { name: String },

    /// List members
    List,
}

#[derive(Subcommand)]
pub(crate) enum LocationAction {
    /// Add a record store
    Add {
        name: String,

        #[arg(long)]
        address: Option<String>,

        /// The store only sells online
        #[arg(long)]
        online: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current settings and their sources
    Show,

    /// Print the config file path
    Path,
}

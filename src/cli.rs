use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::commands::branch::BranchCommands;
use crate::commands::config::ConfigCommands;
use crate::commands::review::ReviewCommands;
use crate::commands::revision::RevisionCommands;
use crate::commands::user::UserCommands;
use crate::shared::config::CONFIG_FILE_NAME;

#[derive(Parser)]
#[command(
    name = "upsource-cli",
    bin_name = "ups",
    version,
    about,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "UPSOURCE_CONFIG", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Manage upsource.json
    #[command(subcommand)]
    Config(ConfigCommands),

    /// List, create and close reviews
    #[command(subcommand)]
    Review(ReviewCommands),

    /// Project branches
    #[command(subcommand)]
    Branch(BranchCommands),

    /// Project revisions
    #[command(subcommand)]
    Revision(RevisionCommands),

    /// Upsource users
    #[command(subcommand)]
    User(UserCommands),

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "redsona",
    version,
    about = "Evidence-backed persona reports from public social activity"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Analyze a frozen activity JSON file instead of fetching"
    )]
    pub activity_file: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Trait rule table TOML (defaults to the built-in table)"
    )]
    pub rules: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Report output directory (defaults to configuration)"
    )]
    pub out_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Analyze {
        target: String,
        #[arg(long, help = "Maximum posts/comments to fetch per feed")]
        limit: Option<usize>,
    },
    Rules {
        #[command(subcommand)]
        command: RuleCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum RuleCommands {
    List,
    Check,
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shellfolio")]
#[command(version)]
#[command(about = "Server-driven terminal command engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding config.json (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Disable ANSI styling in command output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Caller address, as a forwarded-for header value
    #[arg(long, global = true)]
    pub forwarded_for: Option<String>,

    /// Caller user agent
    #[arg(long, global = true)]
    pub user_agent: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one command and print its output
    #[command(alias = "x")]
    Exec {
        /// Command name
        command: String,

        /// Command arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a raw JSON request body: {"command": ..., "args": [...]}
    Request {
        /// Request body
        body: String,
    },

    /// List active commands
    #[command(alias = "ls")]
    Commands {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Read commands from stdin, one per line
    Repl,
}

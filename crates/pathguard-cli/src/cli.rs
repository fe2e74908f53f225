use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pathguard",
    about = "PathGuard — permission-guarded path access to nested data",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON object whose top-level keys become store fields
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// TOML file declaring permissions and nested stores
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read the value at a colon-delimited path
    Read(ReadArgs),
    /// Write a value at a path and show the resulting store
    Write(WriteArgs),
    /// List every readable top-level field
    Entries,
    /// Show the access level of a top-level field
    Check(CheckArgs),
}

#[derive(Args)]
pub struct ReadArgs {
    /// Path such as `address:city`
    pub path: String,
}

#[derive(Args)]
pub struct WriteArgs {
    /// Path such as `address:city`
    pub path: String,
    /// JSON value; input that is not valid JSON is written as a string
    pub value: String,
}

#[derive(Args)]
pub struct CheckArgs {
    pub field: String,
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use memento_types::{ResourceId, Timestamp};

#[derive(Parser)]
#[command(name = "memento", about = "Versioned snapshots with point-in-time reads", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the blob store and the version index
    #[arg(long, global = true, default_value = ".memento")]
    pub root: PathBuf,

    /// TOML configuration file (defaults to <root>/memento.toml if present)
    #[arg(long, global = true)]
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
    /// Store a snapshot read from a JSON file
    Put(PutArgs),
    /// Show the version of a resource in effect at a given time
    Get(GetArgs),
    /// Show the version timemap of a resource
    List(ListArgs),
    /// Delete one version of a resource
    Delete(DeleteArgs),
    /// Rebuild a resource's timeline from the stored blobs
    Reindex(ReindexArgs),
}

#[derive(Args)]
pub struct PutArgs {
    /// Snapshot document (JSON)
    pub file: PathBuf,
    /// The file holds a raw statement graph (`id` + `statements`) instead of a snapshot
    #[arg(long)]
    pub graph: bool,
}

#[derive(Args)]
pub struct GetArgs {
    pub id: ResourceId,
    /// Epoch seconds or RFC 3339; defaults to now
    #[arg(long)]
    pub at: Option<Timestamp>,
    /// Only match a version stored at exactly this time
    #[arg(long)]
    pub exact: bool,
    /// Print the decoded statements
    #[arg(long)]
    pub body: bool,
}

#[derive(Args)]
pub struct ListArgs {
    pub id: ResourceId,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub id: ResourceId,
    /// Epoch seconds or RFC 3339
    #[arg(long)]
    pub at: Timestamp,
}

#[derive(Args)]
pub struct ReindexArgs {
    pub id: ResourceId,
}

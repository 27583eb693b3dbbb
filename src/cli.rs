use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "archup")]
#[command(about = "Profile-driven Unix backup tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a full backup of the given sources into the target
    Backup(ProfileArgs),
    /// Re-synchronize an existing backup, copying only changed files
    Update(ProfileArgs),
    /// Classify a path's accessibility before backing it up
    Inspect(InspectArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Profile name; becomes the folder name under the target
    #[arg(long)]
    pub name: String,

    /// Source folder, repeatable
    #[arg(long = "folder")]
    pub folders: Vec<PathBuf>,

    /// Source file, repeatable
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// Target directory receiving the backup
    #[arg(long)]
    pub target: PathBuf,

    /// Mirror the sources' layout relative to their common parent instead of
    /// flattening top-level items
    #[arg(long)]
    pub keep_structure: bool,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    pub path: PathBuf,

    /// Treat the path as a folder
    #[arg(long)]
    pub folder: bool,

    /// Check writability instead of readability
    #[arg(long)]
    pub write: bool,

    /// Perform a real filesystem operation instead of trusting metadata
    #[arg(long)]
    pub deep: bool,
}

mod cmd_config;
mod cmd_delete;
mod cmd_diff;
mod cmd_favorite;
mod cmd_files;
mod cmd_gc;
mod cmd_hook;
mod cmd_list;
mod cmd_rename;
mod cmd_restore;
mod cmd_show;
mod cmd_snap;

use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "vard",
    version,
    about = "Working-tree checkpoints in a shadow repository"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a checkpoint of the current working tree
    Snap {
        /// Custom description for the checkpoint
        #[arg(short, long)]
        message: Option<String>,
    },
    /// List recent checkpoints (favorites first)
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the file paths captured in a checkpoint
    Files {
        /// Checkpoint id
        id: String,
    },
    /// Print one captured file's content
    Show {
        /// Checkpoint id
        id: String,
        /// File path inside the checkpoint
        path: String,
    },
    /// Show files changed between a checkpoint and the working tree
    Diff {
        /// Checkpoint id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore the working tree to a checkpoint (discards local changes)
    Restore {
        /// Checkpoint id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Rename a checkpoint's displayed description
    Rename {
        /// Checkpoint id
        id: String,
        /// New display name
        name: String,
    },
    /// Toggle favorite status for a checkpoint
    Favorite {
        /// Checkpoint id
        id: String,
    },
    /// Hide a checkpoint from listings (history is kept)
    Delete {
        /// Checkpoint id
        id: String,
    },
    /// Tombstone checkpoints older than the retention period
    Gc {
        /// Override gc.keep_days from config
        #[arg(long)]
        keep_days: Option<i64>,
    },
    /// Get or set configuration
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
    /// Agent hook: checkpoint on a chat turn (JSON payload on stdin, never fails)
    Hook,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = std::env::current_dir()?;

    match cli.cmd {
        Command::Snap { message } => cmd_snap::execute(&root, message.as_deref()),
        Command::List { json } => cmd_list::execute(&root, json),
        Command::Files { id } => cmd_files::execute(&root, &id),
        Command::Show { id, path } => cmd_show::execute(&root, &id, &path),
        Command::Diff { id, json } => cmd_diff::execute(&root, &id, json),
        Command::Restore { id, force } => cmd_restore::execute(&root, &id, force),
        Command::Rename { id, name } => cmd_rename::execute(&root, &id, &name),
        Command::Favorite { id } => cmd_favorite::execute(&root, &id),
        Command::Delete { id } => cmd_delete::execute(&root, &id),
        Command::Gc { keep_days } => cmd_gc::execute(&root, keep_days),
        Command::Config { cmd } => cmd_config::run(cmd),
        Command::Hook => cmd_hook::execute(&root),
    }
}

/// Open the checkpoint engine for a project root with the global config.
pub(crate) fn open_engine(project_root: &Path) -> anyhow::Result<vard_shadow::CheckpointEngine> {
    let config = vard_shadow::config::load(&vard_shadow::paths::config_path())?;
    vard_shadow::CheckpointEngine::open(project_root, config)
}

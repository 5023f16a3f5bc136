//! Root CLI structure for nou

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nou")]
#[command(about = "Inspect and play NOU rigs and scene hierarchies", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Skeleton rig operations
    Rig {
        #[command(subcommand)]
        command: crate::commands::rig::RigCommands,
    },

    /// Scene hierarchy operations
    Scene {
        #[command(subcommand)]
        command: crate::commands::scene::SceneCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

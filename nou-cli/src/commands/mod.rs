//! Command implementations

pub mod rig;
pub mod scene;

/// How commands print per-joint or per-node results
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned table
    Table,
    /// Pretty-printed JSON
    Json,
    /// Indented hierarchy
    Tree,
}

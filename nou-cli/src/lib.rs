//! NOU CLI library
//!
//! Rig and scene file formats plus the command implementations behind the
//! `nou` binary.

pub mod cli;
pub mod commands;
pub mod utils;

pub mod cli;
pub mod command;
pub mod config;
pub mod directory;
pub mod git;
pub mod model;
pub mod stale;

mod api;
mod flock;
#[cfg(test)]
mod testing;

pub use api::{CloneLite, CloneLiteBuilder, CloneLiteError};

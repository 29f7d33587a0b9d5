//! CLI subcommand implementations.

pub mod fixture;
pub mod load;
pub mod parse;

//! CLI subcommands.

pub mod products;
pub mod sell;
pub mod shell;

//! neta-cli: the I/O side of neta.
//!
//! Reads follow edges and user tables from CSV, keeps built indexes in an
//! on-disk snapshot cache, resolves usernames, and renders the results of
//! neta-core queries. The `neta` binary is a thin clap front end over
//! these modules.

pub mod cache;
pub mod commands;
pub mod config;
pub mod load;
pub mod logging;
pub mod users;

// src/commands/mod.rs
//! Command handlers for the simmer CLI

mod cook;

pub use cook::{CookOptions, cmd_cook};

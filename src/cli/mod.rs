//! CLI module for the cutout-refine library
//!
//! This module is only available when the "cli" feature is enabled.

mod report;
#[path = "main.rs"]
mod main_impl;

pub use main_impl::{main, Cli, Command};

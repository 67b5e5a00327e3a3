//! Cutout Refine CLI Tool
//!
//! Command-line interface for the mask refinement pipeline: one
//! subcommand per stage, JSON reports on stdout, diagnostics on stderr.

#[cfg(feature = "cli")]
use cutout_refine::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}

//! Taieba Academy CLI
//!
//! Terminal front-end for the course marketplace.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/academy-cli
//! ```
//!
//! # Overview
//!
//! - `academy login` / `academy register` / `academy logout`: account access
//! - `academy courses list --category design`: browse the catalog
//! - `academy enroll <id>`: join a course
//! - `academy my courses`: manage what you published
//!
//! The backend and identity provider are configured with `ACADEMY_*`
//! environment variables or a `.env` file. Set `RUST_LOG=debug` for
//! verbose logging.

#![allow(clippy::too_many_arguments)]

mod args;
mod commands;
mod console;
mod context;
mod router;

use args::Cli;
use clap::Parser;
use crate::console::{CliConsole, Reported};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging with environment-based filtering
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match router::route(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if error.downcast_ref::<Reported>().is_none() {
                CliConsole::new(false).error(&format!("{:#}", error));
            }
            ExitCode::FAILURE
        }
    }
}

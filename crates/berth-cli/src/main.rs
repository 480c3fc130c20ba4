//! # berth
//!
//! Keeps a registry of desired containers and drives the container
//! runtime, reverse proxy and DNS hooks to bring them up.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

mod bus;
mod commands;
mod context;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);
    commands::execute(cli).await
}

fn init_tracing(json: bool) {
    let subscriber = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

//! CLI command definitions and dispatch.

pub mod add;
pub mod get;
pub mod images;
pub mod logs;
pub mod ls;
pub mod prune;
pub mod ps;
pub mod pull;
pub mod reconcile;
pub mod refresh;
pub mod restart;
pub mod rm;
pub mod start;
pub mod stop;
pub mod update;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::context::Context;

/// berth: registry-driven container lifecycle manager.
#[derive(Parser, Debug)]
#[command(name = "berth", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the JSON configuration file.
    #[arg(
        long,
        global = true,
        env = "BERTH_CONFIG",
        default_value_os_t = berth_common::constants::default_config_file()
    )]
    pub config: PathBuf,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a container.
    Add(add::AddArgs),
    /// Change a registered container's image, host, ports or volumes.
    Update(update::UpdateArgs),
    /// Stop a container and remove it from the registry.
    Rm(rm::RmArgs),
    /// Show one registered container.
    Get(get::GetArgs),
    /// List registered containers.
    Ls(ls::LsArgs),
    /// List running containers, or check whether one is running.
    Ps(ps::PsArgs),
    /// Print container logs.
    Logs(logs::LogsArgs),
    /// Start a registered container.
    Start(start::StartArgs),
    /// Stop a container.
    Stop(stop::StopArgs),
    /// Stop then start a container.
    Restart(restart::RestartArgs),
    /// Pull the latest image and recreate a container.
    Refresh(refresh::RefreshArgs),
    /// Refresh every registered container that is not running.
    Reconcile(reconcile::ReconcileArgs),
    /// Pull an image.
    Pull(pull::PullArgs),
    /// List locally stored image repositories.
    Images(images::ImagesArgs),
    /// Remove dangling images.
    Prune(prune::PruneArgs),
}

/// Loads the context and dispatches the parsed command to its handler.
///
/// # Errors
///
/// Returns an error if configuration loading or the command fails.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::load(&cli.config)?;
    match cli.command {
        Command::Add(args) => add::execute(args, &ctx).await,
        Command::Update(args) => update::execute(args, &ctx),
        Command::Rm(args) => rm::execute(args, &ctx).await,
        Command::Get(args) => get::execute(args, &ctx),
        Command::Ls(args) => ls::execute(args, &ctx),
        Command::Ps(args) => ps::execute(args, &ctx).await,
        Command::Logs(args) => logs::execute(args, &ctx).await,
        Command::Start(args) => start::execute(args, &ctx).await,
        Command::Stop(args) => stop::execute(args, &ctx).await,
        Command::Restart(args) => restart::execute(args, &ctx).await,
        Command::Refresh(args) => refresh::execute(args, &ctx).await,
        Command::Reconcile(args) => reconcile::execute(args, &ctx).await,
        Command::Pull(args) => pull::execute(args, &ctx).await,
        Command::Images(args) => images::execute(args, &ctx).await,
        Command::Prune(args) => prune::execute(args, &ctx).await,
    }
}

//! `berth prune`

use clap::Args;

use crate::context::Context;

/// Arguments for the `prune` command.
#[derive(Args, Debug)]
pub struct PruneArgs {}

/// Executes the `prune` command.
///
/// # Errors
///
/// Returns an error if the runtime fails to prune.
pub async fn execute(_args: PruneArgs, ctx: &Context) -> anyhow::Result<()> {
    ctx.engine.prune().await?;
    println!("Pruned dangling images");
    Ok(())
}

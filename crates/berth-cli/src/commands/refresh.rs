//! `berth refresh`: pull the latest image and recreate a container.

use clap::Args;

use crate::context::Context;

/// Arguments for the `refresh` command.
#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Container name.
    pub name: String,
}

/// Executes the `refresh` command.
///
/// # Errors
///
/// Returns the error of the first failing step. A failure after the
/// stop leaves the container stopped.
pub async fn execute(args: RefreshArgs, ctx: &Context) -> anyhow::Result<()> {
    ctx.engine.refresh(&args.name, ctx.bus().as_ref()).await?;
    println!("Refreshed {}", args.name);
    Ok(())
}

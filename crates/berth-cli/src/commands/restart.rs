//! `berth restart`

use clap::Args;

use crate::context::Context;

/// Arguments for the `restart` command.
#[derive(Args, Debug)]
pub struct RestartArgs {
    /// Container name.
    pub name: String,
}

/// Executes the `restart` command.
///
/// # Errors
///
/// Returns the error of the first failing step.
pub async fn execute(args: RestartArgs, ctx: &Context) -> anyhow::Result<()> {
    let name = ctx.engine.restart(&args.name, ctx.bus().as_ref()).await?;
    println!("Restarted {name}");
    Ok(())
}

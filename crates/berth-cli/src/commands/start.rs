//! `berth start`: start a registered container.

use clap::Args;

use crate::context::Context;

/// Arguments for the `start` command.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Container name.
    pub name: String,
}

/// Executes the `start` command.
///
/// # Errors
///
/// Returns an error if the container is not registered, a proxy or DNS
/// hook fails, or the runtime refuses the launch.
pub async fn execute(args: StartArgs, ctx: &Context) -> anyhow::Result<()> {
    ctx.engine.start(&args.name, ctx.bus().as_ref()).await?;
    println!("Started {}", args.name);
    Ok(())
}

//! `berth stop`: stop and remove a running container.

use clap::Args;

use crate::context::Context;

/// Arguments for the `stop` command.
#[derive(Args, Debug)]
pub struct StopArgs {
    /// Container name. Need not be registered.
    pub name: String,
}

/// Executes the `stop` command. The registration is kept.
///
/// # Errors
///
/// Returns an error if the runtime or a DNS hook fails.
pub async fn execute(args: StopArgs, ctx: &Context) -> anyhow::Result<()> {
    ctx.engine.stop(&args.name, ctx.bus().as_ref()).await?;
    println!("Stopped {}", args.name);
    Ok(())
}

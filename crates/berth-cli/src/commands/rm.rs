//! `berth rm`: stop a container and drop its registration.

use clap::Args;

use crate::context::Context;

/// Arguments for the `rm` command.
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Container name.
    pub name: String,

    /// Only remove the registration; leave the container running.
    #[arg(long)]
    pub keep_running: bool,
}

/// Executes the `rm` command.
///
/// # Errors
///
/// Returns an error if the container is not registered or cannot be stopped.
pub async fn execute(args: RmArgs, ctx: &Context) -> anyhow::Result<()> {
    let registry = ctx.engine.registry();
    let _ = registry.find(&args.name)?;
    if !args.keep_running {
        ctx.engine.stop(&args.name, ctx.bus().as_ref()).await?;
    }
    registry.remove(&args.name)?;
    println!("Removed {}", args.name);
    Ok(())
}

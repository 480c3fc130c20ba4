//! `berth pull`

use clap::Args;

use crate::context::Context;

/// Arguments for the `pull` command.
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Image reference.
    pub image: String,
}

/// Executes the `pull` command.
///
/// # Errors
///
/// Returns an error if the image is empty or the pull fails.
pub async fn execute(args: PullArgs, ctx: &Context) -> anyhow::Result<()> {
    ctx.engine.pull(&args.image).await?;
    println!("Pulled {}", args.image);
    Ok(())
}

//! `berth ps`: list running containers, or check whether one is running.

use clap::Args;

use crate::context::Context;
use crate::output;

/// Arguments for the `ps` command.
#[derive(Args, Debug)]
pub struct PsArgs {
    /// Only check this container; the exit status is non-zero unless it runs.
    pub name: Option<String>,

    /// Print names only, skipping port inspection.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Executes the `ps` command.
///
/// # Errors
///
/// Returns an error if the runtime cannot list or inspect containers, or
/// if the named container is not running.
pub async fn execute(args: PsArgs, ctx: &Context) -> anyhow::Result<()> {
    let adapter = ctx.engine.adapter();
    if let Some(name) = args.name {
        if !adapter.is_running(&name).await? {
            anyhow::bail!("{name} is not running");
        }
        if !args.quiet {
            println!("{name} is running");
        }
        return Ok(());
    }

    if args.quiet {
        for name in adapter.list_running().await? {
            println!("{name}");
        }
        return Ok(());
    }

    let views = adapter.running_views().await?;
    if views.is_empty() {
        println!("No containers running.");
        return Ok(());
    }
    print!("{}", output::running_table(&views));
    Ok(())
}

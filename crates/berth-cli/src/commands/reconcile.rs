//! `berth reconcile`: bring every stopped registered container back up.

use clap::Args;

use crate::context::Context;
use crate::output;

/// Arguments for the `reconcile` command.
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Print the report as JSON.
    #[arg(long)]
    pub raw: bool,
}

/// Executes the `reconcile` command.
///
/// Individual refresh failures are listed in the printed report and do not
/// fail the command.
///
/// # Errors
///
/// Returns an error only if the registry or runtime listing cannot be read.
pub async fn execute(args: ReconcileArgs, ctx: &Context) -> anyhow::Result<()> {
    let report = ctx.engine.reconcile_all(ctx.bus()).await?;
    if args.raw {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::reconcile_summary(&report));
    }
    if !report.is_clean() {
        tracing::warn!(failed = report.failed.len(), "some containers could not be refreshed");
    }
    Ok(())
}

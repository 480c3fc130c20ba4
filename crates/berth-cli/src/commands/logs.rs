//! `berth logs`: print container logs.

use clap::Args;

use crate::context::Context;

/// Arguments for the `logs` command.
#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Container name.
    pub name: String,

    /// Number of lines to show from the end of the logs.
    #[arg(short = 'n', long)]
    pub lines: Option<u32>,
}

/// Executes the `logs` command. Standard output comes first, then a
/// `---` separator line, then standard error.
///
/// # Errors
///
/// Returns an error if the name is empty or the runtime cannot be invoked.
pub async fn execute(args: LogsArgs, ctx: &Context) -> anyhow::Result<()> {
    let logs = ctx.engine.adapter().fetch_logs(&args.name, args.lines).await?;
    print!("{logs}");
    Ok(())
}

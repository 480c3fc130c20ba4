//! `berth get`: show one registered container.

use clap::Args;

use crate::context::Context;
use crate::output;

/// Arguments for the `get` command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Container name.
    pub name: String,

    /// Print the record as JSON.
    #[arg(long)]
    pub raw: bool,
}

/// Executes the `get` command.
///
/// # Errors
///
/// Returns an error if the container is not registered.
pub fn execute(args: GetArgs, ctx: &Context) -> anyhow::Result<()> {
    let record = ctx.engine.registry().find(&args.name)?;
    if args.raw {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", output::container_table(std::slice::from_ref(&record)));
    }
    Ok(())
}

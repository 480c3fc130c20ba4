//! `berth ls`: list registered containers.

use berth_common::types::ListFilter;
use clap::Args;

use crate::context::Context;
use crate::output;

/// Arguments for the `ls` command. Set filters must all match exactly.
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Only the container with this name.
    #[arg(long)]
    pub name: Option<String>,

    /// Only containers running this image.
    #[arg(long)]
    pub image: Option<String>,

    /// Only containers bound to this domain.
    #[arg(long)]
    pub host: Option<String>,
}

impl LsArgs {
    /// Builds the registry filter.
    pub fn filter(self) -> ListFilter {
        ListFilter {
            name: self.name,
            image: self.image,
            host: self.host,
        }
    }
}

/// Executes the `ls` command.
///
/// # Errors
///
/// Returns an error if the registry cannot be read.
pub fn execute(args: LsArgs, ctx: &Context) -> anyhow::Result<()> {
    let rows = ctx.engine.registry().list(&args.filter())?;
    if rows.is_empty() {
        println!("No containers registered.");
        return Ok(());
    }
    print!("{}", output::container_table(&rows));
    Ok(())
}

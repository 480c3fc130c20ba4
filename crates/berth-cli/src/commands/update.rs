//! `berth update`: change a registered container.

use berth_common::types::ContainerPatch;
use clap::Args;

use crate::context::Context;
use crate::output;

/// Arguments for the `update` command.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Container name.
    pub name: String,

    /// New image reference.
    #[arg(long)]
    pub image: Option<String>,

    /// New domain.
    #[arg(long)]
    pub host: Option<String>,

    /// New comma-separated port pairs.
    #[arg(short, long)]
    pub ports: Option<String>,

    /// New comma-separated volume pairs.
    #[arg(short, long)]
    pub volumes: Option<String>,
}

/// Executes the `update` command. The running container is left as is
/// until its next start.
///
/// # Errors
///
/// Returns an error if the container is not registered.
pub fn execute(args: UpdateArgs, ctx: &Context) -> anyhow::Result<()> {
    let patch = ContainerPatch {
        image: args.image,
        host: args.host,
        ports: args.ports,
        volumes: args.volumes,
    };
    let record = ctx.engine.registry().update(&args.name, patch)?;
    print!("{}", output::container_table(std::slice::from_ref(&record)));
    Ok(())
}

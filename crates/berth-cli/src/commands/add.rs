//! `berth add`: register a container.

use berth_common::types::NewContainer;
use clap::Args;

use crate::context::Context;

/// Arguments for the `add` command.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Unique container name.
    pub name: String,

    /// Image reference.
    pub image: String,

    /// Domain routed to the container.
    #[arg(long)]
    pub host: Option<String>,

    /// Comma-separated `hostPort:containerPort` pairs.
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Comma-separated `hostPath:containerPath` pairs.
    #[arg(short, long)]
    pub volumes: Option<String>,

    /// Start the container once registered.
    #[arg(long)]
    pub start: bool,
}

/// Executes the `add` command.
///
/// Invalid port and volume entries are dropped silently.
///
/// # Errors
///
/// Returns an error if the name is taken, a required field is empty, or
/// the optional start fails.
pub async fn execute(args: AddArgs, ctx: &Context) -> anyhow::Result<()> {
    let request = NewContainer {
        name: args.name,
        image: args.image,
        host: args.host,
        ports: args.ports,
        volumes: args.volumes,
    };
    let record = ctx.engine.registry().add(request)?;
    println!("Added {} (id {})", record.name, record.id);

    if args.start {
        ctx.engine.start(&record.name, ctx.bus().as_ref()).await?;
        println!("Started {}", record.name);
    }
    Ok(())
}

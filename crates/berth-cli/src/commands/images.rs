//! `berth images`: list locally stored image repositories.

use clap::Args;

use crate::context::Context;

/// Arguments for the `images` command.
#[derive(Args, Debug)]
pub struct ImagesArgs {}

/// Executes the `images` command.
///
/// # Errors
///
/// Returns an error if the runtime cannot list images.
pub async fn execute(_args: ImagesArgs, ctx: &Context) -> anyhow::Result<()> {
    let images = ctx.engine.adapter().list_images().await?;
    if images.is_empty() {
        println!("No images found.");
        return Ok(());
    }
    for image in images {
        println!("{image}");
    }
    Ok(())
}

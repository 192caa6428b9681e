//! Immutable X marketplace CLI
//!
//! Usage:
//!   imx [--output json|standard] [--config PATH] <COMMAND>
//!
//! The Alchemy key (ALCHEMY_API_KEY) switches to the SDK backend; without it
//! the public REST API is used.

use clap::Parser;
use immutablex_cli::bin_common::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let output = run(Cli::parse()).await?;
    println!("{}", output);
    Ok(())
}

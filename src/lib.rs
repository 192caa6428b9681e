//! Immutable X command line client - main library
//!
//! ## Architecture
//!
//! - **bin_common**: argument parsing and command execution for the `imx` binary
//! - **imx**: listing engine, backends, price cache (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust,no_run
//! use clap::Parser;
//! use immutablex_cli::bin_common::{run, Cli};
//!
//! # async fn launch() -> anyhow::Result<()> {
//! let output = run(Cli::parse()).await?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```

// Re-export workspace libraries for convenience
pub use imx;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for the `imx` binary

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, Cli, Command, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
    pub use runner::{execute, run};
}

//! Command execution for the `imx` binary
//!
//! Loads configuration, starts the selected backend, runs one command and
//! returns its rendered output for the binary to print.

use super::cli::{Cli, Command};
use imx::application::output::{
    asset_counts_by_rarity, format_asset, format_asset_counts, format_assets, format_collection,
    format_collections, format_json, format_order_summary, format_orders, format_price,
    format_shortcuts,
};
use imx::{
    init_tracing_with_level, ClientConfig, ImxApp, ListResult, MarketplaceBackend, OutputFormat,
};
use tracing::{info, warn};

/// Configure, run the parsed command and return what should be printed
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let config = ClientConfig::load_or_env(cli.config_path())?;
    init_tracing_with_level(&config.log_level);
    config.log();

    let app = ImxApp::new(config)?;
    app.start().await?;

    let result = execute(&app, cli.command, cli.output).await;
    app.stop().await;

    result
}

/// Run one command against a started app and render its output
pub async fn execute(app: &ImxApp, command: Command, format: OutputFormat) -> anyhow::Result<String> {
    let rendered = match command {
        Command::Assets(args) => {
            let assets = finish(app.list_assets(args.into()).await)?;
            format_assets(&assets, format)
        }
        Command::Asset {
            collection,
            token_id,
            include_fees,
        } => {
            let asset = app
                .backend
                .get_asset(&collection, &token_id, include_fees)
                .await?;
            format_asset(&asset, format)
        }
        Command::Collections(args) => {
            let collections = finish(app.list_collections(args.into()).await)?;
            format_collections(&collections, format)
        }
        Command::Collection { address } => {
            let collection = app.backend.get_collection(&address).await?;
            format_collection(&collection, format)
        }
        Command::Orders(args) => {
            let fiat = args.fiat;
            let orders = finish(app.list_orders(args.into()).await)?;
            let spot = match format {
                OutputFormat::Standard => app.spot_price(None, Some(fiat)).await,
                OutputFormat::Json => 0.0,
            };
            format_orders(&orders, format, spot, fiat)
        }
        Command::Order {
            order_id,
            include_fees,
        } => {
            let order = app.backend.get_order(&order_id, include_fees).await?;
            match format {
                OutputFormat::Json => format_json(&order),
                OutputFormat::Standard => {
                    let spot = app.spot_price(None, None).await;
                    format_order_summary(&order, spot, Default::default())
                }
            }
        }
        Command::Counts(args) => {
            let name = args
                .collection
                .clone()
                .unwrap_or_else(|| "All assets".to_string());
            let assets = finish(app.list_assets(args.into()).await)?;
            let counts = asset_counts_by_rarity(&assets);
            match format {
                OutputFormat::Json => format_json(&counts),
                OutputFormat::Standard => format_asset_counts(&name, &counts),
            }
        }
        Command::Shortcuts => format_shortcuts(&app.shortcuts, format),
        Command::Price { crypto, fiat } => {
            let price = app.spot_price(Some(crypto), Some(fiat)).await;
            match format {
                OutputFormat::Json => format_json(&serde_json::json!({
                    "crypto": crypto.as_str(),
                    "fiat": fiat.as_str(),
                    "price": price,
                })),
                OutputFormat::Standard => format_price(crypto, fiat, price),
            }
        }
    };

    Ok(rendered)
}

/// A cancelled listing still prints what was fetched; other failures are fatal
fn finish<T>(result: ListResult<T>) -> anyhow::Result<Vec<T>>
where
    T: std::fmt::Debug + Send + Sync + 'static,
{
    match result {
        Ok(records) => {
            info!("Fetched {} records", records.len());
            Ok(records)
        }
        Err(e) if e.is_cancelled() => {
            warn!("{}", e);
            Ok(e.into_partial())
        }
        Err(e) => Err(e.into()),
    }
}

//! CLI definition and configuration path lookup

use clap::{Args, Parser, Subcommand, ValueHint};
use imx::{AssetFilters, CollectionFilters, CryptoSymbol, FiatSymbol, OrderFilters, OutputFormat};
use std::path::PathBuf;

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_ENV: &str = "IMX_CONFIG_PATH";

pub const DEFAULT_CONFIG_PATH: &str = "imx.yaml";

/// Load configuration path from environment or use default
pub fn load_config_from_env() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
        .into()
}

#[derive(Parser, Debug)]
#[command(name = "imx", author, version, about = "Query the Immutable X marketplace")]
pub struct Cli {
    /// Output format: json or standard
    #[arg(long, short, global = true, default_value = "standard")]
    pub output: OutputFormat,

    /// YAML config file (default: imx.yaml, or IMX_CONFIG_PATH)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(load_config_from_env)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List assets
    Assets(AssetArgs),

    /// Show a single asset
    Asset {
        /// Collection address or shortcut
        collection: String,
        token_id: String,
        #[arg(long)]
        include_fees: bool,
    },

    /// List collections
    Collections(CollectionArgs),

    /// Show a single collection
    Collection {
        /// Collection address or shortcut
        address: String,
    },

    /// List orders
    Orders(OrderArgs),

    /// Show a single order
    Order {
        order_id: String,
        #[arg(long)]
        include_fees: bool,
    },

    /// Count a collection's assets by rarity
    Counts(AssetArgs),

    /// List known collection shortcuts
    Shortcuts,

    /// Show a spot price
    Price {
        #[arg(long, default_value = "ETH")]
        crypto: CryptoSymbol,
        #[arg(long, default_value = "USD")]
        fiat: FiatSymbol,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AssetArgs {
    /// Collection address or shortcut
    #[arg(long, short)]
    pub collection: Option<String>,
    #[arg(long)]
    pub buy_orders: bool,
    #[arg(long)]
    pub sell_orders: bool,
    #[arg(long)]
    pub direction: Option<String>,
    #[arg(long)]
    pub include_fees: bool,
    /// Metadata filter as key=value, repeatable
    #[arg(long, short)]
    pub metadata: Vec<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub order_by: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub updated_max_timestamp: Option<String>,
    #[arg(long)]
    pub updated_min_timestamp: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
}

impl From<AssetArgs> for AssetFilters {
    fn from(args: AssetArgs) -> Self {
        AssetFilters {
            buy_orders: args.buy_orders,
            collection: args.collection,
            direction: args.direction,
            include_fees: args.include_fees,
            metadata: args.metadata,
            name: args.name,
            order_by: args.order_by,
            sell_orders: args.sell_orders,
            status: args.status,
            updated_max_timestamp: args.updated_max_timestamp,
            updated_min_timestamp: args.updated_min_timestamp,
            user: args.user,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct CollectionArgs {
    /// Comma separated addresses or shortcuts to exclude
    #[arg(long)]
    pub blacklist: Option<String>,
    #[arg(long)]
    pub direction: Option<String>,
    #[arg(long)]
    pub keyword: Option<String>,
    #[arg(long)]
    pub order_by: Option<String>,
    /// Comma separated addresses or shortcuts to include
    #[arg(long)]
    pub whitelist: Option<String>,
}

impl From<CollectionArgs> for CollectionFilters {
    fn from(args: CollectionArgs) -> Self {
        CollectionFilters {
            blacklist: args.blacklist,
            direction: args.direction,
            keyword: args.keyword,
            order_by: args.order_by,
            whitelist: args.whitelist,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct OrderArgs {
    #[arg(long)]
    pub auxiliary_fee_percentages: Option<String>,
    #[arg(long)]
    pub auxiliary_fee_recipients: Option<String>,
    #[arg(long)]
    pub buy_asset_id: Option<String>,
    #[arg(long)]
    pub buy_max_quantity: Option<String>,
    #[arg(long)]
    pub buy_metadata: Option<String>,
    #[arg(long)]
    pub buy_min_quantity: Option<String>,
    /// Address or shortcut
    #[arg(long)]
    pub buy_token_address: Option<String>,
    #[arg(long)]
    pub buy_token_id: Option<String>,
    #[arg(long)]
    pub buy_token_name: Option<String>,
    #[arg(long)]
    pub buy_token_type: Option<String>,
    #[arg(long)]
    pub direction: Option<String>,
    #[arg(long)]
    pub include_fees: bool,
    #[arg(long)]
    pub max_timestamp: Option<String>,
    #[arg(long)]
    pub min_timestamp: Option<String>,
    #[arg(long)]
    pub order_by: Option<String>,
    /// Stop after this many orders (0 for all)
    #[arg(long, default_value_t = 0)]
    pub page_size: usize,
    #[arg(long)]
    pub sell_asset_id: Option<String>,
    #[arg(long)]
    pub sell_max_quantity: Option<String>,
    #[arg(long)]
    pub sell_metadata: Option<String>,
    #[arg(long)]
    pub sell_min_quantity: Option<String>,
    /// Address or shortcut
    #[arg(long)]
    pub sell_token_address: Option<String>,
    #[arg(long)]
    pub sell_token_id: Option<String>,
    #[arg(long)]
    pub sell_token_name: Option<String>,
    #[arg(long)]
    pub sell_token_type: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub updated_max_timestamp: Option<String>,
    #[arg(long)]
    pub updated_min_timestamp: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    /// Fiat currency for the order summary price
    #[arg(long, default_value = "USD")]
    pub fiat: FiatSymbol,
}

impl From<OrderArgs> for OrderFilters {
    fn from(args: OrderArgs) -> Self {
        OrderFilters {
            auxiliary_fee_percentages: args.auxiliary_fee_percentages,
            auxiliary_fee_recipients: args.auxiliary_fee_recipients,
            buy_asset_id: args.buy_asset_id,
            buy_max_quantity: args.buy_max_quantity,
            buy_metadata: args.buy_metadata,
            buy_min_quantity: args.buy_min_quantity,
            buy_token_address: args.buy_token_address,
            buy_token_id: args.buy_token_id,
            buy_token_name: args.buy_token_name,
            buy_token_type: args.buy_token_type,
            direction: args.direction,
            include_fees: args.include_fees,
            max_timestamp: args.max_timestamp,
            min_timestamp: args.min_timestamp,
            order_by: args.order_by,
            page_size: args.page_size,
            sell_asset_id: args.sell_asset_id,
            sell_max_quantity: args.sell_max_quantity,
            sell_metadata: args.sell_metadata,
            sell_min_quantity: args.sell_min_quantity,
            sell_token_address: args.sell_token_address,
            sell_token_id: args.sell_token_id,
            sell_token_name: args.sell_token_name,
            sell_token_type: args.sell_token_type,
            status: args.status,
            updated_max_timestamp: args.updated_max_timestamp,
            updated_min_timestamp: args.updated_min_timestamp,
            user: args.user,
        }
    }
}

//! Text and JSON rendering of listing results
//!
//! Everything here returns a `String`; printing is left to the binary.

use crate::domain::{Asset, Collection, Order, Record};
use crate::infrastructure::coinbase::{CryptoSymbol, FiatSymbol};
use crate::infrastructure::shortcuts::ShortcutResolver;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

pub const IMMUTASCAN_URL: &str = "https://immutascan.io/address/";
pub const IMMUTASCAN_ORDER_URL: &str = "https://immutascan.io/order/";

pub const NO_NAME: &str = "[no name set]";
pub const NO_STATUS: &str = "[no status set]";
pub const NO_ID: &str = "[no id set]";

/// Key under which [`asset_counts_by_rarity`] stores the overall count
pub const TOTAL_KEY: &str = "Total";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Standard,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "standard" | "text" => Ok(OutputFormat::Standard),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Standard => f.write_str("standard"),
        }
    }
}

/// Pretty JSON, falling back to the debug form when serialization fails
pub fn format_json<T: Serialize + fmt::Debug>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            debug!("could not convert value to json: {}", e);
            format!("{:#?}", value)
        }
    }
}

/// Immutascan page for a single asset
pub fn asset_url(collection_address: &str, token_id: &str) -> String {
    format!("{}{}/{}", IMMUTASCAN_URL, collection_address, token_id)
}

/// One line per asset: name, id, status and Immutascan link
pub fn format_asset_line(asset: &Asset) -> String {
    let name = asset
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(NO_NAME);
    let status = asset.record_status().unwrap_or(NO_STATUS);
    let id = asset.record_id().unwrap_or_else(|| NO_ID.to_string());

    format!(
        "{} [{}]: {} ({})",
        name,
        id,
        status,
        asset_url(&asset.token_address, &asset.token_id)
    )
}

pub fn format_asset(asset: &Asset, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(asset),
        OutputFormat::Standard => format_asset_line(asset),
    }
}

pub fn format_assets(assets: &[Asset], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(&assets),
        OutputFormat::Standard => assets
            .iter()
            .map(format_asset_line)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn format_collection(collection: &Collection, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(collection),
        OutputFormat::Standard => {
            let name = if collection.name.is_empty() {
                NO_NAME
            } else {
                collection.name.as_str()
            };
            format!("{}: {}{}", name, IMMUTASCAN_URL, collection.address)
        }
    }
}

pub fn format_collections(collections: &[Collection], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(&collections),
        OutputFormat::Standard => collections
            .iter()
            .map(|c| format_collection(c, format))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// RFC 3339 timestamps rendered in UTC; anything else is passed through
pub fn format_timestamp(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Unit of the buy side: ETH, else the token's symbol or type
pub fn price_unit(order: &Order) -> &str {
    let side = &order.buy;
    if side.token_type.is_empty() || side.token_type.eq_ignore_ascii_case("ETH") {
        return CryptoSymbol::Eth.as_str();
    }

    side.data
        .extra
        .get("symbol")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(side.token_type.as_str())
}

/// Multi-line order summary with the price converted at `spot_price`
pub fn format_order_summary(order: &Order, spot_price: f64, fiat: FiatSymbol) -> String {
    let price = order.price_with_fees();
    let fiat_price = price * spot_price;
    let status = order.record_status().unwrap_or(NO_STATUS);

    format!(
        "Order:\n\
         - Status: {}\n\
         - Price With Fees: {:.6} {} / {:.2} {}\n\
         - User: {}\n\
         - Date: {}\n\
         - Immutascan: {}{}\n",
        status,
        price,
        price_unit(order),
        fiat_price,
        fiat,
        order.user,
        order
            .updated_timestamp
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string()),
        IMMUTASCAN_ORDER_URL,
        order.order_id
    )
}

pub fn format_orders(orders: &[Order], format: OutputFormat, spot_price: f64, fiat: FiatSymbol) -> String {
    match format {
        OutputFormat::Json => format_json(&orders),
        OutputFormat::Standard => orders
            .iter()
            .map(|o| format_order_summary(o, spot_price, fiat))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Count assets per `Rarity` metadata value, plus a `Total`.
///
/// Assets without a string rarity are skipped and logged.
pub fn asset_counts_by_rarity(assets: &[Asset]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();

    for asset in assets {
        let Some(rarity) = asset.rarity() else {
            warn!("asset {} skipped because it has no rarity", asset.token_id);
            continue;
        };

        if asset.name.is_none() {
            debug!("asset {} has a rarity but no name", asset.token_id);
        }

        *counts.entry(rarity.to_string()).or_insert(0) += 1;
        *counts.entry(TOTAL_KEY.to_string()).or_insert(0) += 1;
    }

    counts
}

/// Render rarity counts with `Total` last
pub fn format_asset_counts(name: &str, counts: &BTreeMap<String, usize>) -> String {
    let mut lines = vec![format!("{} counts:", name)];

    for (rarity, count) in counts.iter().filter(|(k, _)| k.as_str() != TOTAL_KEY) {
        lines.push(format!("- {}: {}", rarity, count));
    }

    lines.push(format!(
        "- {}: {}",
        TOTAL_KEY,
        counts.get(TOTAL_KEY).copied().unwrap_or(0)
    ));

    lines.join("\n")
}

pub fn format_shortcuts(shortcuts: &ShortcutResolver, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(&shortcuts.iter().collect::<Vec<_>>()),
        OutputFormat::Standard => shortcuts
            .iter()
            .map(|s| format!("{}: {} ({})", s.alias, s.name, s.address))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn format_price(crypto: CryptoSymbol, fiat: FiatSymbol, price: f64) -> String {
    format!("1 {} = {:.2} {}", crypto, price, fiat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn asset(value: serde_json::Value) -> Asset {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("standard".parse::<OutputFormat>().unwrap(), OutputFormat::Standard);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Standard);
    }

    #[test]
    fn test_asset_line_placeholders() {
        let a = asset(json!({"token_address": "0xabc", "token_id": "7"}));
        assert_eq!(
            format_asset_line(&a),
            "[no name set] [[no id set]]: [no status set] (https://immutascan.io/address/0xabc/7)"
        );
    }

    #[test]
    fn test_asset_line_with_values() {
        let a = asset(json!({
            "token_address": "0xabc",
            "token_id": "7",
            "id": "0xid",
            "name": "Knight",
            "status": "imx"
        }));
        assert_eq!(
            format_asset_line(&a),
            "Knight [0xid]: imx (https://immutascan.io/address/0xabc/7)"
        );
    }

    #[test]
    fn test_asset_json_keeps_unknown_fields() {
        let a = asset(json!({"token_address": "0xabc", "token_id": "7", "fees": [{"type": "royalty"}]}));
        let rendered = format_asset(&a, OutputFormat::Json);
        assert!(rendered.contains("\"fees\""));
        assert!(rendered.contains("royalty"));
    }

    #[test]
    fn test_rarity_counts() {
        let assets = vec![
            asset(json!({"token_id": "1", "name": "a", "metadata": {"Rarity": "Epic"}})),
            asset(json!({"token_id": "2", "name": "b", "metadata": {"Rarity": "Common"}})),
            asset(json!({"token_id": "3", "name": "c", "metadata": {"Rarity": "Epic"}})),
            asset(json!({"token_id": "4", "name": "d", "metadata": {}})),
            asset(json!({"token_id": "5", "metadata": {"Rarity": 3}})),
        ];

        let counts = asset_counts_by_rarity(&assets);
        assert_eq!(counts.get("Epic"), Some(&2));
        assert_eq!(counts.get("Common"), Some(&1));
        assert_eq!(counts.get(TOTAL_KEY), Some(&3));

        let rendered = format_asset_counts("Heroes", &counts);
        assert_eq!(rendered, "Heroes counts:\n- Common: 1\n- Epic: 2\n- Total: 3");
    }

    #[test]
    fn test_rarity_counts_empty() {
        let counts = asset_counts_by_rarity(&[]);
        assert!(counts.is_empty());
        assert_eq!(format_asset_counts("x", &counts), "x counts:\n- Total: 0");
    }

    #[test]
    fn test_order_summary() {
        let order: Order = serde_json::from_value(json!({
            "order_id": 42,
            "status": "active",
            "user": "0xuser",
            "buy": {"type": "ETH", "data": {"quantity_with_fees": "1500000000000000000", "decimals": 18}},
            "updated_timestamp": "2022-05-01T10:00:00Z"
        }))
        .unwrap();

        let summary = format_order_summary(&order, 2000.0, FiatSymbol::Usd);
        assert!(summary.contains("- Status: active"));
        assert!(summary.contains("- Price With Fees: 1.500000 ETH / 3000.00 USD"));
        assert!(summary.contains("- User: 0xuser"));
        assert!(summary.contains("- Date: 2022-05-01 10:00:00 UTC"));
        assert!(summary.contains("- Immutascan: https://immutascan.io/order/42"));
    }

    #[test]
    fn test_order_summary_labels_erc20_price() {
        let with_symbol: Order = serde_json::from_value(json!({
            "order_id": 7,
            "status": "active",
            "buy": {"type": "ERC20", "data": {"symbol": "IMX", "quantity_with_fees": "2500000000000000000", "decimals": 18}}
        }))
        .unwrap();
        assert_eq!(price_unit(&with_symbol), "IMX");
        assert!(format_order_summary(&with_symbol, 0.0, FiatSymbol::Usd)
            .contains("- Price With Fees: 2.500000 IMX / 0.00 USD"));

        let bare: Order = serde_json::from_value(json!({
            "order_id": 8,
            "buy": {"type": "ERC20", "data": {"quantity_with_fees": "1000000", "decimals": 6}}
        }))
        .unwrap();
        assert_eq!(price_unit(&bare), "ERC20");

        let untyped: Order = serde_json::from_value(json!({"order_id": 9})).unwrap();
        assert_eq!(price_unit(&untyped), "ETH");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp("2022-05-01T12:00:00+02:00"),
            "2022-05-01 10:00:00 UTC"
        );
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_collection_standard() {
        let collection: Collection = serde_json::from_value(json!({
            "address": "0xabc",
            "name": "Heroes"
        }))
        .unwrap();
        assert_eq!(
            format_collection(&collection, OutputFormat::Standard),
            "Heroes: https://immutascan.io/address/0xabc"
        );
    }

    #[test]
    fn test_shortcuts_listing() {
        let rendered = format_shortcuts(&ShortcutResolver::builtin(), OutputFormat::Standard);
        assert!(rendered.contains("hero: BitVerse Heroes (0x6465ef3009f3c474774f4afb607a5d600ea71d95)"));
        assert!(rendered.contains("portal: "));
    }
}

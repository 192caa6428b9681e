//! Fluent request builders for the SDK session
//!
//! Each builder collects parameters through chained setters and sends a
//! single request with [`send`](ListRequest::send).

use super::SdkSession;
use crate::domain::{Page, Record};
use crate::infrastructure::client::http::{join_url, send_json};
use crate::infrastructure::client::{QueryParams, Result};
use std::marker::PhantomData;
use tracing::debug;

/// Generates `fn name(self, value) -> Self` setters that write one parameter
macro_rules! string_setters {
    ($($method:ident => $param:literal),* $(,)?) => {
        $(
            pub fn $method(mut self, value: impl Into<String>) -> Self {
                self.params.set($param, value);
                self
            }
        )*
    };
}

macro_rules! flag_setters {
    ($($method:ident => $param:literal),* $(,)?) => {
        $(
            pub fn $method(mut self, value: bool) -> Self {
                self.params.set($param, value.to_string());
                self
            }
        )*
    };
}

/// List request for one resource kind
pub struct ListRequest<'a, T: Record> {
    session: &'a SdkSession,
    params: QueryParams,
    _record: PhantomData<T>,
}

/// Single record request
pub struct GetRequest<'a, T: Record> {
    session: &'a SdkSession,
    path: String,
    params: QueryParams,
    _record: PhantomData<T>,
}

impl<'a, T: Record> ListRequest<'a, T> {
    pub(crate) fn new(session: &'a SdkSession) -> Self {
        Self {
            session,
            params: QueryParams::new(),
            _record: PhantomData,
        }
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.params.set("page_size", size.to_string());
        self
    }

    string_setters! {
        cursor => "cursor",
        direction => "direction",
        order_by => "order_by",
        updated_max_timestamp => "updated_max_timestamp",
        updated_min_timestamp => "updated_min_timestamp",
        status => "status",
        user => "user",
    }

    flag_setters! {
        include_fees => "include_fees",
    }

    /// Parameters collected so far
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub async fn send(self) -> Result<Page<T>> {
        let url = join_url(&self.session.api_url, T::KIND.path());

        debug!("SDK list {} with {} params", T::KIND, self.params.len());

        let request = self.session.http.get(&url).query(&self.params);
        send_json(request, &T::KIND.to_string()).await
    }
}

impl<'a> ListRequest<'a, crate::domain::Asset> {
    string_setters! {
        collection => "collection",
        metadata => "metadata",
        name => "name",
    }

    flag_setters! {
        buy_orders => "buy_orders",
        sell_orders => "sell_orders",
    }
}

impl<'a> ListRequest<'a, crate::domain::Collection> {
    string_setters! {
        blacklist => "blacklist",
        keyword => "keyword",
        whitelist => "whitelist",
    }
}

impl<'a> ListRequest<'a, crate::domain::Order> {
    string_setters! {
        auxiliary_fee_percentages => "auxiliary_fee_percentages",
        auxiliary_fee_recipients => "auxiliary_fee_recipients",
        buy_asset_id => "buy_asset_id",
        buy_max_quantity => "buy_max_quantity",
        buy_metadata => "buy_metadata",
        buy_min_quantity => "buy_min_quantity",
        buy_token_address => "buy_token_address",
        buy_token_id => "buy_token_id",
        buy_token_name => "buy_token_name",
        buy_token_type => "buy_token_type",
        max_timestamp => "max_timestamp",
        min_timestamp => "min_timestamp",
        sell_asset_id => "sell_asset_id",
        sell_max_quantity => "sell_max_quantity",
        sell_metadata => "sell_metadata",
        sell_min_quantity => "sell_min_quantity",
        sell_token_address => "sell_token_address",
        sell_token_id => "sell_token_id",
        sell_token_name => "sell_token_name",
        sell_token_type => "sell_token_type",
    }
}

impl<'a, T: Record> GetRequest<'a, T> {
    pub(crate) fn new(session: &'a SdkSession, path: String) -> Self {
        Self {
            session,
            path,
            params: QueryParams::new(),
            _record: PhantomData,
        }
    }

    /// Only sends `include_fees` when it is set
    pub fn include_fees(mut self, include_fees: bool) -> Self {
        self.params.set_flag("include_fees", include_fees);
        self
    }

    pub async fn send(self) -> Result<T> {
        let url = join_url(&self.session.api_url, &self.path);

        debug!("SDK get {}", url);

        let request = self.session.http.get(&url).query(&self.params);
        send_json(request, &T::KIND.to_string()).await
    }
}

use async_trait::async_trait;

use common::models::{OpenOrder, Side};

use crate::error::ExchangeError;

/// The operations the execution engine needs from a futures exchange.
/// `BinanceFuturesClient` is the production implementation; tests mock this
/// trait instead of standing up HTTP.
#[async_trait]
pub trait FuturesExchange: Send + Sync {
    /// Quote-currency wallet balance of the futures account.
    async fn wallet_balance(&self) -> Result<f64, ExchangeError>;

    async fn mark_price(&self, symbol: &str) -> Result<f64, ExchangeError>;

    /// Maximum initial leverage from the symbol's first leverage bracket.
    async fn leverage_bracket(&self, symbol: &str) -> Result<u32, ExchangeError>;

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<(), ExchangeError>;

    /// Close-position stop-market order triggered on mark price.
    async fn place_stop_market(
        &self,
        symbol: &str,
        side: Side,
        stop_price: f64,
    ) -> Result<u64, ExchangeError>;

    /// Close-position take-profit-market order triggered on mark price.
    async fn place_take_profit_market(
        &self,
        symbol: &str,
        side: Side,
        stop_price: f64,
    ) -> Result<u64, ExchangeError>;

    async fn place_limit(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
        price: f64,
    ) -> Result<u64, ExchangeError>;

    async fn place_market(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
    ) -> Result<u64, ExchangeError>;

    async fn place_trailing_stop(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
        activation_price: f64,
        callback_rate: f64,
    ) -> Result<u64, ExchangeError>;

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<(), ExchangeError>;

    async fn open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>, ExchangeError>;
}

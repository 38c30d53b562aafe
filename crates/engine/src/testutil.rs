use async_trait::async_trait;
use mockall::mock;

use common::models::{ExecutionChain, OpenOrder, OrderKind, OrderRecord, Side, Signal};
use exchange::{ExchangeError, FuturesExchange};

mock! {
    pub Exchange {}

    #[async_trait]
    impl FuturesExchange for Exchange {
        async fn wallet_balance(&self) -> Result<f64, ExchangeError>;
        async fn mark_price(&self, symbol: &str) -> Result<f64, ExchangeError>;
        async fn leverage_bracket(&self, symbol: &str) -> Result<u32, ExchangeError>;
        async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<(), ExchangeError>;
        async fn place_stop_market(
            &self,
            symbol: &str,
            side: Side,
            stop_price: f64,
        ) -> Result<u64, ExchangeError>;
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
}

pub fn sample_signal() -> Signal {
    Signal {
        symbol: "BTCUSDT".to_string(),
        side: Side::Buy,
        entry_range: (100.0, 105.0),
        targets: vec![110.0, 121.0],
        activation_price: 110.0,
        take_profit: 133.0,
        stop_loss: 90.0,
    }
}

pub fn rejected(reason: &str) -> ExchangeError {
    ExchangeError::Rejected {
        status: 400,
        reason: reason.to_string(),
    }
}

pub fn chain_of(records: &[(u64, OrderKind)]) -> ExecutionChain {
    let mut chain = ExecutionChain::default();
    for &(id, kind) in records {
        chain.push(OrderRecord {
            id,
            kind,
            symbol: "BTCUSDT".to_string(),
        });
    }
    chain
}

use std::sync::Arc;

use tracing::{info, warn};

use common::models::{ExecutionChain, OrderKind, OrderRecord, Signal};
use common::notify::Notifier;
use exchange::{ExchangeError, FuturesExchange};

use crate::calc::{self, EntryMode};
use crate::error::{EngineError, error_notification};
use crate::monitor::{self, MonitorSettings};

/// Fraction of the wallet balance committed to the protective + entry chain.
const CHAIN_BALANCE_FRACTION: f64 = 0.03;
/// The trailing order is sized slightly larger to absorb rounding drift
/// between the exchange's own conversions and the locally computed quantity.
const TRAILING_BALANCE_FRACTION: f64 = 0.031;

pub struct Orchestrator {
    exchange: Arc<dyn FuturesExchange>,
    notifier: Notifier,
    monitor: MonitorSettings,
}

impl Orchestrator {
    pub fn new(
        exchange: Arc<dyn FuturesExchange>,
        notifier: Notifier,
        monitor: MonitorSettings,
    ) -> Self {
        Self {
            exchange,
            notifier,
            monitor,
        }
    }

    /// Runs one signal from precondition checks to the terminal monitoring
    /// event. Every placed order, rollback, fill and failure surfaces as
    /// exactly one notification; the caller maps the returned error into
    /// its own single notification.
    pub async fn execute_signal(&self, signal: Signal) -> Result<(), EngineError> {
        let symbol = signal.symbol.clone();

        let balance = precondition(&symbol, self.exchange.wallet_balance().await)?;
        let mark_price = precondition(&symbol, self.exchange.mark_price(&symbol).await)?;
        let leverage = precondition(&symbol, self.exchange.leverage_bracket(&symbol).await)?;
        precondition(&symbol, self.exchange.set_leverage(&symbol, leverage).await)?;
        info!(
            "{}: preconditions ok, balance={}, mark={}, leverage={}",
            symbol, balance, mark_price, leverage
        );

        let quantity = round_quantity(balance * CHAIN_BALANCE_FRACTION / mark_price);
        let mut chain = ExecutionChain::default();

        if let Err(e) = self
            .place_critical_chain(&signal, mark_price, quantity, &mut chain)
            .await
        {
            self.rollback(&symbol, &chain).await;
            return Err(e);
        }

        let trailing_quantity = round_quantity(balance * TRAILING_BALANCE_FRACTION / mark_price);
        self.place_trailing(&signal, trailing_quantity, &mut chain)
            .await;

        monitor::watch_until_fill(
            self.exchange.as_ref(),
            &self.notifier,
            &symbol,
            &chain,
            &self.monitor,
        )
        .await?;

        self.notifier.notify(format!("{symbol} signal complete"));
        Ok(())
    }

    /// Stop-loss, then take-profit, then the entry order. The order matters:
    /// a later failure can only be rolled back if the earlier placements
    /// were recorded.
    async fn place_critical_chain(
        &self,
        signal: &Signal,
        mark_price: f64,
        quantity: f64,
        chain: &mut ExecutionChain,
    ) -> Result<(), EngineError> {
        let symbol = &signal.symbol;
        let protective_side = signal.opposite_side();
        let rejected = |e: ExchangeError| EngineError::ExchangeRejected {
            symbol: symbol.clone(),
            reason: e.to_string(),
        };

        let stop_price = signal.stop_loss.round();
        let id = self
            .exchange
            .place_stop_market(symbol, protective_side, stop_price)
            .await
            .map_err(rejected)?;
        chain.push(OrderRecord {
            id,
            kind: OrderKind::StopMarket,
            symbol: symbol.clone(),
        });
        self.notifier
            .notify(format!("{symbol}: stop-loss placed, stop price = {stop_price}"));

        let id = self
            .exchange
            .place_take_profit_market(symbol, protective_side, signal.take_profit)
            .await
            .map_err(rejected)?;
        chain.push(OrderRecord {
            id,
            kind: OrderKind::TakeProfitMarket,
            symbol: symbol.clone(),
        });
        self.notifier.notify(format!(
            "{symbol}: take-profit placed, stop price = {}",
            signal.take_profit
        ));

        match calc::decide_entry_mode(mark_price, signal.entry_range) {
            EntryMode::Market => {
                let id = self
                    .exchange
                    .place_market(symbol, signal.side, quantity)
                    .await
                    .map_err(rejected)?;
                chain.push(OrderRecord {
                    id,
                    kind: OrderKind::Market,
                    symbol: symbol.clone(),
                });
                self.notifier.notify(format!(
                    "{symbol}: market {} entry placed, quantity = {quantity}",
                    signal.side
                ));
            }
            EntryMode::Limit(price) => {
                let id = self
                    .exchange
                    .place_limit(symbol, signal.side, quantity, price)
                    .await
                    .map_err(rejected)?;
                chain.push(OrderRecord {
                    id,
                    kind: OrderKind::Limit,
                    symbol: symbol.clone(),
                });
                self.notifier.notify(format!(
                    "{symbol}: limit {} entry placed, quantity = {quantity}, price = {price}",
                    signal.side
                ));
            }
        }

        Ok(())
    }

    async fn rollback(&self, symbol: &str, chain: &ExecutionChain) {
        for record in chain.iter() {
            if let Err(e) = self.exchange.cancel_order(symbol, record.id).await {
                warn!(
                    "{}: failed to cancel order {} during rollback: {}",
                    symbol, record.id, e
                );
            }
        }
        self.notifier
            .notify(format!("{symbol}: rolled back {} placed orders", chain.len()));
    }

    /// Best effort: a rejected trailing stop is reported and the flow
    /// proceeds to monitoring with the critical chain intact.
    async fn place_trailing(&self, signal: &Signal, quantity: f64, chain: &mut ExecutionChain) {
        let symbol = &signal.symbol;
        let callback_rate = calc::average_step_percent(&signal.targets);

        match self
            .exchange
            .place_trailing_stop(
                symbol,
                signal.opposite_side(),
                quantity,
                signal.activation_price,
                callback_rate,
            )
            .await
        {
            Ok(id) => {
                chain.push(OrderRecord {
                    id,
                    kind: OrderKind::TrailingStopMarket,
                    symbol: symbol.clone(),
                });
                self.notifier.notify(format!(
                    "{symbol}: trailing stop placed, activation = {}, callback = {callback_rate}%",
                    signal.activation_price
                ));
            }
            Err(e) => {
                let err = EngineError::TrailingPlacementFailed {
                    symbol: symbol.clone(),
                    reason: e.to_string(),
                };
                self.notifier.notify(error_notification(&err));
            }
        }
    }
}

fn precondition<T>(symbol: &str, result: Result<T, ExchangeError>) -> Result<T, EngineError> {
    result.map_err(|e| EngineError::PreconditionUnavailable {
        symbol: symbol.to_string(),
        reason: e.to_string(),
    })
}

fn round_quantity(quantity: f64) -> f64 {
    (quantity * 1000.0).round() / 1000.0
}

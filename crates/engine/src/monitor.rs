use std::collections::HashSet;
use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use common::models::{ExecutionChain, OpenOrder, OrderKind};
use common::notify::Notifier;

use exchange::FuturesExchange;

use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    /// `None` watches until a fill is observed, however long that takes.
    pub timeout: Option<Duration>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(90),
            timeout: None,
        }
    }
}

/// Polls the symbol's open orders until one of the initially observed
/// market-trigger orders disappears, i.e. was filled or cancelled
/// externally. The remaining chain orders are then cancelled and the
/// consumed kind reported.
///
/// Orders are tracked by exchange id, so two open orders of the same kind
/// cannot be confused.
pub async fn watch_until_fill(
    exchange: &dyn FuturesExchange,
    notifier: &Notifier,
    symbol: &str,
    chain: &ExecutionChain,
    settings: &MonitorSettings,
) -> Result<Option<OrderKind>, EngineError> {
    let initial = snapshot(exchange, symbol).await?;
    info!(
        "{}: watching {} open market-trigger orders",
        symbol,
        initial.len()
    );

    let deadline = settings.timeout.map(|timeout| Instant::now() + timeout);

    loop {
        time::sleep(settings.poll_interval).await;

        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                notifier.notify(format!(
                    "{symbol}: fill watch timed out, open orders left in place"
                ));
                return Ok(None);
            }
        }

        let current: HashSet<u64> = snapshot(exchange, symbol)
            .await?
            .iter()
            .map(|order| order.id)
            .collect();

        let Some(consumed) = initial.iter().find(|order| !current.contains(&order.id)) else {
            debug!("{}: no change across {} open orders", symbol, current.len());
            continue;
        };

        cleanup(exchange, symbol, chain, consumed.id).await;
        notifier.notify(format!(
            "{}: {} order was filled, position should be closed",
            symbol, consumed.kind
        ));
        return Ok(Some(consumed.kind));
    }
}

async fn snapshot(
    exchange: &dyn FuturesExchange,
    symbol: &str,
) -> Result<Vec<OpenOrder>, EngineError> {
    let orders = exchange
        .open_orders(symbol)
        .await
        .map_err(|e| EngineError::ExchangeRejected {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;
    Ok(orders
        .into_iter()
        .filter(|order| order.kind.is_market_trigger())
        .collect())
}

/// Cancels everything recorded for the signal except the consumed order.
/// Individual cancel failures are logged and skipped so one stuck order
/// does not leave the rest dangling.
async fn cleanup(
    exchange: &dyn FuturesExchange,
    symbol: &str,
    chain: &ExecutionChain,
    consumed_id: u64,
) {
    for record in chain.iter().filter(|record| record.id != consumed_id) {
        if let Err(e) = exchange.cancel_order(symbol, record.id).await {
            warn!(
                "{}: failed to cancel order {} after fill: {}",
                symbol, record.id, e
            );
        }
    }
}

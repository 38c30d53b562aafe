use serde::{Deserialize, Serialize};

/// Futures order types the engine places or watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    StopMarket,
    TakeProfitMarket,
    Limit,
    Market,
    TrailingStopMarket,
}

impl OrderKind {
    pub fn as_exchange_str(self) -> &'static str {
        match self {
            OrderKind::StopMarket => "STOP_MARKET",
            OrderKind::TakeProfitMarket => "TAKE_PROFIT_MARKET",
            OrderKind::Limit => "LIMIT",
            OrderKind::Market => "MARKET",
            OrderKind::TrailingStopMarket => "TRAILING_STOP_MARKET",
        }
    }

    pub fn from_exchange_str(s: &str) -> Option<OrderKind> {
        match s {
            "STOP_MARKET" => Some(OrderKind::StopMarket),
            "TAKE_PROFIT_MARKET" => Some(OrderKind::TakeProfitMarket),
            "LIMIT" => Some(OrderKind::Limit),
            "MARKET" => Some(OrderKind::Market),
            "TRAILING_STOP_MARKET" => Some(OrderKind::TrailingStopMarket),
            _ => None,
        }
    }

    /// Kinds that trigger a market execution; the fill monitor only watches
    /// these. Resting limit orders are excluded.
    pub fn is_market_trigger(self) -> bool {
        !matches!(self, OrderKind::Limit)
    }
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_exchange_str())
    }
}

/// One successfully placed order, as recorded by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: u64,
    pub kind: OrderKind,
    pub symbol: String,
}

/// An open order as reported by the exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrder {
    pub id: u64,
    pub kind: OrderKind,
}

/// Append-only list of the orders placed for one signal, owned by the
/// worker processing that signal. Used for coordinated rollback and for
/// post-fill cleanup.
#[derive(Debug, Default)]
pub struct ExecutionChain {
    records: Vec<OrderRecord>,
}

impl ExecutionChain {
    pub fn push(&mut self, record: OrderRecord) {
        self.records.push(record);
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_exchange_strings() {
        for kind in [
            OrderKind::StopMarket,
            OrderKind::TakeProfitMarket,
            OrderKind::Limit,
            OrderKind::Market,
            OrderKind::TrailingStopMarket,
        ] {
            assert_eq!(OrderKind::from_exchange_str(kind.as_exchange_str()), Some(kind));
        }
        assert_eq!(OrderKind::from_exchange_str("STOP"), None);
    }

    #[test]
    fn limit_is_not_a_market_trigger() {
        assert!(!OrderKind::Limit.is_market_trigger());
        assert!(OrderKind::StopMarket.is_market_trigger());
        assert!(OrderKind::TrailingStopMarket.is_market_trigger());
    }
}

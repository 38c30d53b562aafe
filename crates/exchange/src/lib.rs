pub mod binance;
pub mod error;
pub mod traits;

pub use binance::BinanceFuturesClient;
pub use error::ExchangeError;
pub use traits::FuturesExchange;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::{debug, error};

use common::config::Config;
use common::models::{OpenOrder, OrderKind, Side};

use crate::error::ExchangeError;
use crate::traits::FuturesExchange;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct AssetBalance {
    asset: String,
    #[serde(rename = "walletBalance")]
    wallet_balance: String,
}

#[derive(Debug, Deserialize)]
struct AccountInformation {
    assets: Vec<AssetBalance>,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

#[derive(Debug, Deserialize)]
struct LeverageBracket {
    #[serde(rename = "initialLeverage")]
    initial_leverage: u32,
}

#[derive(Debug, Deserialize)]
struct SymbolBrackets {
    brackets: Vec<LeverageBracket>,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    #[serde(rename = "orderId")]
    order_id: u64,
}

#[derive(Debug, Deserialize)]
struct OpenOrderResponse {
    #[serde(rename = "orderId")]
    order_id: u64,
    #[serde(rename = "type")]
    order_type: String,
}

const QUOTE_ASSET: &str = "USDT";

#[derive(Clone)]
pub struct BinanceFuturesClient {
    client: Client,
    base_url: String,
    api_key: String,
    secret_key: String,
}

impl BinanceFuturesClient {
    pub fn new(api_key: String, secret_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("signal-executor/0.1.0")
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client."),
            base_url,
            api_key,
            secret_key,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.binance_api_key.clone(),
            cfg.binance_secret_key.clone(),
            cfg.binance_base_url.clone(),
        )
    }

    fn sign(&self, query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis() as u64
    }

    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: String,
    ) -> Result<T, ExchangeError> {
        let query = if params.is_empty() {
            format!("timestamp={}", Self::timestamp_ms())
        } else {
            format!("{}&timestamp={}", params, Self::timestamp_ms())
        };
        let signature = self.sign(&query);
        let url = format!("{}{}?{}&signature={}", self.base_url, path, query, signature);

        let resp = self
            .client
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let reason = resp.text().await.unwrap_or_default();
            error!("Binance request to {} failed: {}", path, reason);
            return Err(ExchangeError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        Ok(resp.json::<T>().await?)
    }

    async fn send_public<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ExchangeError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let reason = resp.text().await.unwrap_or_default();
            error!("Binance request to {} failed: {}", path, reason);
            return Err(ExchangeError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        Ok(resp.json::<T>().await?)
    }

    async fn submit_order(&self, symbol: &str, params: String) -> Result<u64, ExchangeError> {
        debug!("Submitting order: {} {}", symbol, params);
        let resp: OrderResponse = self
            .send_signed(Method::POST, "/fapi/v1/order", params)
            .await?;
        Ok(resp.order_id)
    }

    fn parse_price(raw: &str) -> Result<f64, ExchangeError> {
        raw.parse::<f64>()
            .map_err(|_| ExchangeError::Malformed(format!("unparsable price {raw:?}")))
    }
}

#[async_trait]
impl FuturesExchange for BinanceFuturesClient {
    async fn wallet_balance(&self) -> Result<f64, ExchangeError> {
        let account: AccountInformation = self
            .send_signed(Method::GET, "/fapi/v2/account", String::new())
            .await?;

        let balance = account
            .assets
            .iter()
            .find(|a| a.asset == QUOTE_ASSET)
            .ok_or(ExchangeError::MissingData("USDT asset balance"))?;
        Self::parse_price(&balance.wallet_balance)
    }

    async fn mark_price(&self, symbol: &str) -> Result<f64, ExchangeError> {
        let ticker: TickerPrice = self
            .send_public("/fapi/v1/ticker/price", &[("symbol", symbol)])
            .await?;
        Self::parse_price(&ticker.price)
    }

    async fn leverage_bracket(&self, symbol: &str) -> Result<u32, ExchangeError> {
        let brackets: Vec<SymbolBrackets> = self
            .send_signed(
                Method::GET,
                "/fapi/v1/leverageBracket",
                format!("symbol={symbol}"),
            )
            .await?;

        brackets
            .first()
            .and_then(|b| b.brackets.first())
            .map(|b| b.initial_leverage)
            .ok_or(ExchangeError::MissingData("leverage bracket"))
    }

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<(), ExchangeError> {
        let _: serde_json::Value = self
            .send_signed(
                Method::POST,
                "/fapi/v1/leverage",
                format!("symbol={symbol}&leverage={leverage}"),
            )
            .await?;
        Ok(())
    }

    async fn place_stop_market(
        &self,
        symbol: &str,
        side: Side,
        stop_price: f64,
    ) -> Result<u64, ExchangeError> {
        let params = format!(
            "symbol={symbol}&side={side}&type=STOP_MARKET&stopPrice={stop_price}\
             &closePosition=true&workingType=MARK_PRICE&priceProtect=TRUE&timeInForce=GTC"
        );
        self.submit_order(symbol, params).await
    }

    async fn place_take_profit_market(
        &self,
        symbol: &str,
        side: Side,
        stop_price: f64,
    ) -> Result<u64, ExchangeError> {
        let params = format!(
            "symbol={symbol}&side={side}&type=TAKE_PROFIT_MARKET&stopPrice={stop_price}\
             &closePosition=true&workingType=MARK_PRICE&priceProtect=TRUE&timeInForce=GTC"
        );
        self.submit_order(symbol, params).await
    }

    async fn place_limit(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
        price: f64,
    ) -> Result<u64, ExchangeError> {
        let params = format!(
            "symbol={symbol}&side={side}&type=LIMIT&quantity={quantity}&price={price}\
             &timeInForce=GTC"
        );
        self.submit_order(symbol, params).await
    }

    async fn place_market(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
    ) -> Result<u64, ExchangeError> {
        let params = format!("symbol={symbol}&side={side}&type=MARKET&quantity={quantity}");
        self.submit_order(symbol, params).await
    }

    async fn place_trailing_stop(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
        activation_price: f64,
        callback_rate: f64,
    ) -> Result<u64, ExchangeError> {
        let params = format!(
            "symbol={symbol}&side={side}&type=TRAILING_STOP_MARKET&quantity={quantity}\
             &activationPrice={activation_price}&callbackRate={callback_rate}\
             &workingType=MARK_PRICE&timeInForce=GTC"
        );
        self.submit_order(symbol, params).await
    }

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<(), ExchangeError> {
        let _: serde_json::Value = self
            .send_signed(
                Method::DELETE,
                "/fapi/v1/order",
                format!("symbol={symbol}&orderId={order_id}"),
            )
            .await?;
        Ok(())
    }

    async fn open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>, ExchangeError> {
        let orders: Vec<OpenOrderResponse> = self
            .send_signed(
                Method::GET,
                "/fapi/v1/openOrders",
                format!("symbol={symbol}"),
            )
            .await?;

        // Order types this engine never places are skipped rather than failed
        // on, the symbol may carry unrelated manual orders.
        Ok(orders
            .into_iter()
            .filter_map(|o| {
                OrderKind::from_exchange_str(&o.order_type).map(|kind| OpenOrder {
                    id: o.order_id,
                    kind,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_binance_documented_vector() {
        let client = BinanceFuturesClient::new(
            "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A".to_string(),
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j".to_string(),
            "https://fapi.binance.com".to_string(),
        );
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1\
                     &recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            client.sign(query),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn open_order_payload_maps_known_kinds_only() {
        let raw = r#"[
            {"orderId": 1, "type": "STOP_MARKET"},
            {"orderId": 2, "type": "TAKE_PROFIT_MARKET"},
            {"orderId": 3, "type": "LIQUIDATION"}
        ]"#;
        let parsed: Vec<OpenOrderResponse> = serde_json::from_str(raw).unwrap();
        let mapped: Vec<OpenOrder> = parsed
            .into_iter()
            .filter_map(|o| {
                OrderKind::from_exchange_str(&o.order_type).map(|kind| OpenOrder {
                    id: o.order_id,
                    kind,
                })
            })
            .collect();
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped[0].kind, OrderKind::StopMarket);
        assert_eq!(mapped[1].id, 2);
    }
}

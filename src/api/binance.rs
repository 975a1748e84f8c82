use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sha2::Sha256;

use crate::api::{Exchange, PositionInfo};
use crate::error::{BotError, Result};
use crate::models::{Candle, Order, OrderSide};

const FAPI_MAINNET: &str = "https://fapi.binance.com";
const FAPI_TESTNET: &str = "https://testnet.binancefuture.com";

type HmacSha256 = Hmac<Sha256>;

/// Client for the Binance USDT-M futures REST API.
///
/// Signed endpoints (orders, positions, leverage) carry a millisecond
/// timestamp and an HMAC-SHA256 signature of the query string, plus
/// the `X-MBX-APIKEY` header.
#[derive(Clone)]
pub struct BinanceFuturesClient {
    client: Client,
    api_key: String,
    api_secret: String,
    base_url: String,
}

// ============== Response Types ==============

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    status: String,
    quote_asset: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    order_id: i64,
    symbol: String,
    side: String,
    executed_qty: String,
    avg_price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionRisk {
    symbol: String,
    position_amt: String,
    entry_price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PremiumIndex {
    mark_price: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

// ============== Implementation ==============

impl BinanceFuturesClient {
    pub fn new(api_key: String, api_secret: String, use_testnet: bool) -> Self {
        let base_url = if use_testnet { FAPI_TESTNET } else { FAPI_MAINNET };
        Self::with_base_url(api_key, api_secret, base_url)
    }

    /// Build against an explicit base URL (tests point this at a mock
    /// server).
    pub fn with_base_url(api_key: String, api_secret: String, base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("HTTP client build failed");
        Self {
            client,
            api_key,
            api_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Sign a query string with HMAC-SHA256.
    fn sign(&self, query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC key error");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn timestamp_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Decode a non-success response body into the exchange's
    /// `{code, msg}` error shape where possible.
    fn decode_error(status: StatusCode, body: &str) -> BotError {
        match serde_json::from_str::<ApiError>(body) {
            Ok(e) => BotError::OrderRejected {
                code: e.code,
                msg: e.msg,
            },
            Err(_) => BotError::DataFetch(format!("HTTP {status}: {body}")),
        }
    }

    fn parse_f64(value: &str, field: &str) -> Result<f64> {
        value
            .parse::<f64>()
            .map_err(|_| BotError::Parse(format!("bad {field}: {value:?}")))
    }

    fn parse_time_ms(ms: i64, field: &str) -> Result<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or_else(|| BotError::Parse(format!("bad {field}: {ms}")))
    }

    /// One kline row is a heterogeneous JSON array:
    /// [openTime, open, high, low, close, volume, closeTime, ...]
    fn parse_kline(row: &[serde_json::Value]) -> Result<Candle> {
        if row.len() < 7 {
            return Err(BotError::Parse(format!("kline row too short: {}", row.len())));
        }
        let num = |i: usize, field: &str| -> Result<f64> {
            row[i]
                .as_str()
                .ok_or_else(|| BotError::Parse(format!("kline {field} not a string")))
                .and_then(|s| Self::parse_f64(s, field))
        };
        let ms = |i: usize, field: &str| -> Result<DateTime<Utc>> {
            row[i]
                .as_i64()
                .ok_or_else(|| BotError::Parse(format!("kline {field} not an integer")))
                .and_then(|v| Self::parse_time_ms(v, field))
        };

        Ok(Candle {
            open_time: ms(0, "openTime")?,
            open: num(1, "open")?,
            high: num(2, "high")?,
            low: num(3, "low")?,
            close: num(4, "close")?,
            volume: num(5, "volume")?,
            close_time: ms(6, "closeTime")?,
        })
    }
}

#[async_trait::async_trait]
impl Exchange for BinanceFuturesClient {
    /// Endpoint: GET /fapi/v1/exchangeInfo
    async fn list_tradable_symbols(
        &self,
        quote_asset: &str,
        exclude_prefixes: &[String],
    ) -> Result<Vec<String>> {
        let url = format!("{}/fapi/v1/exchangeInfo", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::DataFetch(format!(
                "exchangeInfo HTTP {status}: {body}"
            )));
        }

        let info: ExchangeInfo = response
            .json()
            .await
            .map_err(|e| BotError::Parse(format!("exchangeInfo: {e}")))?;

        let symbols = info
            .symbols
            .into_iter()
            .filter(|s| s.status == "TRADING" && s.quote_asset == quote_asset)
            .map(|s| s.symbol)
            .filter(|sym| !exclude_prefixes.iter().any(|p| sym.starts_with(p.as_str())))
            .collect();

        Ok(symbols)
    }

    /// Endpoint: GET /fapi/v1/klines?symbol=&interval=&limit=
    async fn get_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let url = format!(
            "{}/fapi/v1/klines?symbol={}&interval={}&limit={}",
            self.base_url, symbol, interval, limit
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::DataFetch(format!(
                "klines {symbol} HTTP {status}: {body}"
            )));
        }

        let rows: Vec<Vec<serde_json::Value>> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(format!("klines {symbol}: {e}")))?;

        rows.iter().map(|row| Self::parse_kline(row)).collect()
    }

    /// Endpoint: POST /fapi/v1/order (signed)
    async fn submit_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
    ) -> Result<Order> {
        let params = format!(
            "symbol={}&side={}&type=MARKET&quantity={}&newOrderRespType=RESULT&timestamp={}",
            symbol,
            side.as_str(),
            quantity,
            self.timestamp_ms()
        );
        let signature = self.sign(&params);
        let body = format!("{params}&signature={signature}");
        let url = format!("{}/fapi/v1/order", self.base_url);

        tracing::info!("Placing {} {} {} @ MARKET", side.as_str(), quantity, symbol);

        let response = self
            .client
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status != StatusCode::OK {
            return Err(Self::decode_error(status, &text));
        }

        let parsed: OrderResponse = serde_json::from_str(&text)
            .map_err(|e| BotError::Parse(format!("order response: {e}")))?;

        let fill_price = Self::parse_f64(&parsed.avg_price, "avgPrice")?;
        let executed_qty = Self::parse_f64(&parsed.executed_qty, "executedQty")?;

        tracing::info!(
            "Order filled: id={} {} {} qty={} avgPx={}",
            parsed.order_id,
            parsed.side,
            parsed.symbol,
            executed_qty,
            fill_price
        );

        Ok(Order {
            symbol: parsed.symbol,
            side,
            quantity: executed_qty,
            fill_price,
            order_id: parsed.order_id,
        })
    }

    /// Endpoint: GET /fapi/v2/positionRisk (signed)
    async fn get_position_info(&self, symbol: &str) -> Result<PositionInfo> {
        let params = format!("symbol={}&timestamp={}", symbol, self.timestamp_ms());
        let signature = self.sign(&params);
        let url = format!(
            "{}/fapi/v2/positionRisk?{}&signature={}",
            self.base_url, params, signature
        );

        let response = self
            .client
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Monitoring(format!(
                "positionRisk {symbol} HTTP {status}: {body}"
            )));
        }

        let rows: Vec<PositionRisk> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(format!("positionRisk {symbol}: {e}")))?;

        // One-way mode returns a single row per symbol; a missing row
        // means no position.
        let Some(row) = rows.into_iter().find(|r| r.symbol == symbol) else {
            return Ok(PositionInfo {
                quantity: 0.0,
                entry_price: 0.0,
            });
        };

        Ok(PositionInfo {
            quantity: Self::parse_f64(&row.position_amt, "positionAmt")?,
            entry_price: Self::parse_f64(&row.entry_price, "entryPrice")?,
        })
    }

    /// Endpoint: GET /fapi/v1/premiumIndex?symbol=
    async fn get_mark_price(&self, symbol: &str) -> Result<f64> {
        let url = format!("{}/fapi/v1/premiumIndex?symbol={}", self.base_url, symbol);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Monitoring(format!(
                "premiumIndex {symbol} HTTP {status}: {body}"
            )));
        }

        let parsed: PremiumIndex = response
            .json()
            .await
            .map_err(|e| BotError::Parse(format!("premiumIndex {symbol}: {e}")))?;

        Self::parse_f64(&parsed.mark_price, "markPrice")
    }

    /// Endpoint: POST /fapi/v1/leverage (signed)
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<()> {
        let params = format!(
            "symbol={}&leverage={}&timestamp={}",
            symbol,
            leverage,
            self.timestamp_ms()
        );
        let signature = self.sign(&params);
        let body = format!("{params}&signature={signature}");
        let url = format!("{}/fapi/v1/leverage", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::decode_error(status, &text));
        }

        tracing::info!("Set leverage {}x for {}", leverage, symbol);
        Ok(())
    }
}

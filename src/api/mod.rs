pub mod binance;

pub use binance::BinanceFuturesClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Candle, Order, OrderSide};

/// Live position state for one symbol, as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionInfo {
    /// Signed quantity; zero means no open position.
    pub quantity: f64,
    pub entry_price: f64,
}

/// The exchange collaborator seam. One authenticated client is built
/// at startup and shared (behind `Arc`) by the orchestrator, the
/// executor, and every concurrent position monitor.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Tradable symbols quoted in `quote_asset`, excluding any symbol
    /// starting with one of `exclude_prefixes`.
    async fn list_tradable_symbols(
        &self,
        quote_asset: &str,
        exclude_prefixes: &[String],
    ) -> Result<Vec<String>>;

    /// Bounded-length candle series, oldest-first.
    async fn get_candles(&self, symbol: &str, interval: &str, limit: usize)
        -> Result<Vec<Candle>>;

    async fn submit_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
    ) -> Result<Order>;

    async fn get_position_info(&self, symbol: &str) -> Result<PositionInfo>;

    async fn get_mark_price(&self, symbol: &str) -> Result<f64>;

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<()>;
}

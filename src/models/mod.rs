use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bucket for a fixed interval, oldest-first in a series.
/// Immutable once fetched; only `close` is consumed downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: DateTime<Utc>,
}

/// Directional call for one symbol at one tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Signal {
    Long,
    Short,
    Wait,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Long => write!(f, "LONG"),
            Signal::Short => write!(f, "SHORT"),
            Signal::Wait => write!(f, "WAIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }

    /// Side that flattens a position opened with this side.
    pub fn opposite(&self) -> OrderSide {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl Signal {
    /// Entry side for a directional signal. `Wait` has no side.
    pub fn order_side(&self) -> Option<OrderSide> {
        match self {
            Signal::Long => Some(OrderSide::Buy),
            Signal::Short => Some(OrderSide::Sell),
            Signal::Wait => None,
        }
    }
}

/// A submitted and filled market order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: f64,
    /// Average fill price reported by the exchange. May differ from
    /// the reference price used for sizing (slippage).
    pub fill_price: f64,
    pub order_id: i64,
}

/// An open futures position, owned by the monitor tracking it.
/// Exists only between order fill and close; one per symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub entry_price: f64,
    /// Positive = long, negative = short.
    pub signed_quantity: f64,
    pub target_profit: f64,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    pub fn from_order(order: &Order, target_profit: f64) -> Self {
        let signed_quantity = match order.side {
            OrderSide::Buy => order.quantity,
            OrderSide::Sell => -order.quantity,
        };
        Self {
            symbol: order.symbol.clone(),
            entry_price: order.fill_price,
            signed_quantity,
            target_profit,
            opened_at: Utc::now(),
        }
    }

    /// Unrealized PnL at the given mark price.
    pub fn unrealized_pnl(&self, mark_price: f64) -> f64 {
        (mark_price - self.entry_price) * self.signed_quantity
    }
}

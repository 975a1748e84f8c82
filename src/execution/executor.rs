use crate::api::Exchange;
use crate::error::{BotError, Result};
use crate::models::{Order, Signal};

/// Sizes and submits entry orders.
///
/// Every trade commits the same fixed notional; quantity is the
/// notional divided by the reference price, rounded to the nearest
/// four decimal places. No retry on rejection.
#[derive(Debug, Clone)]
pub struct OrderExecutor {
    investment_per_trade: f64,
    leverage: u32,
}

impl OrderExecutor {
    pub fn new(investment_per_trade: f64, leverage: u32) -> Self {
        Self {
            investment_per_trade,
            leverage,
        }
    }

    /// Quantity for a trade at `reference_price`, rounded to the
    /// nearest 4 decimals.
    pub fn quantity_for(&self, reference_price: f64) -> f64 {
        round4(self.investment_per_trade / reference_price)
    }

    /// Submit a market order in `direction` sized from the reference
    /// price. The returned order carries the exchange's actual fill
    /// price, which may differ from `reference_price` under slippage.
    pub async fn execute<E: Exchange + ?Sized>(
        &self,
        exchange: &E,
        symbol: &str,
        direction: Signal,
        reference_price: f64,
    ) -> Result<Order> {
        let side = direction.order_side().ok_or_else(|| {
            BotError::Classification("cannot execute a WAIT directive".to_string())
        })?;

        if !reference_price.is_finite() || reference_price <= 0.0 {
            return Err(BotError::OrderRejected {
                code: 0,
                msg: format!("invalid reference price {reference_price} for {symbol}"),
            });
        }

        let quantity = self.quantity_for(reference_price);
        if quantity <= 0.0 {
            return Err(BotError::OrderRejected {
                code: 0,
                msg: format!(
                    "quantity rounds to zero ({} / {reference_price})",
                    self.investment_per_trade
                ),
            });
        }

        // Leverage failure is logged but does not block the entry;
        // the order then fills at the account's existing leverage.
        if let Err(e) = exchange.set_leverage(symbol, self.leverage).await {
            tracing::warn!("Failed to set leverage for {}: {}", symbol, e);
        }

        exchange.submit_market_order(symbol, side, quantity).await
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

use std::time::Duration;

use tokio::sync::watch;

use crate::api::Exchange;
use crate::error::{BotError, Result};
use crate::models::Position;

/// Terminal state of a monitored position.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorOutcome {
    /// Profit target reached, flattening order confirmed.
    ClosedAtTarget { pnl: f64 },
    /// Exchange reports zero quantity: closed outside this monitor
    /// (manual intervention, liquidation).
    ClosedExternally,
    /// Shutdown requested; the position is left open and unmonitored.
    Cancelled,
}

/// Supervises one open position until it closes.
///
/// Two states: Open (polling) and Closed (terminal). Each poll reads
/// the live position and mark price, and flattens with an opposite
/// market order once unrealized PnL reaches the target. There is no
/// stop-loss: the only exits are the profit target, external closure,
/// a monitoring failure, or shutdown.
#[derive(Debug, Clone)]
pub struct PositionMonitor {
    poll_interval: Duration,
}

impl PositionMonitor {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Run to a terminal state. Polls immediately on entry, then on
    /// the fixed interval. A flipped `shutdown` channel interrupts the
    /// wait between polls.
    ///
    /// Query or close-order failure is returned to the caller; there
    /// is no retry loop beyond the normal polling cadence.
    pub async fn run<E: Exchange + ?Sized>(
        &self,
        exchange: &E,
        position: &Position,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<MonitorOutcome> {
        tracing::info!(
            "Monitoring {} position: {} qty={} entry={} target={} (no stop-loss)",
            if position.signed_quantity > 0.0 { "long" } else { "short" },
            position.symbol,
            position.signed_quantity,
            position.entry_price,
            position.target_profit
        );

        loop {
            if *shutdown.borrow() {
                return self.cancelled(position);
            }

            if let Some(outcome) = self.poll_once(exchange, position).await? {
                return Ok(outcome);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    // A closed channel means the sender is gone and no
                    // further signal can arrive; stop instead of
                    // re-polling `changed()` every iteration.
                    if changed.is_err() || *shutdown.borrow() {
                        return self.cancelled(position);
                    }
                }
            }
        }
    }

    /// One poll of the Open state. `Ok(Some(..))` is a transition to
    /// Closed, `Ok(None)` stays Open.
    async fn poll_once<E: Exchange + ?Sized>(
        &self,
        exchange: &E,
        position: &Position,
    ) -> Result<Option<MonitorOutcome>> {
        let live = exchange.get_position_info(&position.symbol).await?;

        if live.quantity == 0.0 {
            tracing::info!(
                "{} position closed externally, monitor exiting",
                position.symbol
            );
            return Ok(Some(MonitorOutcome::ClosedExternally));
        }

        let mark_price = exchange.get_mark_price(&position.symbol).await?;
        let pnl = (mark_price - position.entry_price) * live.quantity;

        if pnl >= position.target_profit {
            let side = if live.quantity > 0.0 {
                crate::models::OrderSide::Sell
            } else {
                crate::models::OrderSide::Buy
            };
            exchange
                .submit_market_order(&position.symbol, side, live.quantity.abs())
                .await
                .map_err(|e| BotError::Monitoring(format!(
                    "close order for {} failed: {e}",
                    position.symbol
                )))?;

            tracing::info!(
                "Position closed for {} with profit: {:.4}",
                position.symbol,
                pnl
            );
            return Ok(Some(MonitorOutcome::ClosedAtTarget { pnl }));
        }

        tracing::debug!(
            "{} still open: mark={} pnl={:.4} target={}",
            position.symbol,
            mark_price,
            pnl,
            position.target_profit
        );
        Ok(None)
    }

    fn cancelled(&self, position: &Position) -> Result<MonitorOutcome> {
        tracing::warn!(
            "Shutdown: abandoning monitor for {}: position (qty {}) is left OPEN and unmonitored",
            position.symbol,
            position.signed_quantity
        );
        Ok(MonitorOutcome::Cancelled)
    }
}

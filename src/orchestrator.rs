use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::Exchange;
use crate::config::Config;
use crate::error::{BotError, Result};
use crate::execution::{MonitorOutcome, OrderExecutor, PositionMonitor};
use crate::models::{Candle, Position, Signal};
use crate::strategy::{combine, MomentumDetector, OscillatorDetector};

/// Per-tick scan across the symbol universe.
///
/// Each symbol runs two fetch+classify pipelines (short-horizon
/// momentum, long-horizon RSI); when the combined directive is
/// directional, an entry order is placed and an independent monitor
/// task is spawned for the resulting position. The scan itself never
/// waits on a monitor, so a slow position cannot stall other symbols.
pub struct Orchestrator<E: Exchange + 'static> {
    exchange: Arc<E>,
    config: Arc<Config>,
    executor: OrderExecutor,
    momentum: MomentumDetector,
    oscillator: OscillatorDetector,
    /// Symbols with a live monitor; at most one position per symbol.
    monitored: Arc<Mutex<HashSet<String>>>,
    monitor_tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown: watch::Receiver<bool>,
}

impl<E: Exchange + 'static> Orchestrator<E> {
    pub fn new(exchange: Arc<E>, config: Arc<Config>, shutdown: watch::Receiver<bool>) -> Self {
        let executor = OrderExecutor::new(config.investment_per_trade, config.leverage);
        let momentum = MomentumDetector::new(config.momentum_threshold_pct);
        Self {
            exchange,
            config,
            executor,
            momentum,
            oscillator: OscillatorDetector::default(),
            monitored: Arc::new(Mutex::new(HashSet::new())),
            monitor_tasks: Mutex::new(Vec::new()),
            shutdown,
        }
    }

    /// Scan loop on the configured cadence. Returns once shutdown is
    /// signalled; spawned monitors keep running until
    /// [`join_monitors`](Self::join_monitors) collects them.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut shutdown = self.shutdown.clone();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_tick().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Shutdown requested, stopping symbol scan");
                        return;
                    }
                }
            }
        }
    }

    /// One scan over the symbol universe. A failure on one symbol
    /// never aborts the rest of the tick; a failed universe fetch
    /// completes the tick with zero symbols.
    pub async fn run_tick(&self) {
        // Completed monitor tasks have nothing left to report; drop
        // their handles so the list only holds live tasks.
        self.monitor_tasks
            .lock()
            .unwrap()
            .retain(|handle| !handle.is_finished());

        let symbols = match self
            .exchange
            .list_tradable_symbols(&self.config.quote_asset, &self.config.exclude_prefixes)
            .await
        {
            Ok(symbols) => symbols,
            Err(e) => {
                tracing::warn!("Symbol universe fetch failed, skipping tick: {}", e);
                return;
            }
        };

        tracing::info!("Scanning {} symbols", symbols.len());

        for symbol in symbols {
            if self.monitored.lock().unwrap().contains(&symbol) {
                tracing::debug!("{} has a live position, skipping", symbol);
                continue;
            }
            if let Err(e) = self.evaluate_symbol(&symbol).await {
                tracing::warn!("{}: {}", symbol, e);
            }
        }
    }

    /// Fetch, classify, combine, and conditionally execute one symbol.
    async fn evaluate_symbol(&self, symbol: &str) -> Result<()> {
        let short_series = self
            .exchange
            .get_candles(symbol, &self.config.short_interval, self.config.candle_limit)
            .await?;
        let long_series = self
            .exchange
            .get_candles(symbol, &self.config.long_interval, self.config.candle_limit)
            .await?;

        let momentum_signal = self.classify_or_wait(symbol, self.momentum.classify(&short_series));
        let oscillator_signal =
            self.classify_or_wait(symbol, self.oscillator.classify(&long_series));

        let directive = combine(momentum_signal, oscillator_signal);
        tracing::debug!(
            "{}: momentum={} oscillator={} -> {}",
            symbol,
            momentum_signal,
            oscillator_signal,
            directive
        );

        if directive == Signal::Wait {
            return Ok(());
        }

        // Sized from the latest short-horizon close; the fill may
        // differ (slippage accepted, not compensated).
        let reference_price = short_series
            .last()
            .map(|c: &Candle| c.close)
            .ok_or_else(|| BotError::Classification("empty short series".to_string()))?;

        tracing::info!("{}: directive {} @ ref {}", symbol, directive, reference_price);

        let order = self
            .executor
            .execute(self.exchange.as_ref(), symbol, directive, reference_price)
            .await?;

        let position = Position::from_order(&order, self.config.profit_target);
        self.spawn_monitor(position);
        Ok(())
    }

    /// A classification failure degrades to WAIT for this tick.
    fn classify_or_wait(&self, symbol: &str, result: Result<Signal>) -> Signal {
        match result {
            Ok(signal) => signal,
            Err(e) => {
                tracing::warn!("{}: {}", symbol, e);
                Signal::Wait
            }
        }
    }

    /// Spawn an independent monitor task owning this position. The
    /// task frees the symbol for new entries when it reaches a
    /// terminal state.
    fn spawn_monitor(&self, position: Position) {
        let symbol = position.symbol.clone();
        self.monitored.lock().unwrap().insert(symbol.clone());

        let exchange = self.exchange.clone();
        let monitored = self.monitored.clone();
        let monitor = PositionMonitor::new(self.config.poll_interval);
        let shutdown = self.shutdown.clone();

        let handle = tokio::spawn(async move {
            let outcome = monitor.run(exchange.as_ref(), &position, shutdown).await;
            match &outcome {
                Ok(MonitorOutcome::ClosedAtTarget { pnl }) => {
                    tracing::info!("{} closed at target, pnl {:.4}", symbol, pnl);
                }
                Ok(MonitorOutcome::ClosedExternally) => {
                    tracing::info!("{} was closed externally", symbol);
                }
                Ok(MonitorOutcome::Cancelled) => {
                    // The monitor already logged the abandonment warning.
                }
                Err(e) => {
                    tracing::error!(
                        "{} monitoring failed, position fate unknown: {}",
                        symbol,
                        e
                    );
                }
            }
            monitored.lock().unwrap().remove(&symbol);
        });

        self.monitor_tasks.lock().unwrap().push(handle);
    }

    /// Number of positions currently under supervision.
    pub fn active_monitors(&self) -> usize {
        self.monitored.lock().unwrap().len()
    }

    /// Await all spawned monitor tasks. Called after shutdown is
    /// signalled so cancellation warnings reach the log before exit.
    pub async fn join_monitors(&self) {
        let handles: Vec<_> = self.monitor_tasks.lock().unwrap().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Monitor task panicked: {}", e);
            }
        }
    }
}

use crate::error::{BotError, Result};
use crate::indicators::wilder_rsi;
use crate::models::{Candle, Signal};

/// Medium-horizon mean-reversion detector over a 14-period RSI.
///
/// Oversold (RSI < 30) reads as LONG, overbought (RSI > 70) as SHORT,
/// anything in between as WAIT.
#[derive(Debug, Clone)]
pub struct OscillatorDetector {
    period: usize,
    oversold: f64,
    overbought: f64,
}

impl Default for OscillatorDetector {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl OscillatorDetector {
    /// Candles needed for one classification (period + 1 closes).
    pub fn min_candles(&self) -> usize {
        self.period + 1
    }

    pub fn classify(&self, candles: &[Candle]) -> Result<Signal> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let rsi = wilder_rsi(&closes, self.period).ok_or_else(|| {
            BotError::Classification(format!(
                "oscillator needs {} candles, got {}",
                self.min_candles(),
                candles.len()
            ))
        })?;

        Ok(if rsi < self.oversold {
            Signal::Long
        } else if rsi > self.overbought {
            Signal::Short
        } else {
            Signal::Wait
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                open_time: Utc::now() - chrono::Duration::minutes(15 * (closes.len() - i) as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1000.0,
                close_time: Utc::now()
                    - chrono::Duration::minutes(15 * ((closes.len() - i) as i64 - 1)),
            })
            .collect()
    }

    #[test]
    fn test_steady_decline_is_long() {
        let detector = OscillatorDetector::default();
        let closes: Vec<f64> = (0..20).map(|i| 200.0 - i as f64 * 2.0).collect();
        let candles = candles_from_closes(&closes);
        // All losses drive RSI to 0, deep oversold
        assert_eq!(detector.classify(&candles).unwrap(), Signal::Long);
    }

    #[test]
    fn test_steady_climb_is_short() {
        let detector = OscillatorDetector::default();
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 2.0).collect();
        let candles = candles_from_closes(&closes);
        assert_eq!(detector.classify(&candles).unwrap(), Signal::Short);
    }

    #[test]
    fn test_choppy_market_is_wait() {
        let detector = OscillatorDetector::default();
        let closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let candles = candles_from_closes(&closes);
        assert_eq!(detector.classify(&candles).unwrap(), Signal::Wait);
    }

    #[test]
    fn test_insufficient_candles_errors() {
        let detector = OscillatorDetector::default();
        let closes: Vec<f64> = (0..detector.min_candles() - 1).map(|i| 100.0 + i as f64).collect();
        let candles = candles_from_closes(&closes);
        let err = detector.classify(&candles).unwrap_err();
        assert!(matches!(err, BotError::Classification(_)));
    }

    #[test]
    fn test_min_candles_is_fifteen() {
        assert_eq!(OscillatorDetector::default().min_candles(), 15);
    }

    #[test]
    fn test_idempotent_on_unchanged_series() {
        let detector = OscillatorDetector::default();
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + (i as f64 * 0.9).sin() * 3.0).collect();
        let candles = candles_from_closes(&closes);
        assert_eq!(
            detector.classify(&candles).unwrap(),
            detector.classify(&candles).unwrap()
        );
    }
}

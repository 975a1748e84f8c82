use crate::error::{BotError, Result};
use crate::models::{Candle, Signal};

/// Short-horizon momentum detector.
///
/// Classifies the percent change between the last two closes:
/// LONG above `+threshold_pct`, SHORT below `-threshold_pct`,
/// otherwise WAIT.
#[derive(Debug, Clone)]
pub struct MomentumDetector {
    threshold_pct: f64,
}

impl MomentumDetector {
    pub fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }

    /// Classify a candle series, oldest-first.
    ///
    /// Errors (instead of silently signaling) when fewer than two
    /// candles are available or the reference close is non-positive;
    /// the caller decides whether that degrades to WAIT.
    pub fn classify(&self, candles: &[Candle]) -> Result<Signal> {
        if candles.len() < 2 {
            return Err(BotError::Classification(format!(
                "momentum needs 2 candles, got {}",
                candles.len()
            )));
        }

        let last = candles[candles.len() - 1].close;
        let second_last = candles[candles.len() - 2].close;
        if second_last <= 0.0 || last <= 0.0 {
            return Err(BotError::Classification(format!(
                "non-positive close in momentum input: last={last}, prev={second_last}"
            )));
        }

        let change_pct = (last - second_last) / second_last * 100.0;

        Ok(if change_pct > self.threshold_pct {
            Signal::Long
        } else if change_pct < -self.threshold_pct {
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
                open_time: Utc::now() - chrono::Duration::minutes((closes.len() - i) as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1000.0,
                close_time: Utc::now() - chrono::Duration::minutes((closes.len() - i) as i64 - 1),
            })
            .collect()
    }

    #[test]
    fn test_long_above_threshold() {
        let detector = MomentumDetector::new(1.5);
        // +2%
        let candles = candles_from_closes(&[100.0, 102.0]);
        assert_eq!(detector.classify(&candles).unwrap(), Signal::Long);
    }

    #[test]
    fn test_short_below_threshold() {
        let detector = MomentumDetector::new(1.5);
        // -2%
        let candles = candles_from_closes(&[100.0, 98.0]);
        assert_eq!(detector.classify(&candles).unwrap(), Signal::Short);
    }

    #[test]
    fn test_wait_inside_band() {
        let detector = MomentumDetector::new(1.5);
        for closes in [[100.0, 101.0], [100.0, 99.0], [100.0, 100.0]] {
            let candles = candles_from_closes(&closes);
            assert_eq!(detector.classify(&candles).unwrap(), Signal::Wait);
        }
    }

    #[test]
    fn test_exactly_at_threshold_is_wait() {
        // Strict inequality on both sides.
        let detector = MomentumDetector::new(1.5);
        let candles = candles_from_closes(&[100.0, 101.5]);
        assert_eq!(detector.classify(&candles).unwrap(), Signal::Wait);
        let candles = candles_from_closes(&[100.0, 98.5]);
        assert_eq!(detector.classify(&candles).unwrap(), Signal::Wait);
    }

    #[test]
    fn test_only_last_two_closes_matter() {
        let detector = MomentumDetector::new(1.5);
        let candles = candles_from_closes(&[50.0, 500.0, 100.0, 102.0]);
        assert_eq!(detector.classify(&candles).unwrap(), Signal::Long);
    }

    #[test]
    fn test_insufficient_candles_errors() {
        let detector = MomentumDetector::new(1.5);
        let candles = candles_from_closes(&[100.0]);
        let err = detector.classify(&candles).unwrap_err();
        assert!(matches!(err, BotError::Classification(_)));
    }

    #[test]
    fn test_non_positive_close_errors() {
        let detector = MomentumDetector::new(1.5);
        let candles = candles_from_closes(&[0.0, 100.0]);
        assert!(detector.classify(&candles).is_err());
    }

    #[test]
    fn test_idempotent_on_unchanged_series() {
        let detector = MomentumDetector::new(1.5);
        let candles = candles_from_closes(&[100.0, 103.0]);
        let first = detector.classify(&candles).unwrap();
        let second = detector.classify(&candles).unwrap();
        assert_eq!(first, second);
    }
}

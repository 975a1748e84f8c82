/// Relative Strength Index with Wilder smoothing.
///
/// Average gain and loss are seeded from the simple mean of the first
/// `period` up/down moves, then updated recursively as
/// `avg = (avg * (period - 1) + move) / period` over the remaining
/// moves. RSI = 100 - 100 / (1 + avg_gain / avg_loss).
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// Returns `None` when fewer than `period + 1` prices are available.
/// By convention a zero average loss yields 100.
pub fn wilder_rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);

    for i in 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    // Seed with the simple mean of the first `period` moves.
    let mut avg_gain: f64 = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss: f64 = losses[..period].iter().sum::<f64>() / period as f64;

    // Wilder recursive smoothing over the rest.
    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_bounded() {
        let prices = vec![
            44.0, 44.25, 44.5, 43.75, 44.0, 44.5, 45.0, 45.5, 45.25, 45.5, 46.0, 46.5, 46.25,
            46.0, 46.5,
        ];

        let rsi = wilder_rsi(&prices, 14).unwrap();
        assert!(rsi > 0.0 && rsi < 100.0);
        // Mostly gains, should sit in the upper half
        assert!(rsi > 50.0);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let prices = vec![100.0, 102.0, 101.0];
        assert!(wilder_rsi(&prices, 14).is_none());
    }

    #[test]
    fn test_rsi_exactly_period_plus_one() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert!(wilder_rsi(&prices, 14).is_some());
    }

    #[test]
    fn test_rsi_all_gains() {
        let prices = vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        assert_eq!(wilder_rsi(&prices, 5).unwrap(), 100.0);
    }

    #[test]
    fn test_rsi_all_losses_near_zero() {
        let prices = vec![105.0, 104.0, 103.0, 102.0, 101.0, 100.0];
        let rsi = wilder_rsi(&prices, 5).unwrap();
        assert!(rsi < 1e-9);
    }

    #[test]
    fn test_rsi_monotonic_in_losses() {
        // Holding the gain sequence fixed, deepening the losses must
        // never increase the RSI.
        let base = vec![
            100.0, 101.0, 100.5, 101.5, 101.0, 102.0, 101.5, 102.5, 102.0, 103.0, 102.5, 103.5,
            103.0, 104.0, 103.5, 104.5,
        ];
        let mut prev = wilder_rsi(&base, 14).unwrap();

        for scale in [1.5, 2.0, 3.0] {
            let mut deeper = base.clone();
            // Scale every down-move while keeping up-moves identical.
            for i in 1..deeper.len() {
                let change = base[i] - base[i - 1];
                if change < 0.0 {
                    deeper[i] = deeper[i - 1] + change * scale;
                } else {
                    deeper[i] = deeper[i - 1] + change;
                }
            }
            let rsi = wilder_rsi(&deeper, 14).unwrap();
            assert!(rsi <= prev + 1e-9, "RSI rose as losses deepened");
            prev = rsi;
        }
    }

    #[test]
    fn test_rsi_idempotent() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        assert_eq!(wilder_rsi(&prices, 14), wilder_rsi(&prices, 14));
    }
}

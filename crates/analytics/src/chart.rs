// In crates/analytics/src/chart.rs

use crate::types::{AnalysisSnapshot, Bias, Trend};
use crate::{Error, Result};
use rand::Rng;
use ta::Next;
use ta::indicators::RelativeStrengthIndex as Rsi;

/// Lookback of the momentum oscillator.
pub const RSI_PERIOD: usize = 14;

/// Derives a technical snapshot of the current window.
///
/// Support and resistance sit halfway between the current price and the
/// window's extremes. The trend follows the latest short/long average pair;
/// `strength` is drawn from a band that depends on the trend.
pub fn analyze<R: Rng + ?Sized>(
    prices: &[f64],
    short: &[Option<f64>],
    long: &[Option<f64>],
    short_label: &str,
    long_label: &str,
    rng: &mut R,
) -> Result<AnalysisSnapshot> {
    let current_price = *prices.last().ok_or(Error::InsufficientData)?;

    // --- Support & Resistance ---
    let max_price = prices.iter().copied().fold(f64::MIN, f64::max);
    let min_price = prices.iter().copied().fold(f64::MAX, f64::min);
    let resistance = current_price + (max_price - current_price) * 0.5;
    let support = current_price - (current_price - min_price) * 0.5;

    // --- Trend from the latest averages ---
    let latest = match (short.last(), long.last()) {
        (Some(Some(s)), Some(Some(l))) => Some((*s, *l)),
        _ => None,
    };

    let (trend, signal, strength, ma_status) = match latest {
        Some((s, l)) if s > l => (
            Trend::Uptrend,
            Bias::Buy,
            rng.gen_range(65..85),
            format!("{short_label} above {long_label}, indicating bullish momentum"),
        ),
        Some((s, l)) if s < l => (
            Trend::Downtrend,
            Bias::Sell,
            rng.gen_range(35..55),
            format!("{short_label} below {long_label}, indicating bearish momentum"),
        ),
        _ => (
            Trend::Sideways,
            Bias::Neutral,
            50,
            "Moving averages in equilibrium".to_string(),
        ),
    };

    Ok(AnalysisSnapshot {
        trend,
        strength,
        signal,
        current_price,
        resistance,
        support,
        ma_status,
        oscillator: relative_strength(prices)?,
    })
}

/// Relative strength index of the whole window, as of its last sample.
pub fn relative_strength(prices: &[f64]) -> Result<f64> {
    let mut rsi = Rsi::new(RSI_PERIOD).map_err(|e| Error::Indicator(format!("{e:?}")))?;
    let mut last = 50.0;
    for price in prices {
        last = rsi.next(*price);
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn empty_window_is_insufficient_data() {
        let result = analyze(&[], &[], &[], "EMA7", "EMA40", &mut rng());
        assert_eq!(result, Err(Error::InsufficientData));
    }

    #[test]
    fn support_and_resistance_are_halfway_to_extremes() {
        let prices = [100.0, 120.0, 90.0, 110.0];
        let snapshot = analyze(&prices, &[None; 4], &[None; 4], "SMA2", "SMA3", &mut rng()).unwrap();
        assert_eq!(snapshot.current_price, 110.0);
        assert_eq!(snapshot.resistance, 115.0);
        assert_eq!(snapshot.support, 100.0);
    }

    #[test]
    fn undefined_averages_are_sideways() {
        let snapshot = analyze(&[1.0, 2.0], &[None, None], &[None, None], "EMA7", "EMA40", &mut rng()).unwrap();
        assert_eq!(snapshot.trend, Trend::Sideways);
        assert_eq!(snapshot.signal, Bias::Neutral);
        assert_eq!(snapshot.strength, 50);
        assert_eq!(snapshot.ma_status, "Moving averages in equilibrium");
    }

    #[test]
    fn short_above_long_is_an_uptrend() {
        let prices: Vec<f64> = (1..=30).map(f64::from).collect();
        let short = vec![Some(20.0)];
        let long = vec![Some(10.0)];
        let snapshot = analyze(&prices, &short, &long, "EMA7", "EMA40", &mut rng()).unwrap();

        assert_eq!(snapshot.trend, Trend::Uptrend);
        assert_eq!(snapshot.signal, Bias::Buy);
        assert!((65..85).contains(&snapshot.strength));
        assert_eq!(snapshot.ma_status, "EMA7 above EMA40, indicating bullish momentum");
        assert!(snapshot.oscillator > 70.0);
    }

    #[test]
    fn short_below_long_is_a_downtrend() {
        let prices: Vec<f64> = (1..=30).rev().map(f64::from).collect();
        let snapshot = analyze(&prices, &[Some(1.0)], &[Some(2.0)], "SMA5", "SMA20", &mut rng()).unwrap();

        assert_eq!(snapshot.trend, Trend::Downtrend);
        assert_eq!(snapshot.signal, Bias::Sell);
        assert!((35..55).contains(&snapshot.strength));
        assert!(snapshot.oscillator < 30.0);
    }

    #[test]
    fn equal_averages_are_sideways() {
        let snapshot = analyze(&[5.0], &[Some(3.0)], &[Some(3.0)], "EMA7", "EMA40", &mut rng()).unwrap();
        assert_eq!(snapshot.trend, Trend::Sideways);
        assert_eq!(snapshot.strength, 50);
    }
}

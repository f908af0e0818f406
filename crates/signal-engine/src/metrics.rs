use signal_core::{AnalysisConfig, AnalyzerError, Quote, StockMetrics};
use technical_indicators::{atr, bollinger_bands, ema, macd, rsi, sma, trend_strength};

/// Build one latest-value metrics snapshot from aligned OHLCV arrays and the
/// live quote. Fails when the history cannot cover the short moving average.
pub fn build_metrics(
    closes: &[f64],
    highs: &[f64],
    lows: &[f64],
    volumes: &[f64],
    quote: &Quote,
    config: &AnalysisConfig,
) -> Result<StockMetrics, AnalyzerError> {
    let short = config.short_moving_average;
    if closes.len() < short {
        return Err(AnalyzerError::InsufficientData(format!(
            "need at least {} data points, got {}",
            short,
            closes.len()
        )));
    }

    let current_price = closes[closes.len() - 1];

    let last = |series: Vec<f64>| series.last().copied().unwrap_or(f64::NAN);

    let sma_50 = last(sma(closes, short));
    let sma_200 = last(sma(closes, config.long_moving_average));
    let ema_20 = last(ema(closes, 20));

    let rsi_value = rsi(closes, config.rsi_period).unwrap_or(f64::NAN);

    let macd_snapshot = macd(closes, config.macd_fast, config.macd_slow, config.macd_signal);

    let bb = bollinger_bands(closes, config.bollinger_period, config.bollinger_std_dev);
    let bb_position = (current_price - bb.lower) / (bb.upper - bb.lower);

    let volume_sma = last(sma(volumes, config.volume_period));
    let volume_ratio = volumes[volumes.len() - 1] / volume_sma;

    let atr_value = atr(highs, lows, closes, config.atr_period);

    let trend = trend_strength(&closes[closes.len() - short..]);

    let base = closes[closes.len() - short];
    let price_change_50d = (current_price - base) / base * 100.0;

    Ok(StockMetrics {
        current_price,
        sma_50,
        sma_200,
        ema_20,
        rsi: rsi_value,
        macd: macd_snapshot.macd,
        macd_signal: macd_snapshot.signal,
        macd_histogram: macd_snapshot.histogram,
        bb_position,
        volume_ratio,
        atr: atr_value,
        trend_strength: trend,
        pe_ratio: quote.trailing_pe,
        forward_pe: quote.forward_pe,
        peg_ratio: quote.trailing_peg_ratio,
        profit_margin: quote.profit_margins.map(|m| m * 100.0),
        debt_to_equity: quote.debt_to_equity,
        price_change_50d,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_quote(price: f64) -> Quote {
        Quote {
            regular_market_price: price,
            regular_market_volume: 1_000_000.0,
            ..Default::default()
        }
    }

    fn rising_history(len: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let closes: Vec<f64> = (0..len).map(|i| 100.0 + i as f64 * 0.5).collect();
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();
        let volumes = vec![2_000_000.0; len];
        (closes, highs, lows, volumes)
    }

    #[test]
    fn fails_below_short_window() {
        let (closes, highs, lows, volumes) = rising_history(10);
        let err = build_metrics(
            &closes,
            &highs,
            &lows,
            &volumes,
            &flat_quote(105.0),
            &AnalysisConfig::default(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("need at least 50"));
    }

    #[test]
    fn builds_snapshot_on_uptrend() {
        let (closes, highs, lows, volumes) = rising_history(260);
        let metrics = build_metrics(
            &closes,
            &highs,
            &lows,
            &volumes,
            &flat_quote(*closes.last().unwrap()),
            &AnalysisConfig::default(),
        )
        .unwrap();

        assert_eq!(metrics.current_price, *closes.last().unwrap());
        assert!(metrics.sma_50 > metrics.sma_200);
        assert!(metrics.rsi > 70.0);
        assert!(metrics.macd.is_some());
        assert!(metrics.macd_signal.is_some());
        assert!(metrics.trend_strength > 0.0);
        assert!(metrics.price_change_50d > 0.0);
        // Constant volume: the latest volume sits exactly on its average
        assert!((metrics.volume_ratio - 1.0).abs() < 1e-9);
        assert!(metrics.atr > 0.0);
    }

    #[test]
    fn carries_fundamentals_through() {
        let (closes, highs, lows, volumes) = rising_history(260);
        let quote = Quote {
            regular_market_price: 230.0,
            regular_market_volume: 2_000_000.0,
            trailing_pe: Some(22.0),
            forward_pe: Some(14.0),
            trailing_peg_ratio: Some(0.8),
            profit_margins: Some(0.25),
            debt_to_equity: Some(1.4),
        };

        let metrics =
            build_metrics(&closes, &highs, &lows, &volumes, &quote, &AnalysisConfig::default())
                .unwrap();

        assert_eq!(metrics.pe_ratio, Some(22.0));
        assert_eq!(metrics.forward_pe, Some(14.0));
        assert_eq!(metrics.peg_ratio, Some(0.8));
        assert_eq!(metrics.profit_margin, Some(25.0));
        assert_eq!(metrics.debt_to_equity, Some(1.4));
    }

    #[test]
    fn bb_position_can_leave_unit_range() {
        // Price spiking far above a quiet band lands outside [0, 1]
        let mut closes = vec![100.0; 60];
        let spike = 130.0;
        *closes.last_mut().unwrap() = spike;
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();
        let volumes = vec![1_000_000.0; 60];

        let metrics = build_metrics(
            &closes,
            &highs,
            &lows,
            &volumes,
            &flat_quote(spike),
            &AnalysisConfig::default(),
        )
        .unwrap();

        assert!(metrics.bb_position > 1.0);
    }
}

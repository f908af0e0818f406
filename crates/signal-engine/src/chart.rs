use signal_core::{AnalysisConfig, AnalyzerError, ChartData};
use technical_indicators::{bollinger_series, ema, macd_series, rsi_series, sma};

/// Most recent points shown on a chart, roughly one year of trading days
const DISPLAY_WINDOW: usize = 250;

/// Re-run every indicator across the full history and align the series to a
/// common display window.
///
/// Each indicator series begins at a known offset into the history (its
/// lead-in). Alignment drops leading elements from series that start before
/// the window and left-pads with `None` those that start after it, so every
/// output vector has identical length.
pub fn build_chart_data(
    closes: &[f64],
    volumes: &[f64],
    dates: &[String],
    config: &AnalysisConfig,
) -> Result<ChartData, AnalyzerError> {
    let len = closes.len();

    // Never start before the long MA has data, never show more than the
    // display window
    let min_start = config.long_moving_average - 1;
    let chart_start = min_start.max(len.saturating_sub(DISPLAY_WINDOW));

    if len <= chart_start {
        return Err(AnalyzerError::Chart(format!(
            "Insufficient historical data for chart generation: have {} points, need more than {}",
            len, chart_start
        )));
    }

    let sma_50 = sma(closes, config.short_moving_average);
    let sma_200 = sma(closes, config.long_moving_average);
    let ema_20 = ema(closes, 20);
    let rsi = rsi_series(closes, config.rsi_period);
    let macd = macd_series(closes, config.macd_fast, config.macd_slow, config.macd_signal);
    let bb = bollinger_series(closes, config.bollinger_period, config.bollinger_std_dev);
    let volume_sma = sma(volumes, config.volume_period);

    // Natural start index of each series within the full history
    let macd_line_start = config.macd_slow - 1;
    let macd_signal_start = config.macd_slow + config.macd_signal - 2;

    let align = |series: &[f64], natural_start: usize| -> Vec<Option<f64>> {
        if natural_start < chart_start {
            let skip = chart_start - natural_start;
            series.iter().skip(skip).copied().map(Some).collect()
        } else if natural_start == chart_start {
            series.iter().copied().map(Some).collect()
        } else {
            let padding = natural_start - chart_start;
            std::iter::repeat(None)
                .take(padding)
                .chain(series.iter().copied().map(Some))
                .collect()
        }
    };

    Ok(ChartData {
        dates: dates[chart_start..].to_vec(),
        prices: closes[chart_start..].to_vec(),
        volumes: volumes[chart_start..].to_vec(),
        sma_50_values: align(&sma_50, config.short_moving_average - 1),
        sma_200_values: align(&sma_200, config.long_moving_average - 1),
        ema_20_values: align(&ema_20, 19),
        rsi_values: align(&rsi, config.rsi_period),
        macd_values: align(&macd.macd_line, macd_line_start),
        macd_signal_values: align(&macd.signal_line, macd_signal_start),
        macd_histogram_values: align(&macd.histogram, macd_signal_start),
        bb_upper: align(&bb.upper, config.bollinger_period - 1),
        bb_middle: align(&bb.middle, config.bollinger_period - 1),
        bb_lower: align(&bb.lower, config.bollinger_period - 1),
        volume_sma: align(&volume_sma, config.volume_period - 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(len: usize) -> (Vec<f64>, Vec<f64>, Vec<String>) {
        let closes: Vec<f64> = (0..len)
            .map(|i| 100.0 + i as f64 * 0.2 + (i as f64 * 0.3).sin() * 3.0)
            .collect();
        let volumes = vec![1_500_000.0; len];
        let dates: Vec<String> = (0..len).map(|i| format!("2024-01-01T00:00:00Z#{i}")).collect();
        (closes, volumes, dates)
    }

    fn assert_uniform_length(chart: &ChartData, expected: usize) {
        assert_eq!(chart.dates.len(), expected);
        assert_eq!(chart.prices.len(), expected);
        assert_eq!(chart.volumes.len(), expected);
        assert_eq!(chart.sma_50_values.len(), expected);
        assert_eq!(chart.sma_200_values.len(), expected);
        assert_eq!(chart.ema_20_values.len(), expected);
        assert_eq!(chart.rsi_values.len(), expected);
        assert_eq!(chart.macd_values.len(), expected);
        assert_eq!(chart.macd_signal_values.len(), expected);
        assert_eq!(chart.macd_histogram_values.len(), expected);
        assert_eq!(chart.bb_upper.len(), expected);
        assert_eq!(chart.bb_middle.len(), expected);
        assert_eq!(chart.bb_lower.len(), expected);
        assert_eq!(chart.volume_sma.len(), expected);
    }

    #[test]
    fn all_series_share_one_length_on_long_history() {
        let (closes, volumes, dates) = history(520);
        let chart = build_chart_data(&closes, &volumes, &dates, &AnalysisConfig::default())
            .unwrap();

        // 520 points: window starts at 520 - 250
        assert_uniform_length(&chart, 250);
        // Everything has data before the window opens, so no padding
        assert!(chart.sma_200_values[0].is_some());
        assert!(chart.rsi_values[0].is_some());
    }

    #[test]
    fn short_history_clamps_to_long_ma_leadin() {
        let (closes, volumes, dates) = history(260);
        let chart = build_chart_data(&closes, &volumes, &dates, &AnalysisConfig::default())
            .unwrap();

        // Window is forced to open where the 200-day MA begins
        assert_uniform_length(&chart, 260 - 199);
        let expected_first = closes[..200].iter().sum::<f64>() / 200.0;
        assert_eq!(chart.sma_200_values[0], Some(expected_first));
    }

    #[test]
    fn exactly_at_leadin_boundary_errors() {
        let (closes, volumes, dates) = history(199);
        let err = build_chart_data(&closes, &volumes, &dates, &AnalysisConfig::default())
            .unwrap_err();

        assert!(matches!(err, AnalyzerError::Chart(_)));
        assert!(err.to_string().contains("have 199 points"));
    }

    #[test]
    fn one_past_leadin_yields_single_point() {
        let (closes, volumes, dates) = history(200);
        let chart = build_chart_data(&closes, &volumes, &dates, &AnalysisConfig::default())
            .unwrap();

        assert_uniform_length(&chart, 1);
        assert!(chart.sma_200_values[0].is_some());
    }

    #[test]
    fn late_starting_series_left_pad_with_none() {
        // Stretch the long MA so the window opens before the MACD signal has
        // data and padding becomes visible
        let config = AnalysisConfig { long_moving_average: 30, ..Default::default() };
        let (closes, volumes, dates) = history(40);
        let chart = build_chart_data(&closes, &volumes, &dates, &config).unwrap();

        assert_uniform_length(&chart, 40 - 29);
        // Signal line starts at index 26 + 9 - 2 = 33, window at 29: four gaps
        assert!(chart.macd_signal_values[..4].iter().all(|v| v.is_none()));
        assert!(chart.macd_signal_values[4].is_some());
        // The MACD line itself starts at 25, before the window: no padding
        assert!(chart.macd_values[0].is_some());
    }

    #[test]
    fn window_values_match_full_recomputation() {
        let (closes, volumes, dates) = history(400);
        let config = AnalysisConfig::default();
        let chart = build_chart_data(&closes, &volumes, &dates, &config).unwrap();

        let chart_start = 400 - 250;
        let sma_50_full = sma(&closes, 50);
        // The aligned series drops exactly the pre-window values
        assert_eq!(
            chart.sma_50_values[0],
            Some(sma_50_full[chart_start - 49])
        );
        assert_eq!(
            chart.sma_50_values.last().copied().unwrap(),
            sma_50_full.last().copied()
        );

        let rsi_full = rsi_series(&closes, config.rsi_period);
        assert_eq!(chart.rsi_values[0], Some(rsi_full[chart_start - 14]));
    }
}

/// Simple Moving Average
///
/// One value per window of `period` consecutive elements, sliding by one.
/// Result length is `data.len() - period + 1`; empty when the period does
/// not fit.
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Exponential Moving Average
///
/// Seeded with the SMA of the first `period` elements; each later value is
/// `price * k + prev * (1 - k)` with `k = 2 / (period + 1)`. Result length
/// is `data.len() - period + 1`.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len() - period + 1);

    let seed: f64 = data[..period].iter().sum::<f64>() / period as f64;
    result.push(seed);

    for i in period..data.len() {
        let prev = result[result.len() - 1];
        result.push(data[i] * k + prev * (1.0 - k));
    }

    result
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    // avg_loss of zero means pure gains; the limit of the formula is 100
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Relative Strength Index series, Wilder smoothing.
///
/// One value per index from `period` onward (the first needs `period + 1`
/// prices), computed in a single pass. Because the smoothing is a left fold,
/// each element equals the RSI of the price prefix ending at that index.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period + 1 {
        return vec![];
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=period {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let mut avg_gain = gains / period as f64;
    let mut avg_loss = losses / period as f64;

    let mut result = Vec::with_capacity(prices.len() - period);
    result.push(rsi_value(avg_gain, avg_loss));

    for i in period + 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        result.push(rsi_value(avg_gain, avg_loss));
    }

    result
}

/// Latest RSI value, or `None` when fewer than `period + 1` prices exist
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    rsi_series(prices, period).last().copied()
}

/// Full MACD series
pub struct MacdSeries {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Latest MACD values. `signal`/`histogram` lag the line by the signal
/// period's lead-in and may be absent on short histories.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacdSnapshot {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

pub fn macd_series(
    data: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdSeries {
    if fast_period == 0 || slow_period == 0 || signal_period == 0 || slow_period < fast_period {
        return MacdSeries { macd_line: vec![], signal_line: vec![], histogram: vec![] };
    }

    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);

    // The slow EMA needs a longer lead-in, so align the fast series to it
    let offset = ema_fast.len().saturating_sub(ema_slow.len());
    let mut macd_line = Vec::with_capacity(ema_slow.len());
    for i in 0..ema_slow.len() {
        macd_line.push(ema_fast[i + offset] - ema_slow[i]);
    }

    let signal_line = ema(&macd_line, signal_period);

    let hist_offset = macd_line.len().saturating_sub(signal_line.len());
    let mut histogram = Vec::with_capacity(signal_line.len());
    for i in 0..signal_line.len() {
        histogram.push(macd_line[i + hist_offset] - signal_line[i]);
    }

    MacdSeries { macd_line, signal_line, histogram }
}

pub fn macd(
    data: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdSnapshot {
    let series = macd_series(data, fast_period, slow_period, signal_period);
    MacdSnapshot {
        macd: series.macd_line.last().copied(),
        signal: series.signal_line.last().copied(),
        histogram: series.histogram.last().copied(),
    }
}

/// Latest Bollinger Band values
#[derive(Debug, Clone, Copy, Default)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands over the most recent `period` prices. Standard deviation
/// uses population variance. Returns the all-zero band when the history is
/// shorter than the period; callers treat that as a degenerate value, not an
/// error.
pub fn bollinger_bands(prices: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    if period == 0 || prices.len() < period {
        return BollingerBands::default();
    }

    let window = &prices[prices.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;
    let variance =
        window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / period as f64;
    let std = variance.sqrt();

    BollingerBands {
        upper: middle + std_dev * std,
        middle,
        lower: middle - std_dev * std,
    }
}

/// Full Bollinger Band series
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger_series(prices: &[f64], period: usize, std_dev: f64) -> BollingerSeries {
    if period == 0 || prices.len() < period {
        return BollingerSeries { upper: vec![], middle: vec![], lower: vec![] };
    }

    let len = prices.len() - period + 1;
    let mut upper = Vec::with_capacity(len);
    let mut middle = Vec::with_capacity(len);
    let mut lower = Vec::with_capacity(len);

    for i in period - 1..prices.len() {
        let window = &prices[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance =
            window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
        let std = variance.sqrt();

        middle.push(mean);
        upper.push(mean + std_dev * std);
        lower.push(mean - std_dev * std);
    }

    BollingerSeries { upper, middle, lower }
}

/// Average True Range: latest SMA of the true-range series.
///
/// True range per day is the largest of high-low, |high - prev close| and
/// |low - prev close|. Returns 0.0 when the history cannot cover the period;
/// target calculation substitutes a price fraction for a non-positive ATR.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let len = highs.len().min(lows.len()).min(closes.len());
    if period == 0 || len < period + 1 {
        return 0.0;
    }

    let mut true_ranges = Vec::with_capacity(len - 1);
    for i in 1..len {
        let high_low = highs[i] - lows[i];
        let high_close = (highs[i] - closes[i - 1]).abs();
        let low_close = (lows[i] - closes[i - 1]).abs();
        true_ranges.push(high_low.max(high_close).max(low_close));
    }

    sma(&true_ranges, period).last().copied().unwrap_or(0.0)
}

/// Trend strength via ordinary least-squares regression of price on index,
/// normalized by the latest price. Positive means uptrend; magnitude grows
/// with steepness and shrinks with price level.
pub fn trend_strength(prices: &[f64]) -> f64 {
    let n = prices.len();
    if n < 2 {
        return 0.0;
    }

    let nf = n as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    for (i, &price) in prices.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += price;
        sum_xy += x * price;
        sum_x2 += x * x;
    }

    let denom = nf * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return 0.0;
    }
    let slope = (nf * sum_xy - sum_x * sum_y) / denom;

    let last = prices[n - 1];
    if last == 0.0 {
        return 0.0;
    }
    slope / last * 100.0
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One trading day of OHLCV data, ascending by date in any history slice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub adj_close: Option<f64>,
}

/// Current-moment quote, independent of price history.
/// Fundamentals are optional; scoring rules that touch them are skipped
/// when they are absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quote {
    pub regular_market_price: f64,
    pub regular_market_volume: f64,
    #[serde(default)]
    pub trailing_pe: Option<f64>,
    #[serde(default)]
    pub forward_pe: Option<f64>,
    #[serde(default)]
    pub trailing_peg_ratio: Option<f64>,
    #[serde(default)]
    pub profit_margins: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
}

/// Latest-value indicator snapshot, built once per analysis and immutable
/// afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMetrics {
    pub current_price: f64,
    pub sma_50: f64,
    pub sma_200: f64,
    pub ema_20: f64,
    pub rsi: f64,
    /// MACD needs a longer lead-in than the minimum usable history, so the
    /// latest values can be absent; scoring then falls back to 50-day price
    /// momentum.
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    /// Fractional position between the Bollinger bands. Exceeds [0, 1] when
    /// price trades outside the bands, which is itself an extreme-condition
    /// signal.
    pub bb_position: f64,
    pub volume_ratio: f64,
    pub atr: f64,
    pub trend_strength: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_pe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peg_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_to_equity: Option<f64>,
    pub price_change_50d: f64,
}

/// Five-level trading recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
}

impl Recommendation {
    /// Map a composite score to a recommendation. Thresholds are fixed;
    /// typical bullish stocks land in the 20-35 range, bearish mirrored.
    pub fn from_score(score: f64) -> Self {
        if score >= 35.0 {
            Recommendation::StrongBuy
        } else if score >= 20.0 {
            Recommendation::Buy
        } else if score >= -20.0 {
            Recommendation::Hold
        } else if score >= -35.0 {
            Recommendation::Sell
        } else {
            Recommendation::StrongSell
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Sell => "SELL",
            Recommendation::StrongSell => "STRONG SELL",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Recommendation::StrongBuy | Recommendation::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Recommendation::StrongSell | Recommendation::Sell)
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a scoring reason. API consumers branch on this tag;
/// the glyph-prefixed string form is a presentation concern only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    Bullish,
    Bearish,
    Warning,
    Veto,
    Info,
}

/// One annotated line of scoring rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub kind: ReasonKind,
    pub text: String,
}

impl Reason {
    pub fn bullish(text: impl Into<String>) -> Self {
        Self { kind: ReasonKind::Bullish, text: text.into() }
    }

    pub fn bearish(text: impl Into<String>) -> Self {
        Self { kind: ReasonKind::Bearish, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { kind: ReasonKind::Warning, text: text.into() }
    }

    pub fn veto(text: impl Into<String>) -> Self {
        Self { kind: ReasonKind::Veto, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: ReasonKind::Info, text: text.into() }
    }

    pub fn glyph(&self) -> &'static str {
        match self.kind {
            ReasonKind::Bullish => "\u{2713}",
            ReasonKind::Bearish => "\u{2717}",
            ReasonKind::Warning => "\u{26a0}",
            ReasonKind::Veto => "\u{1f6d1}",
            ReasonKind::Info => "\u{25cb}",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.text)
    }
}

/// Bullish/bearish indicator counts out of the seven key indicators
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalSummary {
    pub bullish: u32,
    pub bearish: u32,
    pub total: u32,
}

/// Parallel time series for charting. Every vector has identical length;
/// indicators that begin after the display window opens are left-padded
/// with `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
    pub volumes: Vec<f64>,
    pub sma_50_values: Vec<Option<f64>>,
    pub sma_200_values: Vec<Option<f64>>,
    pub ema_20_values: Vec<Option<f64>>,
    pub rsi_values: Vec<Option<f64>>,
    pub macd_values: Vec<Option<f64>>,
    pub macd_signal_values: Vec<Option<f64>>,
    pub macd_histogram_values: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub volume_sma: Vec<Option<f64>>,
}

impl ChartData {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Final analysis output. Immutable once returned; cacheable by ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSignal {
    pub ticker: String,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub potential_gain: f64,
    pub risk: f64,
    pub risk_reward_ratio: f64,
    pub reasons: Vec<Reason>,
    pub metrics: StockMetrics,
    #[serde(rename = "chartData")]
    pub chart_data: ChartData,
    pub timestamp: DateTime<Utc>,
    pub signal_summary: SignalSummary,
}

use signal_core::Recommendation;

/// Price objectives derived from volatility
#[derive(Debug, Clone, Copy)]
pub struct Targets {
    pub target: f64,
    pub stop_loss: f64,
}

/// Derive target price and stop-loss from the current price and ATR, scaled
/// by recommendation strength. A non-positive ATR (insufficient history)
/// falls back to 2% of price.
pub fn calculate_targets(
    current_price: f64,
    atr: f64,
    recommendation: Recommendation,
) -> Targets {
    let atr = if atr > 0.0 { atr } else { current_price * 0.02 };

    if recommendation.is_buy() {
        Targets {
            target: current_price + 2.0 * atr,
            stop_loss: current_price - 1.5 * atr,
        }
    } else if recommendation.is_sell() {
        Targets {
            target: current_price - 2.0 * atr,
            stop_loss: current_price + 1.5 * atr,
        }
    } else {
        Targets {
            target: current_price + atr,
            stop_loss: current_price - atr,
        }
    }
}

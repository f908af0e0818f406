use signal_core::{AnalysisConfig, Reason, StockMetrics};

/// Outcome of one scoring pass: the point total, the annotated rationale in
/// display order, and how many of the seven key indicators leaned each way.
#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub score: f64,
    pub reasons: Vec<Reason>,
    pub bullish_count: u32,
    pub bearish_count: u32,
}

const STRONG_TREND: f64 = 0.7;

/// Apply the fixed, ordered rule pipeline to a metrics snapshot.
///
/// Pure function of its inputs. Rule weights favor trend-confirming signals
/// (moving-average cross, MACD) over mean-reversion ones (RSI, Bollinger);
/// RSI extremes are dampened when they fight a strong trend, since momentum
/// can keep an overbought stock overbought.
pub fn calculate_score(metrics: &StockMetrics, config: &AnalysisConfig) -> ScoreResult {
    let mut score: f64 = 0.0;
    let mut reasons: Vec<Reason> = Vec::new();
    let mut warnings: Vec<Reason> = Vec::new();

    // Bullish/bearish indicator tallies feed the confirmation rule and the
    // confidence estimate
    let mut bullish_count = 0u32;
    let mut bearish_count = 0u32;

    // 1. Golden Cross / Death Cross
    if metrics.sma_50 > metrics.sma_200 {
        score += 15.0;
        bullish_count += 1;
        reasons.push(Reason::bullish("Golden Cross: 50-day MA above 200-day MA (bullish)"));
    } else {
        score -= 15.0;
        bearish_count += 1;
        reasons.push(Reason::bearish("Death Cross: 50-day MA below 200-day MA (bearish)"));
    }

    // 2. RSI, dampened when it conflicts with a strong trend
    let strong_uptrend = metrics.trend_strength > STRONG_TREND;
    let strong_downtrend = metrics.trend_strength < -STRONG_TREND;

    if metrics.rsi < config.rsi_oversold {
        // Oversold in a downtrend can keep falling
        score += if strong_downtrend { 8.0 } else { 12.0 };
        bullish_count += 1;
        reasons.push(Reason::bullish(format!(
            "RSI oversold at {:.1} (potential bounce)",
            metrics.rsi
        )));
        if metrics.rsi < 25.0 {
            score += 3.0;
            warnings.push(Reason::warning(format!(
                "EXTREME oversold (RSI: {:.1}) - high risk/reward",
                metrics.rsi
            )));
        }
    } else if metrics.rsi > config.rsi_overbought {
        // Overbought in a strong uptrend is momentum, not necessarily a top
        score -= if strong_uptrend { 6.0 } else { 12.0 };
        if !strong_uptrend {
            bearish_count += 1;
        }
        reasons.push(Reason::bearish(format!(
            "RSI overbought at {:.1} (potential pullback)",
            metrics.rsi
        )));
        if metrics.rsi > 75.0 {
            if strong_uptrend {
                warnings.push(Reason::warning(format!(
                    "Overbought but in strong uptrend (RSI: {:.1})",
                    metrics.rsi
                )));
            } else {
                score -= 3.0;
                warnings.push(Reason::warning(format!(
                    "EXTREME overbought (RSI: {:.1})",
                    metrics.rsi
                )));
            }
        }
    } else if (45.0..=65.0).contains(&metrics.rsi) {
        score += 3.0;
        reasons.push(Reason::bullish(format!(
            "RSI healthy at {:.1} (neutral to bullish)",
            metrics.rsi
        )));
    } else if (35.0..45.0).contains(&metrics.rsi) {
        reasons.push(Reason::info(format!("RSI slightly weak at {:.1}", metrics.rsi)));
    } else if metrics.rsi > 65.0 && metrics.rsi <= 70.0 {
        reasons.push(Reason::info(format!("RSI slightly strong at {:.1}", metrics.rsi)));
    }

    // 3. MACD; full weight only when line and histogram agree
    if let (Some(macd), Some(signal), Some(histogram)) =
        (metrics.macd, metrics.macd_signal, metrics.macd_histogram)
    {
        if macd > signal && histogram > 0.0 {
            score += 20.0;
            bullish_count += 1;
            reasons.push(Reason::bullish("MACD bullish crossover (strong momentum)"));
        } else if macd < signal && histogram < 0.0 {
            score -= 20.0;
            bearish_count += 1;
            reasons.push(Reason::bearish("MACD bearish crossover (weak momentum)"));
        } else if macd > signal {
            score += 8.0;
            reasons.push(Reason::bullish("MACD line above signal (building momentum)"));
        } else if macd < signal {
            score -= 8.0;
            reasons.push(Reason::bearish("MACD line below signal (losing momentum)"));
        }
    } else {
        // No MACD lead-in yet; lean on plain 50-day momentum instead
        if metrics.price_change_50d > 10.0 {
            score += 8.0;
            reasons.push(Reason::bullish(format!(
                "Strong 50-day price momentum (+{:.1}%)",
                metrics.price_change_50d
            )));
        } else if metrics.price_change_50d < -10.0 {
            score -= 8.0;
            reasons.push(Reason::bearish(format!(
                "Weak 50-day price momentum ({:.1}%)",
                metrics.price_change_50d
            )));
        }
    }

    // 4. Price vs short EMA
    if metrics.current_price > metrics.ema_20 {
        score += 12.0;
        bullish_count += 1;
        reasons.push(Reason::bullish("Price above 20-day EMA (short-term uptrend)"));
    } else {
        score -= 12.0;
        bearish_count += 1;
        reasons.push(Reason::bearish("Price below 20-day EMA (short-term downtrend)"));
    }

    // 5. Bollinger position
    if metrics.bb_position < 0.2 {
        score += 10.0;
        bullish_count += 1;
        reasons.push(Reason::bullish("Near lower Bollinger Band (oversold)"));
        if metrics.bb_position < 0.05 {
            score += 5.0;
            warnings.push(Reason::warning("Touching lower Bollinger Band (extreme oversold)"));
        }
    } else if metrics.bb_position > 0.8 {
        score -= 10.0;
        bearish_count += 1;
        reasons.push(Reason::bearish("Near upper Bollinger Band (overbought)"));
        if metrics.bb_position > 0.95 {
            score -= 5.0;
            warnings.push(Reason::warning("Touching upper Bollinger Band (extreme overbought)"));
        }
    }

    // 6. Volume; supporting indicator, never counted toward confirmation
    if metrics.volume_ratio > 1.5 {
        score += 10.0;
        reasons.push(Reason::bullish(format!(
            "High volume ({:.1}x average) - strong interest",
            metrics.volume_ratio
        )));
        if metrics.volume_ratio > 2.5 {
            score += 5.0;
            warnings.push(Reason::warning(format!(
                "VERY high volume ({:.1}x) - major move",
                metrics.volume_ratio
            )));
        }
    } else if metrics.volume_ratio < 0.5 {
        score -= 5.0;
        reasons.push(Reason::bearish(format!(
            "Low volume ({:.1}x average) - weak conviction",
            metrics.volume_ratio
        )));
        if metrics.volume_ratio < 0.3 {
            warnings.push(Reason::warning(format!(
                "EXTREMELY low volume ({:.1}x) - no interest",
                metrics.volume_ratio
            )));
        }
    }

    // 7. Trend strength
    if metrics.trend_strength > STRONG_TREND {
        score += 15.0;
        bullish_count += 1;
        reasons.push(Reason::bullish(format!(
            "Strong uptrend (strength: {:.2})",
            metrics.trend_strength
        )));
    } else if metrics.trend_strength < -STRONG_TREND {
        score -= 15.0;
        bearish_count += 1;
        reasons.push(Reason::bearish(format!(
            "Strong downtrend (strength: {:.2})",
            metrics.trend_strength
        )));
    } else if metrics.trend_strength.abs() < 0.3 {
        // Ranging markets are normal; note it without moving the score
        warnings.push(Reason::warning("Weak/ranging market - choppy conditions"));
    }

    // 8. Extended move relative to the long MA
    let distance_from_sma_200 =
        (metrics.current_price - metrics.sma_200) / metrics.sma_200 * 100.0;
    if distance_from_sma_200 > 30.0 {
        score -= 5.0;
        warnings.push(Reason::warning(format!(
            "Extended above SMA200 (+{:.1}%) - overheated",
            distance_from_sma_200
        )));
    } else if distance_from_sma_200 < -30.0 {
        score += 5.0;
        warnings.push(Reason::warning(format!(
            "Extended below SMA200 ({:.1}%) - oversold",
            distance_from_sma_200
        )));
    }

    // 9. Fundamentals; absent and non-positive values both skip the rules
    if let (Some(pe), Some(forward_pe)) = (metrics.pe_ratio, metrics.forward_pe) {
        if pe > 0.0 && forward_pe > 0.0 {
            if forward_pe < 15.0 && pe < 25.0 {
                score += 10.0;
                reasons.push(Reason::bullish(format!(
                    "Attractive valuation (P/E: {:.1}, Fwd P/E: {:.1})",
                    pe, forward_pe
                )));
            } else if pe > 40.0 {
                score -= 5.0;
                reasons.push(Reason::warning(format!("High valuation (P/E: {:.1})", pe)));
            }
        }
    }

    if let Some(peg) = metrics.peg_ratio {
        if peg > 0.0 && peg < 1.0 {
            score += 5.0;
            reasons.push(Reason::bullish(format!("Excellent PEG ratio: {:.2}", peg)));
        }
    }

    // 10. Veto conditions only dampen toward zero, never flip the sign
    let mut veto_reason: Option<Reason> = None;

    if metrics.rsi > 75.0 && metrics.bb_position > 0.9 && score > 0.0 {
        let reduction = score.min(15.0);
        score -= reduction;
        veto_reason = Some(Reason::veto(format!(
            "VETO: Extreme overbought (RSI: {:.1}, BB: {:.0}%) - reduced score by {}",
            metrics.rsi,
            metrics.bb_position * 100.0,
            reduction
        )));
    }

    if metrics.rsi < 25.0 && metrics.bb_position < 0.1 && score < 0.0 {
        let reduction = score.abs().min(15.0);
        score += reduction;
        veto_reason = Some(Reason::veto(format!(
            "VETO: Extreme oversold (RSI: {:.1}, BB: {:.0}%) - reduced bearish score by {}",
            metrics.rsi,
            metrics.bb_position * 100.0,
            reduction
        )));
    }

    // 11. A strong score needs at least 4 of the 7 key indicators behind it
    if score > 30.0 && bullish_count < 4 {
        score -= 5.0;
        warnings.push(Reason::warning(format!(
            "Bullish score lacks confirmation ({}/7 bullish indicators)",
            bullish_count
        )));
    }
    if score < -30.0 && bearish_count < 4 {
        score += 5.0;
        warnings.push(Reason::warning(format!(
            "Bearish score lacks confirmation ({}/7 bearish indicators)",
            bearish_count
        )));
    }

    // Veto first, then rule reasons in evaluation order, then warnings
    let mut all_reasons = Vec::with_capacity(reasons.len() + warnings.len() + 1);
    if let Some(veto) = veto_reason {
        all_reasons.push(veto);
    }
    all_reasons.extend(reasons);
    all_reasons.extend(warnings);

    ScoreResult { score, reasons: all_reasons, bullish_count, bearish_count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::ReasonKind;

    fn neutral_metrics() -> StockMetrics {
        StockMetrics {
            current_price: 100.0,
            sma_50: 99.0,
            sma_200: 98.0,
            ema_20: 99.5,
            rsi: 55.0,
            macd: Some(1.0),
            macd_signal: Some(0.5),
            macd_histogram: Some(0.5),
            bb_position: 0.5,
            volume_ratio: 1.0,
            atr: 2.0,
            trend_strength: 0.5,
            pe_ratio: None,
            forward_pe: None,
            peg_ratio: None,
            profit_margin: None,
            debt_to_equity: None,
            price_change_50d: 5.0,
        }
    }

    #[test]
    fn score_is_deterministic() {
        let metrics = neutral_metrics();
        let config = AnalysisConfig::default();

        let first = calculate_score(&metrics, &config);
        let second = calculate_score(&metrics, &config);

        assert_eq!(first.score, second.score);
        assert_eq!(first.reasons, second.reasons);
        assert_eq!(first.bullish_count, second.bullish_count);
        assert_eq!(first.bearish_count, second.bearish_count);
    }

    #[test]
    fn bullish_setup_accumulates_expected_points() {
        // Golden cross +15, healthy RSI +3, MACD crossover +20, above EMA
        // +12 gives 50; only 3 of 7 indicators confirm, so the confirmation
        // rule trims 5
        let result = calculate_score(&neutral_metrics(), &AnalysisConfig::default());

        assert_eq!(result.score, 45.0);
        assert_eq!(result.bullish_count, 3);
        assert_eq!(result.bearish_count, 0);
    }

    #[test]
    fn overbought_veto_dampens_but_never_reverses() {
        let mut metrics = neutral_metrics();
        metrics.rsi = 80.0;
        metrics.bb_position = 0.96;
        metrics.trend_strength = 0.5;

        let result = calculate_score(&metrics, &AnalysisConfig::default());

        // Pre-veto: 15 + 20 + 12 = 47, minus RSI 12+3 and BB 10+5 = 17,
        // veto trims min(17, 15)
        assert!(result.score >= 0.0);
        assert_eq!(result.reasons[0].kind, ReasonKind::Veto);
        assert!(result.reasons[0].text.contains("Extreme overbought"));
    }

    #[test]
    fn veto_only_applies_to_positive_scores() {
        let mut metrics = neutral_metrics();
        metrics.sma_50 = 90.0;
        metrics.sma_200 = 95.0;
        metrics.ema_20 = 105.0;
        metrics.macd = Some(-1.0);
        metrics.macd_signal = Some(0.0);
        metrics.macd_histogram = Some(-1.0);
        metrics.rsi = 80.0;
        metrics.bb_position = 0.96;

        let result = calculate_score(&metrics, &AnalysisConfig::default());

        assert!(result.score < 0.0);
        assert!(result.reasons.iter().all(|r| r.kind != ReasonKind::Veto));
    }

    #[test]
    fn oversold_veto_lifts_bearish_score_toward_zero() {
        let mut metrics = neutral_metrics();
        metrics.sma_50 = 90.0;
        metrics.sma_200 = 95.0;
        metrics.ema_20 = 105.0;
        metrics.macd = Some(-1.0);
        metrics.macd_signal = Some(0.0);
        metrics.macd_histogram = Some(-1.0);
        metrics.rsi = 20.0;
        metrics.bb_position = 0.05;
        metrics.trend_strength = -0.5;

        let with_veto = calculate_score(&metrics, &AnalysisConfig::default());

        assert_eq!(with_veto.reasons[0].kind, ReasonKind::Veto);
        assert!(with_veto.reasons[0].text.contains("Extreme oversold"));
        // Dampened toward zero but still bearish overall
        assert!(with_veto.score <= 0.0);
    }

    #[test]
    fn rsi_overbought_softened_in_strong_uptrend() {
        let mut base = neutral_metrics();
        base.rsi = 78.0;
        // Near the lower band so both variants keep 4+ confirming indicators
        // and the confirmation rule stays out of the comparison
        base.bb_position = 0.1;

        let mut trending = base.clone();
        trending.trend_strength = 1.2;
        let mut flat = base;
        flat.trend_strength = 0.5;

        let trending_result = calculate_score(&trending, &AnalysisConfig::default());
        let flat_result = calculate_score(&flat, &AnalysisConfig::default());

        // Strong uptrend: -6 penalty, no extreme penalty, no bearish count.
        // Without it: -12 - 3 and a bearish tally.
        // The trend itself also adds +15, so compare against that exactly.
        assert_eq!(trending_result.score - 15.0, flat_result.score + 9.0);
        assert_eq!(trending_result.bearish_count, 0);
        assert_eq!(flat_result.bearish_count, 1);
    }

    #[test]
    fn rsi_oversold_softened_in_strong_downtrend() {
        let mut base = neutral_metrics();
        base.rsi = 28.0;

        let mut falling = base.clone();
        falling.trend_strength = -1.0;
        let mut flat = base;
        flat.trend_strength = 0.0;

        let falling_result = calculate_score(&falling, &AnalysisConfig::default());
        let flat_result = calculate_score(&flat, &AnalysisConfig::default());

        // Downtrend halves the bounce bonus (8 vs 12) and adds its own -15
        assert_eq!(flat_result.score - falling_result.score, 4.0 + 15.0);
        assert_eq!(falling_result.bullish_count, flat_result.bullish_count);
    }

    #[test]
    fn macd_fallback_uses_price_momentum() {
        let mut metrics = neutral_metrics();
        metrics.macd = None;
        metrics.macd_signal = None;
        metrics.macd_histogram = None;
        metrics.price_change_50d = 12.0;

        let result = calculate_score(&metrics, &AnalysisConfig::default());

        assert!(result
            .reasons
            .iter()
            .any(|r| r.text.contains("Strong 50-day price momentum")));
        // +8 momentum replaces the +20 crossover; confirmation trims 5 more
        assert_eq!(result.score, 33.0);
    }

    #[test]
    fn fundamentals_skipped_when_absent_or_non_positive() {
        let mut negative_pe = neutral_metrics();
        negative_pe.pe_ratio = Some(-5.0);
        negative_pe.forward_pe = Some(10.0);

        let base = calculate_score(&neutral_metrics(), &AnalysisConfig::default());
        let with_negative = calculate_score(&negative_pe, &AnalysisConfig::default());

        assert_eq!(base.score, with_negative.score);
    }

    #[test]
    fn attractive_valuation_and_peg_add_points() {
        let mut metrics = neutral_metrics();
        metrics.pe_ratio = Some(20.0);
        metrics.forward_pe = Some(12.0);
        metrics.peg_ratio = Some(0.8);

        let base = calculate_score(&neutral_metrics(), &AnalysisConfig::default());
        let result = calculate_score(&metrics, &AnalysisConfig::default());

        assert_eq!(result.score, base.score + 10.0 + 5.0);
    }

    #[test]
    fn confirmation_rule_trims_unsupported_scores() {
        // High score from few indicators: golden cross + MACD + EMA gives 47
        // with only 3 confirming indicators
        let mut metrics = neutral_metrics();
        metrics.rsi = 55.0;

        let result = calculate_score(&metrics, &AnalysisConfig::default());

        assert!(result.score > 30.0);
        assert!(result.bullish_count < 4);
        assert!(result
            .reasons
            .iter()
            .any(|r| r.text.contains("lacks confirmation")));
    }

    #[test]
    fn warnings_follow_rule_reasons() {
        let mut metrics = neutral_metrics();
        metrics.volume_ratio = 3.0;
        metrics.trend_strength = 0.1;

        let result = calculate_score(&metrics, &AnalysisConfig::default());

        let first_warning = result
            .reasons
            .iter()
            .position(|r| r.kind == ReasonKind::Warning)
            .unwrap();
        let last_non_warning = result
            .reasons
            .iter()
            .rposition(|r| r.kind != ReasonKind::Warning)
            .unwrap();
        assert!(first_warning > last_non_warning);
    }
}

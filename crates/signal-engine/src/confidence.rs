/// Convert indicator agreement and score magnitude into a 0-100 confidence
/// percentage.
///
/// Confidence is a secondary enrichment: a non-finite intermediate degrades
/// to `min(|score|, 100)` instead of failing the analysis.
pub fn confidence_score(bullish_count: u32, bearish_count: u32, score: f64) -> f64 {
    let total = bullish_count + bearish_count;
    if total == 0 {
        return 50.0;
    }

    let dominant = bullish_count.max(bearish_count) as f64;
    let agreement_ratio = dominant / total as f64;

    // Base confidence from agreement alone lands in 50-80
    let mut confidence = 50.0 + agreement_ratio * 30.0;

    // Decisive scores earn a bonus
    let abs_score = score.abs();
    if abs_score >= 35.0 {
        confidence += 15.0;
    } else if abs_score >= 20.0 {
        confidence += 8.0;
    }

    // Conflicting indicators cost 3 points each
    confidence -= (bullish_count.min(bearish_count) * 3) as f64;

    let clamped = confidence.clamp(0.0, 100.0).round();
    if clamped.is_finite() {
        clamped
    } else {
        abs_score.min(100.0)
    }
}

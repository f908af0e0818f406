/// Outcome of ticker validation: the sanitized symbol plus every failed check
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub sanitized_ticker: String,
    pub errors: Vec<String>,
}

const MAX_TICKER_LEN: usize = 10;

/// Sanitize and validate a ticker symbol before any network call.
///
/// Trims whitespace and uppercases, then collects every rule violation so
/// callers can report all of them at once.
pub fn validate_ticker(input: &str) -> ValidationResult {
    let sanitized = input.trim().to_uppercase();
    let mut errors = Vec::new();

    if sanitized.is_empty() {
        errors.push("Ticker cannot be empty".to_string());
    }
    if sanitized.len() > MAX_TICKER_LEN {
        errors.push(format!("Ticker cannot exceed {} characters", MAX_TICKER_LEN));
    }
    if !sanitized.is_empty()
        && !sanitized
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        errors.push("Ticker contains invalid characters".to_string());
    }

    let is_sep = |c: char| c == '.' || c == '-';
    let chars: Vec<char> = sanitized.chars().collect();
    if chars.windows(2).any(|w| is_sep(w[0]) && is_sep(w[1])) {
        errors.push("Ticker cannot contain consecutive dots or dashes".to_string());
    }
    if chars.first().copied().is_some_and(is_sep) || chars.last().copied().is_some_and(is_sep) {
        errors.push("Ticker cannot start or end with a dot or dash".to_string());
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        sanitized_ticker: sanitized,
        errors,
    }
}

pub fn is_valid_ticker(input: &str) -> bool {
    validate_ticker(input).is_valid
}

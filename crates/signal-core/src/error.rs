use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid ticker symbol: {0}")]
    Validation(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Chart generation error: {0}")]
    Chart(String),

    #[error("Analysis failed for {ticker}: {message}")]
    Analysis { ticker: String, message: String },
}

impl AnalyzerError {
    /// Wrap any analyzer-internal failure with the ticker it belongs to.
    /// Validation errors pass through untouched so callers can still map
    /// them to a 400.
    pub fn for_ticker(self, ticker: &str) -> Self {
        match self {
            AnalyzerError::Validation(_) => self,
            other => AnalyzerError::Analysis {
                ticker: ticker.to_string(),
                message: other.to_string(),
            },
        }
    }
}

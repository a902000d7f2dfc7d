use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Calculation error: Division by zero encountered in metric '{0}'")]
    DivisionByZero(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}

impl AnalyticsError {
    /// Conditions that callers report as `insufficient_data` instead of failing.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            AnalyticsError::NotEnoughData(_) | AnalyticsError::DivisionByZero(_)
        )
    }
}

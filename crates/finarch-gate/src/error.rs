/// Errors that can occur during AML screening.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The request itself is malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

use crate::token::Span;
use thiserror::Error;

/// Main error type for query construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EsQueryError {
    #[error("Unsupported operator '{operator}' for field '{field}'")]
    UnsupportedOperator { field: String, operator: String },

    #[error("{operator} operator requires {required} values, got {actual}")]
    InvalidValueCount {
        operator: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Failed to parse condition expression: {message}")]
    ConditionParse {
        message: String,
        span: Option<Span>,
    },

    #[error("Field mapping config error: {0}")]
    Config(String),
}

impl EsQueryError {
    pub(crate) fn unsupported_operator(field: &str, operator: &str) -> Self {
        Self::UnsupportedOperator {
            field: field.to_string(),
            operator: operator.to_string(),
        }
    }

    pub(crate) fn parse(message: String, span: Option<Span>) -> Self {
        Self::ConditionParse { message, span }
    }
}

/// Result type alias for query construction.
pub type Result<T> = std::result::Result<T, EsQueryError>;

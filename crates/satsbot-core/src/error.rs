use thiserror::Error;

/// Validation errors raised while building canonical records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("rank must be a positive integer")]
    ZeroRank,
    #[error("rank {rank} does not follow previous rank {previous}")]
    RankOutOfOrder { rank: u32, previous: u32 },
    #[error("asset name cannot be empty")]
    EmptyName,

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("invalid hashrate unit '{value}', expected one of h, kh, mh, gh, th, ph, eh")]
    InvalidHashrateUnit { value: String },
    #[error("invalid row selector '{value}'")]
    InvalidSelector { value: String },
}

/// Errors raised while turning one raw payload into records.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("payload could not be decoded: {reason}")]
    MalformedPayload { reason: String },

    #[error("no row selector matched ({selectors_tried} tried; title={title:?}, tables={table_count})")]
    NoRowsFound {
        selectors_tried: usize,
        title: Option<String>,
        table_count: usize,
    },

    #[error("selector '{selector}' matched {rows} row(s) but none produced a record")]
    NoValidRows { selector: String, rows: usize },
}

impl NormalizeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }
}

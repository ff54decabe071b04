//! Source adapter contract and the per-source error classification used by
//! the chain's fallback.
//!
//! # Error kinds
//!
//! | Kind | Code | Raised when |
//! |------|------|-------------|
//! | [`SourceErrorKind::Transport`] | `source.transport` | connection failure or deadline expiry |
//! | [`SourceErrorKind::BadStatus`] | `source.bad_status` | upstream answered with a non-2xx status |
//! | [`SourceErrorKind::MalformedPayload`] | `source.malformed_payload` | body present but not decodable |
//! | [`SourceErrorKind::NoRowsFound`] | `source.no_rows_found` | no selector matched usable rows |
//!
//! Every kind is recoverable: the chain logs it and moves on to the next
//! source.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::error::NormalizeError;
use crate::http_client::HttpError;
use crate::{AssetRecord, SourceAttempt, SourceId};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Transport,
    BadStatus,
    MalformedPayload,
    NoRowsFound,
}

/// Structured source error used by the chain fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    status: Option<u16>,
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: message.into(),
            status: None,
        }
    }

    pub fn bad_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::BadStatus,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedPayload,
            message: message.into(),
            status: None,
        }
    }

    pub fn no_rows_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NoRowsFound,
            message: message.into(),
            status: None,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::BadStatus => "source.bad_status",
            SourceErrorKind::MalformedPayload => "source.malformed_payload",
            SourceErrorKind::NoRowsFound => "source.no_rows_found",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<HttpError> for SourceError {
    fn from(error: HttpError) -> Self {
        if error.timed_out() {
            Self::transport(format!("deadline exceeded: {}", error.message()))
        } else {
            Self::transport(error.message())
        }
    }
}

impl From<NormalizeError> for SourceError {
    fn from(error: NormalizeError) -> Self {
        match error {
            NormalizeError::MalformedPayload { .. } => Self::malformed_payload(error.to_string()),
            NormalizeError::NoRowsFound { .. } | NormalizeError::NoValidRows { .. } => {
                Self::no_rows_found(error.to_string())
            }
        }
    }
}

/// Records produced by one successful source attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceYield {
    pub records: Vec<AssetRecord>,
    pub attempt: SourceAttempt,
}

/// Static description of a configured source, for diagnostics output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub id: SourceId,
    pub url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selectors: Vec<String>,
}

pub type SourceFuture<'a> = Pin<Box<dyn Future<Output = Result<SourceYield, SourceError>> + Send + 'a>>;

/// Contract for one stage of the asset-ranking chain.
///
/// A stage performs exactly one upstream call per [`fetch`](AssetSource::fetch)
/// and normalizes the payload into at most ten ranked records. Returning an
/// empty record list is not allowed; an attempt with nothing usable is an
/// error so the chain can fall through.
pub trait AssetSource: Send + Sync {
    fn id(&self) -> SourceId;

    fn descriptor(&self) -> SourceDescriptor;

    fn fetch<'a>(&'a self) -> SourceFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_transport_with_deadline_note() {
        let error = SourceError::from(HttpError::timeout("request timeout"));

        assert_eq!(error.kind(), SourceErrorKind::Transport);
        assert!(error.message().starts_with("deadline exceeded"));
    }

    #[test]
    fn normalizer_errors_keep_their_category() {
        let malformed = SourceError::from(NormalizeError::malformed("expected array"));
        assert_eq!(malformed.code(), "source.malformed_payload");

        let empty = SourceError::from(NormalizeError::NoValidRows {
            selector: String::from("table tbody tr"),
            rows: 4,
        });
        assert_eq!(empty.kind(), SourceErrorKind::NoRowsFound);
        assert!(empty.message().contains("table tbody tr"));
    }

    #[test]
    fn bad_status_keeps_status_code() {
        let error = SourceError::bad_status(503, "upstream returned status 503");
        assert_eq!(error.status(), Some(503));
        assert_eq!(error.to_string(), "upstream returned status 503 (source.bad_status)");
    }
}

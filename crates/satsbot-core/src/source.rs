use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifiers for the stages of the asset-ranking source chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceId {
    PrimaryApi,
    SecondaryApi,
    Scrape,
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryApi => "primary-api",
            Self::SecondaryApi => "secondary-api",
            Self::Scrape => "scrape",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "primary-api" => Ok(Self::PrimaryApi),
            "secondary-api" => Ok(Self::SecondaryApi),
            "scrape" => Ok(Self::Scrape),
            other => Err(format!("unknown source '{other}'")),
        }
    }
}

/// Which source produced (or failed to produce) one retrieval attempt.
///
/// Scrape attempts carry the row selector that matched, rendered as
/// `scrape:<selector>`. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttempt {
    pub source: SourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl SourceAttempt {
    pub const fn new(source: SourceId) -> Self {
        Self {
            source,
            selector: None,
        }
    }

    pub fn scrape(selector: impl Into<String>) -> Self {
        Self {
            source: SourceId::Scrape,
            selector: Some(selector.into()),
        }
    }
}

impl Display for SourceAttempt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.selector {
            Some(selector) => write!(f, "{}:{selector}", self.source),
            None => f.write_str(self.source.as_str()),
        }
    }
}

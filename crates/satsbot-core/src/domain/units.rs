use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Trailing magnitude suffixes accepted on scraped market-cap strings, in the
/// order they are checked.
pub const MAGNITUDE_SUFFIXES: [(char, f64); 3] = [('T', 1e12), ('B', 1e9), ('M', 1e6)];

/// Unit a hashrate source reports its figure in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashrateUnit {
    H,
    Kh,
    Mh,
    Gh,
    Th,
    Ph,
    Eh,
}

impl HashrateUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::H => "H/s",
            Self::Kh => "KH/s",
            Self::Mh => "MH/s",
            Self::Gh => "GH/s",
            Self::Th => "TH/s",
            Self::Ph => "PH/s",
            Self::Eh => "EH/s",
        }
    }

    /// Hashes per second represented by one unit.
    pub const fn hashes_per_second(self) -> f64 {
        match self {
            Self::H => 1.0,
            Self::Kh => 1e3,
            Self::Mh => 1e6,
            Self::Gh => 1e9,
            Self::Th => 1e12,
            Self::Ph => 1e15,
            Self::Eh => 1e18,
        }
    }

    pub fn convert(self, value: f64, target: Self) -> f64 {
        value * self.hashes_per_second() / target.hashes_per_second()
    }
}

impl Display for HashrateUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashrateUnit {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.trim_end_matches("/s") {
            "h" => Ok(Self::H),
            "kh" => Ok(Self::Kh),
            "mh" => Ok(Self::Mh),
            "gh" => Ok(Self::Gh),
            "th" => Ok(Self::Th),
            "ph" => Ok(Self::Ph),
            "eh" => Ok(Self::Eh),
            _ => Err(ValidationError::InvalidHashrateUnit {
                value: value.to_owned(),
            }),
        }
    }
}

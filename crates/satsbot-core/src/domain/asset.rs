use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Maximum number of records in one ranked result set.
pub const MAX_RECORDS: usize = 10;

/// One ranked entity from a market-capitalization listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub rank: u32,
    pub name: String,
    pub symbol: String,
    pub market_cap_usd: f64,
}

impl AssetRecord {
    pub fn new(
        rank: u32,
        name: impl Into<String>,
        symbol: impl Into<String>,
        market_cap_usd: f64,
    ) -> Result<Self, ValidationError> {
        if rank == 0 {
            return Err(ValidationError::ZeroRank);
        }

        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        validate_non_negative("market_cap_usd", market_cap_usd)?;

        Ok(Self {
            rank,
            name,
            symbol: symbol.into().trim().to_owned(),
            market_cap_usd,
        })
    }
}

/// Collector enforcing the result-set invariant: at most [`MAX_RECORDS`]
/// records with strictly ascending ranks.
#[derive(Debug, Default)]
pub struct RecordSet {
    records: Vec<AssetRecord>,
    rejected: usize,
}

impl RecordSet {
    pub fn new() -> Self {
        Self {
            records: Vec::with_capacity(MAX_RECORDS),
            rejected: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= MAX_RECORDS
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of candidates rejected so far, including the ones the caller
    /// reported through [`RecordSet::reject`].
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn reject(&mut self) {
        self.rejected += 1;
    }

    /// Accepts a record unless the set is full or its rank does not follow the
    /// last accepted rank.
    pub fn push(&mut self, record: AssetRecord) -> Result<(), ValidationError> {
        if let Some(previous) = self.records.last().map(|last| last.rank) {
            if record.rank <= previous {
                self.rejected += 1;
                return Err(ValidationError::RankOutOfOrder {
                    rank: record.rank,
                    previous,
                });
            }
        }

        if !self.is_full() {
            self.records.push(record);
        }
        Ok(())
    }

    pub fn into_records(self) -> Vec<AssetRecord> {
        self.records
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

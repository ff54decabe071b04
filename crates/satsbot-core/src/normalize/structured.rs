use serde_json::Value;
use tracing::debug;

use crate::domain::{AssetRecord, RecordSet, MAX_RECORDS};
use crate::error::NormalizeError;

/// Where the entry array lives inside a structured payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryLocation {
    /// The payload itself is the array.
    TopLevel,
    /// The array sits under this key of a top-level object.
    Field(String),
}

/// Per-source description of a structured payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadShape {
    pub entries: EntryLocation,
    pub rank_field: String,
    pub name_field: String,
    pub symbol_field: String,
    pub market_cap_field: String,
    pub uppercase_symbols: bool,
}

impl PayloadShape {
    /// `[{rank, name, symbol, marketCap}]`
    pub fn canonical() -> Self {
        Self {
            entries: EntryLocation::TopLevel,
            rank_field: String::from("rank"),
            name_field: String::from("name"),
            symbol_field: String::from("symbol"),
            market_cap_field: String::from("marketCap"),
            uppercase_symbols: false,
        }
    }

    /// CoinGecko `/coins/markets`.
    pub fn coingecko_markets() -> Self {
        Self {
            entries: EntryLocation::TopLevel,
            rank_field: String::from("market_cap_rank"),
            name_field: String::from("name"),
            symbol_field: String::from("symbol"),
            market_cap_field: String::from("market_cap"),
            uppercase_symbols: true,
        }
    }

    /// CoinCap `/v2/assets`, numbers encoded as strings.
    pub fn coincap_assets() -> Self {
        Self {
            entries: EntryLocation::Field(String::from("data")),
            rank_field: String::from("rank"),
            name_field: String::from("name"),
            symbol_field: String::from("symbol"),
            market_cap_field: String::from("marketCapUsd"),
            uppercase_symbols: false,
        }
    }
}

/// Decodes a structured payload into at most ten ranked records.
///
/// Only the first ten entries are considered. An entry that cannot be turned
/// into a record is skipped; the call fails only when the payload shape
/// itself is wrong or nothing usable remains.
pub fn normalize_structured(
    body: &str,
    shape: &PayloadShape,
) -> Result<Vec<AssetRecord>, NormalizeError> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| NormalizeError::malformed(format!("invalid json: {e}")))?;

    let entries = match &shape.entries {
        EntryLocation::TopLevel => payload.as_array(),
        EntryLocation::Field(key) => payload.get(key.as_str()).and_then(Value::as_array),
    }
    .ok_or_else(|| NormalizeError::malformed("expected an array of entries"))?;

    let mut set = RecordSet::new();
    for (index, entry) in entries.iter().take(MAX_RECORDS).enumerate() {
        match decode_entry(entry, shape) {
            Some(record) => {
                if let Err(error) = set.push(record) {
                    debug!(index, %error, "skipping structured entry");
                }
            }
            None => {
                set.reject();
                debug!(index, "skipping undecodable structured entry");
            }
        }
    }

    if set.rejected() > 0 {
        debug!(
            accepted = set.len(),
            skipped = set.rejected(),
            "structured payload had unusable entries"
        );
    }

    if set.is_empty() {
        return Err(NormalizeError::malformed(format!(
            "none of {} entries could be decoded",
            entries.len().min(MAX_RECORDS)
        )));
    }

    Ok(set.into_records())
}

fn decode_entry(entry: &Value, shape: &PayloadShape) -> Option<AssetRecord> {
    let rank = entry
        .get(shape.rank_field.as_str())
        .and_then(as_u64)
        .and_then(|rank| u32::try_from(rank).ok())?;
    let name = entry.get(shape.name_field.as_str())?.as_str()?;
    let symbol = entry
        .get(shape.symbol_field.as_str())
        .and_then(Value::as_str)
        .unwrap_or_default();
    let market_cap = entry.get(shape.market_cap_field.as_str()).and_then(as_f64)?;

    let symbol = if shape.uppercase_symbols {
        symbol.to_uppercase()
    } else {
        symbol.to_owned()
    };

    AssetRecord::new(rank, name, symbol, market_cap).ok()
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

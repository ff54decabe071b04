//! Canonical domain types shared by adapters, the normalizer and rendering.

pub mod asset;
pub mod units;

pub use asset::{AssetRecord, RecordSet, MAX_RECORDS};
pub use units::{HashrateUnit, MAGNITUDE_SUFFIXES};

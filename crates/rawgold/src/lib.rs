//! Raw-gold ledger domain for the goldsmith platform.
//!
//! Tracks loose (unworked) gold by weight: purchases in, workshop issue
//! out, wastage, returns, and manual adjustments. The ledger is
//! append-only; the available balance is a fold over the signed entries.

pub mod ledger;

pub use ledger::{
    EntryKind, EntryRecorded, RawGoldCommand, RawGoldEvent, RawGoldLedger, RawGoldLedgerId,
    RecordEntry,
};

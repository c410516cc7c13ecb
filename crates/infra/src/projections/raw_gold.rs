use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use goldsmith_core::Grams;
use goldsmith_events::EventEnvelope;
use goldsmith_rawgold::{EntryKind, RawGoldEvent};

use super::{CursorGate, ProjectionError, StreamCursors};

/// One raw-gold ledger entry as shown to the operator, with the running
/// balance after it was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGoldEntryRow {
    pub entry_id: Uuid,
    pub kind: EntryKind,
    pub weight: Grams,
    pub signed_delta: Grams,
    pub notes: Option<String>,
    pub performed_by: String,
    pub occurred_at: DateTime<Utc>,
    /// Balance after this entry, folding in chronological (insertion) order.
    pub balance_after: Grams,
}

/// Raw-gold ledger projection.
///
/// Keeps entries in insertion order with a precomputed running balance;
/// the display query just reverses them (newest first), and the available
/// balance is the last entry's `balance_after`.
#[derive(Debug, Default)]
pub struct RawGoldProjection {
    rows: RwLock<Vec<RawGoldEntryRow>>,
    cursors: StreamCursors,
}

impl RawGoldProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Available raw gold: the fold over all entries in order.
    pub fn available(&self) -> Grams {
        let rows = match self.rows.read() {
            Ok(r) => r,
            Err(_) => return Grams::ZERO,
        };
        rows.last().map(|r| r.balance_after).unwrap_or(Grams::ZERO)
    }

    /// Entries newest-first, each carrying its running balance.
    pub fn entries_newest_first(&self) -> Vec<RawGoldEntryRow> {
        let rows = match self.rows.read() {
            Ok(r) => r,
            Err(_) => return vec![],
        };
        rows.iter().rev().cloned().collect()
    }

    /// Apply a published envelope into the projection (idempotent).
    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), ProjectionError> {
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if self.cursors.gate(aggregate_id, seq)? == CursorGate::Skip {
            return Ok(());
        }

        let event: RawGoldEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;

        let RawGoldEvent::EntryRecorded(e) = event;
        if e.ledger_id.0 != aggregate_id {
            return Err(ProjectionError::StreamMismatch(
                "event ledger_id does not match envelope aggregate_id".to_string(),
            ));
        }

        let mut rows = self
            .rows
            .write()
            .map_err(|_| ProjectionError::Poisoned("raw gold rows".to_string()))?;
        let signed_delta = e.signed_delta();
        let balance_after = rows
            .last()
            .map(|r| r.balance_after)
            .unwrap_or(Grams::ZERO)
            .saturating_add(signed_delta);
        rows.push(RawGoldEntryRow {
            entry_id: envelope.event_id(),
            kind: e.kind,
            weight: e.weight,
            signed_delta,
            notes: e.notes,
            performed_by: e.performed_by,
            occurred_at: e.occurred_at,
            balance_after,
        });
        drop(rows);

        self.cursors.advance(aggregate_id, seq);
        Ok(())
    }

    /// Rebuild the read model from scratch by replaying envelopes.
    pub fn rebuild_from_scratch(
        &self,
        envelopes: impl IntoIterator<Item = EventEnvelope<JsonValue>>,
    ) -> Result<(), ProjectionError> {
        self.cursors.clear();
        self.rows
            .write()
            .map_err(|_| ProjectionError::Poisoned("raw gold rows".to_string()))?
            .clear();

        let mut envs: Vec<_> = envelopes.into_iter().collect();
        envs.sort_by_key(|e| (*e.aggregate_id().as_uuid().as_bytes(), e.sequence_number()));

        for env in &envs {
            self.apply_envelope(env)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use goldsmith_core::AggregateId;
    use goldsmith_rawgold::{EntryRecorded, RawGoldLedgerId};

    fn entry_envelope(ledger_id: RawGoldLedgerId, seq: u64) -> EventEnvelope<JsonValue> {
        let event = RawGoldEvent::EntryRecorded(EntryRecorded {
            ledger_id,
            kind: EntryKind::Received,
            weight: "100.000".parse().unwrap(),
            notes: None,
            performed_by: "admin".to_string(),
            occurred_at: Utc::now(),
        });
        EventEnvelope::new(
            Uuid::now_v7(),
            ledger_id.0,
            "rawgold.ledger",
            seq,
            serde_json::to_value(&event).unwrap(),
        )
    }

    #[test]
    fn poisoned_rows_lock_is_an_error_and_leaves_the_cursor_behind() {
        let projection = RawGoldProjection::new();
        let ledger_id = RawGoldLedgerId::new(AggregateId::new());

        let poisoner = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = projection.rows.write().unwrap();
            panic!("poison");
        }));
        assert!(poisoner.is_err());

        let err = projection
            .apply_envelope(&entry_envelope(ledger_id, 1))
            .unwrap_err();
        assert!(matches!(err, ProjectionError::Poisoned(_)));
        assert_eq!(
            projection.cursors.gate(ledger_id.0, 1).unwrap(),
            CursorGate::Apply
        );
    }
}

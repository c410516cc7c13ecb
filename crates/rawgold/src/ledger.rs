use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goldsmith_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Grams};
use goldsmith_events::Event;

/// Raw-gold ledger identifier. The shop runs a single ledger stream, but
/// the aggregate is keyed like any other so the store machinery stays
/// uniform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawGoldLedgerId(pub AggregateId);

impl RawGoldLedgerId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for RawGoldLedgerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Ledger entry classification. Received and Returned add to the available
/// balance; Used and Wastage subtract. Adjustment takes its sign from the
/// weight as given.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Received,
    Used,
    Wastage,
    Returned,
    Adjustment,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Received => "received",
            EntryKind::Used => "used",
            EntryKind::Wastage => "wastage",
            EntryKind::Returned => "returned",
            EntryKind::Adjustment => "adjustment",
        }
    }
}

impl core::str::FromStr for EntryKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(EntryKind::Received),
            "used" => Ok(EntryKind::Used),
            "wastage" => Ok(EntryKind::Wastage),
            "returned" => Ok(EntryKind::Returned),
            "adjustment" => Ok(EntryKind::Adjustment),
            other => Err(DomainError::validation(format!(
                "unknown raw-gold entry kind: {other}"
            ))),
        }
    }
}

/// Aggregate root: RawGoldLedger.
///
/// Append-only by construction (the only command appends an entry), so the
/// balance carried here is always a fold over the full event stream.
/// Negative balances are allowed to surface; they signal a data-entry
/// problem upstream and are reported, not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGoldLedger {
    id: RawGoldLedgerId,
    balance: Grams,
    entry_count: u64,
    version: u64,
}

impl RawGoldLedger {
    pub fn empty(id: RawGoldLedgerId) -> Self {
        Self {
            id,
            balance: Grams::ZERO,
            entry_count: 0,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> RawGoldLedgerId {
        self.id
    }

    /// Available raw gold: Σ(received + returned) − Σ(used + wastage)
    /// ± adjustments, in entry order.
    pub fn available(&self) -> Grams {
        self.balance
    }

    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }
}

impl AggregateRoot for RawGoldLedger {
    type Id = RawGoldLedgerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RecordEntry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub ledger_id: RawGoldLedgerId,
    pub kind: EntryKind,
    /// Positive for every kind except Adjustment, where the sign is taken
    /// as given.
    pub weight: Grams,
    pub notes: Option<String>,
    pub performed_by: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawGoldCommand {
    RecordEntry(RecordEntry),
}

/// Event: EntryRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecorded {
    pub ledger_id: RawGoldLedgerId,
    pub kind: EntryKind,
    pub weight: Grams,
    pub notes: Option<String>,
    pub performed_by: String,
    pub occurred_at: DateTime<Utc>,
}

impl EntryRecorded {
    /// Signed effect of this entry on the available balance.
    pub fn signed_delta(&self) -> Grams {
        match self.kind {
            EntryKind::Received | EntryKind::Returned => self.weight,
            EntryKind::Used | EntryKind::Wastage => self.weight.neg(),
            EntryKind::Adjustment => self.weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawGoldEvent {
    EntryRecorded(EntryRecorded),
}

impl Event for RawGoldEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RawGoldEvent::EntryRecorded(_) => "rawgold.entry.recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RawGoldEvent::EntryRecorded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for RawGoldLedger {
    type Command = RawGoldCommand;
    type Event = RawGoldEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            RawGoldEvent::EntryRecorded(e) => {
                self.balance = self.balance.saturating_add(e.signed_delta());
                self.entry_count += 1;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            RawGoldCommand::RecordEntry(cmd) => self.handle_record(cmd),
        }
    }
}

impl RawGoldLedger {
    fn handle_record(&self, cmd: &RecordEntry) -> Result<Vec<RawGoldEvent>, DomainError> {
        if cmd.performed_by.trim().is_empty() {
            return Err(DomainError::validation("performed_by cannot be empty"));
        }
        match cmd.kind {
            EntryKind::Adjustment => {
                if cmd.weight.is_zero() {
                    return Err(DomainError::validation(
                        "adjustment weight cannot be zero",
                    ));
                }
            }
            _ => {
                if !cmd.weight.is_positive() {
                    return Err(DomainError::validation("weight must be positive"));
                }
            }
        }
        Ok(vec![RawGoldEvent::EntryRecorded(EntryRecorded {
            ledger_id: cmd.ledger_id,
            kind: cmd.kind,
            weight: cmd.weight,
            notes: cmd.notes.clone(),
            performed_by: cmd.performed_by.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldsmith_core::AggregateId;
    use goldsmith_events::execute;

    fn test_ledger() -> RawGoldLedger {
        RawGoldLedger::empty(RawGoldLedgerId::new(AggregateId::new()))
    }

    fn record(ledger: &mut RawGoldLedger, kind: EntryKind, weight: &str) {
        let cmd = RawGoldCommand::RecordEntry(RecordEntry {
            ledger_id: ledger.id_typed(),
            kind,
            weight: weight.parse().unwrap(),
            notes: None,
            performed_by: "tester".to_string(),
            occurred_at: Utc::now(),
        });
        execute(ledger, &cmd).unwrap();
    }

    #[test]
    fn received_used_wastage_returned_fold() {
        let mut ledger = test_ledger();
        record(&mut ledger, EntryKind::Received, "100.000");
        record(&mut ledger, EntryKind::Used, "30.000");
        record(&mut ledger, EntryKind::Wastage, "2.000");
        record(&mut ledger, EntryKind::Returned, "5.000");

        assert_eq!(ledger.available().to_string(), "73.000");
        assert_eq!(ledger.entry_count(), 4);
    }

    #[test]
    fn adjustment_sign_is_taken_as_given() {
        let mut ledger = test_ledger();
        record(&mut ledger, EntryKind::Received, "10.000");
        record(&mut ledger, EntryKind::Adjustment, "-1.500");
        record(&mut ledger, EntryKind::Adjustment, "0.250");

        assert_eq!(ledger.available().to_string(), "8.750");
    }

    #[test]
    fn negative_balance_is_reported_not_rejected() {
        let mut ledger = test_ledger();
        record(&mut ledger, EntryKind::Used, "4.000");

        assert!(ledger.available().is_negative());
        assert_eq!(ledger.available().to_string(), "-4.000");
    }

    #[test]
    fn non_adjustment_entries_reject_non_positive_weight() {
        let ledger = test_ledger();
        for weight in ["0.000", "-1.000"] {
            let err = ledger
                .handle(&RawGoldCommand::RecordEntry(RecordEntry {
                    ledger_id: ledger.id_typed(),
                    kind: EntryKind::Received,
                    weight: weight.parse().unwrap(),
                    notes: None,
                    performed_by: "tester".to_string(),
                    occurred_at: Utc::now(),
                }))
                .unwrap_err();
            match err {
                DomainError::Validation(_) => {}
                _ => panic!("Expected Validation error for weight {weight}"),
            }
        }
    }

    #[test]
    fn zero_adjustment_is_rejected() {
        let ledger = test_ledger();
        let err = ledger
            .handle(&RawGoldCommand::RecordEntry(RecordEntry {
                ledger_id: ledger.id_typed(),
                kind: EntryKind::Adjustment,
                weight: Grams::ZERO,
                notes: None,
                performed_by: "tester".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for zero adjustment"),
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_entry() -> impl Strategy<Value = (EntryKind, i64)> {
            prop_oneof![
                (Just(EntryKind::Received), 1i64..5_000_000),
                (Just(EntryKind::Used), 1i64..5_000_000),
                (Just(EntryKind::Wastage), 1i64..5_000_000),
                (Just(EntryKind::Returned), 1i64..5_000_000),
                (
                    Just(EntryKind::Adjustment),
                    (1i64..5_000_000).prop_flat_map(|mg| prop_oneof![Just(mg), Just(-mg)])
                ),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: replaying the same ordered entries onto a fresh
            /// ledger reproduces the same available balance, and the
            /// balance equals the sum of signed deltas.
            #[test]
            fn fold_is_deterministic_and_matches_signed_sum(
                entries in prop::collection::vec(arb_entry(), 0..40),
            ) {
                let id = RawGoldLedgerId::new(AggregateId::new());
                let mut first = RawGoldLedger::empty(id);
                let mut events = Vec::new();

                let mut expected_mg = 0i64;
                for (kind, mg) in &entries {
                    let weight = Grams::from_milligrams(*mg);
                    let cmd = RawGoldCommand::RecordEntry(RecordEntry {
                        ledger_id: id,
                        kind: *kind,
                        weight,
                        notes: None,
                        performed_by: "tester".to_string(),
                        occurred_at: Utc::now(),
                    });
                    events.extend(execute(&mut first, &cmd).unwrap());
                    expected_mg += match kind {
                        EntryKind::Received | EntryKind::Returned => *mg,
                        EntryKind::Used | EntryKind::Wastage => -*mg,
                        EntryKind::Adjustment => *mg,
                    };
                }

                let mut replayed = RawGoldLedger::empty(id);
                for event in &events {
                    replayed.apply(event);
                }

                prop_assert_eq!(first.available(), replayed.available());
                prop_assert_eq!(first.available().milligrams(), expected_mg);
            }
        }
    }
}

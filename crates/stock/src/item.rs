use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goldsmith_catalog::ProductId;
use goldsmith_core::{
    Aggregate, AggregateId, AggregateRoot, CustomerId, DomainError, Grams, LocationId,
};
use goldsmith_events::Event;

/// Stock item identifier (one physical piece).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockItemId(pub AggregateId);

impl StockItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for StockItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Where a physical item is, encoded so the core invariant is unrepresentable
/// to violate: an item is either at exactly one location or sold, never both,
/// never neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemState {
    /// Unsold, residing at a location.
    Located { location_id: LocationId },
    /// Sold; the item has left the location graph.
    Sold {
        sold_at: DateTime<Utc>,
        sold_to_customer: Option<CustomerId>,
        sold_to_name: Option<String>,
    },
}

/// Aggregate root: StockItem.
///
/// `weight` is snapshotted at intake and never changes; catalog edits must not
/// retroactively alter what was weighed into stock or sold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockItem {
    id: StockItemId,
    product_id: Option<ProductId>,
    weight: Grams,
    show_on_website: bool,
    state: Option<ItemState>,
    version: u64,
}

impl StockItem {
    /// Create an empty, not-yet-received aggregate instance for rehydration.
    pub fn empty(id: StockItemId) -> Self {
        Self {
            id,
            product_id: None,
            weight: Grams::ZERO,
            show_on_website: false,
            state: None,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> StockItemId {
        self.id
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn weight(&self) -> Grams {
        self.weight
    }

    pub fn show_on_website(&self) -> bool {
        self.show_on_website
    }

    /// `None` until the item has been received into stock.
    pub fn state(&self) -> Option<&ItemState> {
        self.state.as_ref()
    }

    pub fn is_sold(&self) -> bool {
        matches!(self.state, Some(ItemState::Sold { .. }))
    }

    /// Current location, `None` if sold or not yet received.
    pub fn current_location(&self) -> Option<LocationId> {
        match self.state {
            Some(ItemState::Located { location_id }) => Some(location_id),
            _ => None,
        }
    }
}

impl AggregateRoot for StockItem {
    type Id = StockItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: ReceiveItem (stock intake; assigns the initial location).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveItem {
    pub item_id: StockItemId,
    pub product_id: ProductId,
    pub weight: Grams,
    pub location_id: LocationId,
    pub performed_by: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MoveItem (transfer between locations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveItem {
    pub item_id: StockItemId,
    pub from_location_id: LocationId,
    pub to_location_id: LocationId,
    pub performed_by: String,
    pub remarks: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SellItem (the item leaves the location graph).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellItem {
    pub item_id: StockItemId,
    pub from_location_id: LocationId,
    pub performed_by: String,
    pub remarks: Option<String>,
    pub sold_to_customer: Option<CustomerId>,
    pub sold_to_name: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetWebsiteVisibility (independent of physical state).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetWebsiteVisibility {
    pub item_id: StockItemId,
    pub visible: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockItemCommand {
    ReceiveItem(ReceiveItem),
    MoveItem(MoveItem),
    SellItem(SellItem),
    SetWebsiteVisibility(SetWebsiteVisibility),
}

/// Event: ItemReceived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReceived {
    pub item_id: StockItemId,
    pub product_id: ProductId,
    pub weight: Grams,
    pub location_id: LocationId,
    pub performed_by: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemMoved (a MOVE ledger row; both endpoints are locations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMoved {
    pub item_id: StockItemId,
    pub from_location_id: LocationId,
    pub to_location_id: LocationId,
    pub performed_by: String,
    pub remarks: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemSold (a SALE ledger row; no destination location).
///
/// Carries `product_id` and `weight` snapshotted at sale time so sales
/// reporting never re-derives them from a catalog that may have changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSold {
    pub item_id: StockItemId,
    pub from_location_id: LocationId,
    pub product_id: ProductId,
    pub weight: Grams,
    pub performed_by: String,
    pub remarks: Option<String>,
    pub sold_to_customer: Option<CustomerId>,
    pub sold_to_name: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VisibilityChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityChanged {
    pub item_id: StockItemId,
    pub visible: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockItemEvent {
    ItemReceived(ItemReceived),
    ItemMoved(ItemMoved),
    ItemSold(ItemSold),
    VisibilityChanged(VisibilityChanged),
}

impl StockItemEvent {
    /// Movements are relocations and sales; intake and visibility flips are
    /// not part of an item's location history.
    pub fn is_movement(&self) -> bool {
        matches!(self, StockItemEvent::ItemMoved(_) | StockItemEvent::ItemSold(_))
    }
}

impl Event for StockItemEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StockItemEvent::ItemReceived(_) => "stock.item.received",
            StockItemEvent::ItemMoved(_) => "stock.item.moved",
            StockItemEvent::ItemSold(_) => "stock.item.sold",
            StockItemEvent::VisibilityChanged(_) => "stock.item.visibility_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StockItemEvent::ItemReceived(e) => e.occurred_at,
            StockItemEvent::ItemMoved(e) => e.occurred_at,
            StockItemEvent::ItemSold(e) => e.occurred_at,
            StockItemEvent::VisibilityChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for StockItem {
    type Command = StockItemCommand;
    type Event = StockItemEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            StockItemEvent::ItemReceived(e) => {
                self.id = e.item_id;
                self.product_id = Some(e.product_id);
                self.weight = e.weight;
                self.show_on_website = false;
                self.state = Some(ItemState::Located {
                    location_id: e.location_id,
                });
            }
            StockItemEvent::ItemMoved(e) => {
                self.state = Some(ItemState::Located {
                    location_id: e.to_location_id,
                });
            }
            StockItemEvent::ItemSold(e) => {
                self.state = Some(ItemState::Sold {
                    sold_at: e.occurred_at,
                    sold_to_customer: e.sold_to_customer,
                    sold_to_name: e.sold_to_name.clone(),
                });
            }
            StockItemEvent::VisibilityChanged(e) => {
                self.show_on_website = e.visible;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StockItemCommand::ReceiveItem(cmd) => self.handle_receive(cmd),
            StockItemCommand::MoveItem(cmd) => self.handle_move(cmd),
            StockItemCommand::SellItem(cmd) => self.handle_sell(cmd),
            StockItemCommand::SetWebsiteVisibility(cmd) => self.handle_set_visibility(cmd),
        }
    }
}

impl StockItem {
    fn ensure_item_id(&self, item_id: StockItemId) -> Result<(), DomainError> {
        if self.id != item_id {
            return Err(DomainError::precondition("item_id mismatch"));
        }
        Ok(())
    }

    /// Item must exist, be unsold, and actually be where the caller thinks it
    /// is. The stale-`from` check is what makes a concurrent mover's loser
    /// fail loudly instead of silently overwriting.
    fn ensure_at(&self, from: LocationId) -> Result<(), DomainError> {
        match self.state {
            None => Err(DomainError::not_found()),
            Some(ItemState::Sold { .. }) => Err(DomainError::precondition("item already sold")),
            Some(ItemState::Located { location_id }) if location_id != from => {
                Err(DomainError::precondition(format!(
                    "item is at location {location_id}, not {from}"
                )))
            }
            Some(ItemState::Located { .. }) => Ok(()),
        }
    }

    fn handle_receive(&self, cmd: &ReceiveItem) -> Result<Vec<StockItemEvent>, DomainError> {
        if self.state.is_some() {
            return Err(DomainError::conflict("item already exists"));
        }
        if !cmd.weight.is_positive() {
            return Err(DomainError::validation("weight must be positive"));
        }
        if cmd.performed_by.trim().is_empty() {
            return Err(DomainError::validation("performed_by cannot be empty"));
        }
        Ok(vec![StockItemEvent::ItemReceived(ItemReceived {
            item_id: cmd.item_id,
            product_id: cmd.product_id,
            weight: cmd.weight,
            location_id: cmd.location_id,
            performed_by: cmd.performed_by.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_move(&self, cmd: &MoveItem) -> Result<Vec<StockItemEvent>, DomainError> {
        self.ensure_item_id(cmd.item_id)?;
        if cmd.performed_by.trim().is_empty() {
            return Err(DomainError::validation("performed_by cannot be empty"));
        }
        if cmd.from_location_id == cmd.to_location_id {
            return Err(DomainError::validation(
                "destination must differ from source location",
            ));
        }
        self.ensure_at(cmd.from_location_id)?;

        Ok(vec![StockItemEvent::ItemMoved(ItemMoved {
            item_id: cmd.item_id,
            from_location_id: cmd.from_location_id,
            to_location_id: cmd.to_location_id,
            performed_by: cmd.performed_by.clone(),
            remarks: cmd.remarks.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_sell(&self, cmd: &SellItem) -> Result<Vec<StockItemEvent>, DomainError> {
        self.ensure_item_id(cmd.item_id)?;
        if cmd.performed_by.trim().is_empty() {
            return Err(DomainError::validation("performed_by cannot be empty"));
        }
        self.ensure_at(cmd.from_location_id)?;

        // Snapshot product + weight into the sale fact; the ItemReceived event
        // guarantees both are set by the time we get here.
        let product_id = self
            .product_id
            .ok_or_else(|| DomainError::precondition("item has no product"))?;

        Ok(vec![StockItemEvent::ItemSold(ItemSold {
            item_id: cmd.item_id,
            from_location_id: cmd.from_location_id,
            product_id,
            weight: self.weight,
            performed_by: cmd.performed_by.clone(),
            remarks: cmd.remarks.clone(),
            sold_to_customer: cmd.sold_to_customer,
            sold_to_name: cmd.sold_to_name.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_visibility(
        &self,
        cmd: &SetWebsiteVisibility,
    ) -> Result<Vec<StockItemEvent>, DomainError> {
        self.ensure_item_id(cmd.item_id)?;
        if self.state.is_none() {
            return Err(DomainError::not_found());
        }
        if self.show_on_website == cmd.visible {
            return Ok(vec![]);
        }
        Ok(vec![StockItemEvent::VisibilityChanged(VisibilityChanged {
            item_id: cmd.item_id,
            visible: cmd.visible,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldsmith_core::AggregateId;
    use goldsmith_events::execute;

    fn test_item_id() -> StockItemId {
        StockItemId::new(AggregateId::new())
    }

    fn test_product_id() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn grams(s: &str) -> Grams {
        s.parse().unwrap()
    }

    fn received_item(item_id: StockItemId, location: LocationId, weight: &str) -> StockItem {
        let mut item = StockItem::empty(item_id);
        let cmd = StockItemCommand::ReceiveItem(ReceiveItem {
            item_id,
            product_id: test_product_id(),
            weight: grams(weight),
            location_id: location,
            performed_by: "admin".to_string(),
            occurred_at: test_time(),
        });
        execute(&mut item, &cmd).unwrap();
        item
    }

    #[test]
    fn receive_item_emits_item_received_event() {
        let item_id = test_item_id();
        let product_id = test_product_id();
        let location = LocationId::new();
        let item = StockItem::empty(item_id);

        let cmd = ReceiveItem {
            item_id,
            product_id,
            weight: grams("10.500"),
            location_id: location,
            performed_by: "admin".to_string(),
            occurred_at: test_time(),
        };

        let events = item.handle(&StockItemCommand::ReceiveItem(cmd)).unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            StockItemEvent::ItemReceived(e) => {
                assert_eq!(e.item_id, item_id);
                assert_eq!(e.product_id, product_id);
                assert_eq!(e.weight, grams("10.500"));
                assert_eq!(e.location_id, location);
            }
            _ => panic!("Expected ItemReceived event"),
        }
    }

    #[test]
    fn receive_rejects_non_positive_weight() {
        let item_id = test_item_id();
        let item = StockItem::empty(item_id);
        let cmd = ReceiveItem {
            item_id,
            product_id: test_product_id(),
            weight: Grams::ZERO,
            location_id: LocationId::new(),
            performed_by: "admin".to_string(),
            occurred_at: test_time(),
        };

        let err = item.handle(&StockItemCommand::ReceiveItem(cmd)).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for zero weight"),
        }
    }

    #[test]
    fn receive_rejects_duplicate_intake() {
        let item_id = test_item_id();
        let location = LocationId::new();
        let item = received_item(item_id, location, "5.000");

        let cmd = ReceiveItem {
            item_id,
            product_id: test_product_id(),
            weight: grams("5.000"),
            location_id: location,
            performed_by: "admin".to_string(),
            occurred_at: test_time(),
        };

        let err = item.handle(&StockItemCommand::ReceiveItem(cmd)).unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for duplicate intake"),
        }
    }

    #[test]
    fn move_updates_current_location() {
        let item_id = test_item_id();
        let a = LocationId::new();
        let b = LocationId::new();
        let mut item = received_item(item_id, a, "10.500");

        let cmd = StockItemCommand::MoveItem(MoveItem {
            item_id,
            from_location_id: a,
            to_location_id: b,
            performed_by: "admin".to_string(),
            remarks: Some("transfer".to_string()),
            occurred_at: test_time(),
        });

        let events = execute(&mut item, &cmd).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(item.current_location(), Some(b));
        assert!(!item.is_sold());
    }

    #[test]
    fn move_with_stale_from_location_is_a_precondition_error() {
        let item_id = test_item_id();
        let a = LocationId::new();
        let b = LocationId::new();
        let c = LocationId::new();
        let item = received_item(item_id, a, "10.500");

        // Caller believes the item is at B; it is actually at A.
        let cmd = StockItemCommand::MoveItem(MoveItem {
            item_id,
            from_location_id: b,
            to_location_id: c,
            performed_by: "admin".to_string(),
            remarks: None,
            occurred_at: test_time(),
        });

        let err = item.handle(&cmd).unwrap_err();
        match err {
            DomainError::Precondition(_) => {}
            _ => panic!("Expected Precondition error for stale from-location"),
        }
    }

    #[test]
    fn move_to_same_location_is_a_validation_error() {
        let item_id = test_item_id();
        let a = LocationId::new();
        let item = received_item(item_id, a, "10.500");

        let cmd = StockItemCommand::MoveItem(MoveItem {
            item_id,
            from_location_id: a,
            to_location_id: a,
            performed_by: "admin".to_string(),
            remarks: None,
            occurred_at: test_time(),
        });

        let err = item.handle(&cmd).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for same-location move"),
        }
    }

    #[test]
    fn sell_snapshots_weight_and_product() {
        let item_id = test_item_id();
        let a = LocationId::new();
        let mut item = received_item(item_id, a, "10.500");
        let product_id = item.product_id().unwrap();
        let buyer = CustomerId::new();

        let cmd = StockItemCommand::SellItem(SellItem {
            item_id,
            from_location_id: a,
            performed_by: "admin".to_string(),
            remarks: None,
            sold_to_customer: Some(buyer),
            sold_to_name: Some("Walk-in".to_string()),
            occurred_at: test_time(),
        });

        let events = execute(&mut item, &cmd).unwrap();
        match &events[0] {
            StockItemEvent::ItemSold(e) => {
                assert_eq!(e.weight, grams("10.500"));
                assert_eq!(e.product_id, product_id);
                assert_eq!(e.from_location_id, a);
                assert_eq!(e.sold_to_customer, Some(buyer));
            }
            _ => panic!("Expected ItemSold event"),
        }

        assert!(item.is_sold());
        assert_eq!(item.current_location(), None);
    }

    #[test]
    fn second_sell_is_rejected_as_precondition_violation() {
        let item_id = test_item_id();
        let a = LocationId::new();
        let mut item = received_item(item_id, a, "10.500");

        let sell = |item: &StockItem| {
            item.handle(&StockItemCommand::SellItem(SellItem {
                item_id,
                from_location_id: a,
                performed_by: "admin".to_string(),
                remarks: None,
                sold_to_customer: None,
                sold_to_name: None,
                occurred_at: test_time(),
            }))
        };

        let events = sell(&item).unwrap();
        for e in &events {
            item.apply(e);
        }

        let err = sell(&item).unwrap_err();
        match err {
            DomainError::Precondition(msg) => assert!(msg.contains("already sold")),
            _ => panic!("Expected Precondition error for double sale"),
        }
    }

    #[test]
    fn move_after_sale_is_rejected() {
        let item_id = test_item_id();
        let a = LocationId::new();
        let b = LocationId::new();
        let mut item = received_item(item_id, a, "10.500");

        let cmd = StockItemCommand::SellItem(SellItem {
            item_id,
            from_location_id: a,
            performed_by: "admin".to_string(),
            remarks: None,
            sold_to_customer: None,
            sold_to_name: None,
            occurred_at: test_time(),
        });
        execute(&mut item, &cmd).unwrap();

        let err = item
            .handle(&StockItemCommand::MoveItem(MoveItem {
                item_id,
                from_location_id: a,
                to_location_id: b,
                performed_by: "admin".to_string(),
                remarks: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::Precondition(_) => {}
            _ => panic!("Expected Precondition error for moving a sold item"),
        }
    }

    #[test]
    fn visibility_toggle_is_independent_of_physical_state() {
        let item_id = test_item_id();
        let a = LocationId::new();
        let mut item = received_item(item_id, a, "10.500");

        let show = StockItemCommand::SetWebsiteVisibility(SetWebsiteVisibility {
            item_id,
            visible: true,
            occurred_at: test_time(),
        });
        let events = execute(&mut item, &show).unwrap();
        assert_eq!(events.len(), 1);
        assert!(item.show_on_website());

        // Setting the already-current value is a no-op, not an error.
        let events = execute(&mut item, &show).unwrap();
        assert!(events.is_empty());

        assert_eq!(item.current_location(), Some(a));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: after any sequence of valid moves, the item is located
            /// exactly at the destination of the last move, and its weight is
            /// unchanged from intake.
            #[test]
            fn replayed_moves_end_at_last_destination(
                hops in prop::collection::vec(0usize..4, 1..12),
                weight_mg in 1i64..10_000_000i64,
            ) {
                let locations: Vec<LocationId> = (0..5).map(|_| LocationId::new()).collect();
                let item_id = test_item_id();
                let mut item = StockItem::empty(item_id);

                let receive = StockItemCommand::ReceiveItem(ReceiveItem {
                    item_id,
                    product_id: test_product_id(),
                    weight: Grams::from_milligrams(weight_mg),
                    location_id: locations[4],
                    performed_by: "admin".to_string(),
                    occurred_at: test_time(),
                });
                execute(&mut item, &receive).unwrap();

                let mut at = locations[4];
                for hop in hops {
                    let to = locations[hop];
                    if to == at {
                        continue;
                    }
                    let cmd = StockItemCommand::MoveItem(MoveItem {
                        item_id,
                        from_location_id: at,
                        to_location_id: to,
                        performed_by: "admin".to_string(),
                        remarks: None,
                        occurred_at: test_time(),
                    });
                    execute(&mut item, &cmd).unwrap();
                    at = to;
                }

                prop_assert_eq!(item.current_location(), Some(at));
                prop_assert!(!item.is_sold());
                prop_assert_eq!(item.weight(), Grams::from_milligrams(weight_mg));
            }

            /// Property: once sold, every further move or sell attempt fails
            /// with a precondition error and the state stays sold.
            #[test]
            fn sold_items_reject_all_further_movement(
                attempts in prop::collection::vec(0usize..3, 1..8),
            ) {
                let locations: Vec<LocationId> = (0..3).map(|_| LocationId::new()).collect();
                let item_id = test_item_id();
                let mut item = StockItem::empty(item_id);

                execute(&mut item, &StockItemCommand::ReceiveItem(ReceiveItem {
                    item_id,
                    product_id: test_product_id(),
                    weight: Grams::from_milligrams(1_000),
                    location_id: locations[0],
                    performed_by: "admin".to_string(),
                    occurred_at: test_time(),
                })).unwrap();

                execute(&mut item, &StockItemCommand::SellItem(SellItem {
                    item_id,
                    from_location_id: locations[0],
                    performed_by: "admin".to_string(),
                    remarks: None,
                    sold_to_customer: None,
                    sold_to_name: None,
                    occurred_at: test_time(),
                })).unwrap();

                for to in attempts {
                    let err = item.handle(&StockItemCommand::MoveItem(MoveItem {
                        item_id,
                        from_location_id: locations[0],
                        to_location_id: locations[to],
                        performed_by: "admin".to_string(),
                        remarks: None,
                        occurred_at: test_time(),
                    }));
                    prop_assert!(matches!(
                        err,
                        Err(DomainError::Precondition(_)) | Err(DomainError::Validation(_))
                    ));
                    prop_assert!(item.is_sold());
                    prop_assert_eq!(item.current_location(), None);
                }
            }
        }
    }
}

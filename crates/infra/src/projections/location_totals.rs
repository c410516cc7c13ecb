use std::collections::HashMap;

use goldsmith_core::{Grams, LocationId};

use super::item_state::ItemReadModel;

/// Aggregate totals for one location: unsold piece count and summed weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationTotals {
    pub location_id: LocationId,
    pub pieces: u64,
    pub total_weight: Grams,
}

/// Group unsold items by current location and sum weight/pieces.
///
/// This is the location summary contract: a pure fold over the item
/// projection, so it always equals the sum over currently-unsold items at
/// each location, whatever sequence of moves and sales produced them. Sold
/// items have no location and contribute nowhere.
pub fn summarize_locations(items: impl IntoIterator<Item = ItemReadModel>) -> Vec<LocationTotals> {
    let mut by_location: HashMap<LocationId, LocationTotals> = HashMap::new();

    for item in items {
        let Some(location_id) = item.location_id else {
            continue;
        };
        let entry = by_location
            .entry(location_id)
            .or_insert_with(|| LocationTotals {
                location_id,
                pieces: 0,
                total_weight: Grams::ZERO,
            });
        entry.pieces += 1;
        entry.total_weight = entry.total_weight.saturating_add(item.weight);
    }

    let mut totals: Vec<_> = by_location.into_values().collect();
    totals.sort_by(|a, b| a.location_id.as_uuid().cmp(b.location_id.as_uuid()));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use goldsmith_catalog::ProductId;
    use goldsmith_core::AggregateId;
    use goldsmith_stock::StockItemId;

    fn item(location: Option<LocationId>, weight: &str, sold: bool) -> ItemReadModel {
        ItemReadModel {
            item_id: StockItemId::new(AggregateId::new()),
            product_id: ProductId::new(AggregateId::new()),
            weight: weight.parse().unwrap(),
            show_on_website: false,
            location_id: location,
            sold,
            sold_at: sold.then(Utc::now),
            sold_to_customer: None,
            sold_to_name: None,
            received_at: Utc::now(),
        }
    }

    #[test]
    fn totals_cover_only_unsold_items() {
        let a = LocationId::new();
        let b = LocationId::new();

        let items = vec![
            item(Some(a), "10.000", false),
            item(Some(a), "2.500", false),
            item(Some(b), "1.000", false),
            item(None, "99.000", true),
        ];

        let mut totals = summarize_locations(items);
        totals.sort_by_key(|t| t.pieces);

        assert_eq!(totals.len(), 2);
        let at_b = totals.iter().find(|t| t.location_id == b).unwrap();
        assert_eq!(at_b.pieces, 1);
        assert_eq!(at_b.total_weight.to_string(), "1.000");
        let at_a = totals.iter().find(|t| t.location_id == a).unwrap();
        assert_eq!(at_a.pieces, 2);
        assert_eq!(at_a.total_weight.to_string(), "12.500");
    }

    #[test]
    fn empty_input_yields_empty_summary() {
        assert!(summarize_locations(vec![]).is_empty());
    }
}

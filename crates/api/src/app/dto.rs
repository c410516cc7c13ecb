use serde::Deserialize;

use goldsmith_infra::projections::{
    CustomerSales, ItemReadModel, LocationTotals, ProductReadModel, ProductSales, RawGoldEntryRow,
    SoldItemRow,
};
use goldsmith_infra::{Category, CustomerProfile, MovementRecord, Subcategory};
use goldsmith_stock::Location;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubcategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub weight: String, // grams, e.g. "10.500"
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub live_stock: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub image_url: Option<String>,
    pub live_stock: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RetireProductRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiveItemRequest {
    pub product_id: String,
    pub location_id: String,
    /// Piece weight; falls back to the catalog weight when omitted.
    pub weight: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveItemRequest {
    pub from_location_id: String,
    pub to_location_id: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SellItemRequest {
    pub from_location_id: String,
    pub remarks: Option<String>,
    pub sold_to_customer: Option<String>,
    pub sold_to_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetVisibilityRequest {
    pub visible: bool,
}

#[derive(Debug, Deserialize)]
pub struct BulkMoveRequest {
    pub items: Vec<BulkMoveItem>,
}

#[derive(Debug, Deserialize)]
pub struct BulkMoveItem {
    pub item_id: String,
    pub from_location_id: String,
    pub to_location_id: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkSellRequest {
    pub items: Vec<BulkSellItem>,
}

#[derive(Debug, Deserialize)]
pub struct BulkSellItem {
    pub item_id: String,
    pub from_location_id: String,
    pub remarks: Option<String>,
    pub sold_to_customer: Option<String>,
    pub sold_to_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordRawGoldEntryRequest {
    pub kind: String, // received | used | wastage | returned | adjustment
    pub weight: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetCustomerBalanceRequest {
    pub balance: String, // grams, may be negative
}

/// Item listing filter (query string).
#[derive(Debug, Default, Deserialize)]
pub struct ItemFilterQuery {
    pub location_id: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub min_weight: Option<String>,
    pub max_weight: Option<String>,
    pub show_on_website: Option<bool>,
    pub sold: Option<bool>,
}

/// Date window for reports (query string, RFC3339 bounds).
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<usize>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn location_to_json(l: &Location) -> serde_json::Value {
    serde_json::json!({
        "id": l.id.to_string(),
        "name": l.name,
        "code": l.code,
    })
}

pub fn category_to_json(c: &Category, subcategories: &[Subcategory]) -> serde_json::Value {
    serde_json::json!({
        "id": c.id.to_string(),
        "name": c.name,
        "subcategories": subcategories
            .iter()
            .map(|s| serde_json::json!({
                "id": s.id.to_string(),
                "name": s.name,
            }))
            .collect::<Vec<_>>(),
    })
}

pub fn product_to_json(p: &ProductReadModel) -> serde_json::Value {
    serde_json::json!({
        "id": p.product_id.0.to_string(),
        "name": p.name,
        "weight": p.weight.to_string(),
        "category_id": p.category_id.map(|id| id.to_string()),
        "subcategory_id": p.subcategory_id.map(|id| id.to_string()),
        "image_url": p.image_url,
        "live_stock": p.live_stock,
        "retired": p.retired,
    })
}

/// Display names joined onto an item row (catalog + registries).
#[derive(Debug, Clone, Default)]
pub struct ItemNames {
    pub product_name: Option<String>,
    pub category_name: Option<String>,
    pub subcategory_name: Option<String>,
    pub location_name: Option<String>,
}

/// Item row denormalized for the admin listing: ids plus the product,
/// category/subcategory and location names the operator actually reads.
pub fn item_to_json(i: &ItemReadModel, names: &ItemNames) -> serde_json::Value {
    serde_json::json!({
        "id": i.item_id.0.to_string(),
        "product_id": i.product_id.0.to_string(),
        "product_name": names.product_name,
        "category_name": names.category_name,
        "subcategory_name": names.subcategory_name,
        "weight": i.weight.to_string(),
        "show_on_website": i.show_on_website,
        "location_id": i.location_id.map(|id| id.to_string()),
        "location_name": names.location_name,
        "sold": i.sold,
        "sold_at": i.sold_at.map(|t| t.to_rfc3339()),
        "sold_to_customer": i.sold_to_customer.map(|id| id.to_string()),
        "sold_to_name": i.sold_to_name,
        "received_at": i.received_at.to_rfc3339(),
    })
}

/// Movement row with location names joined from the registry.
pub fn movement_to_json(
    m: &MovementRecord,
    from_name: Option<String>,
    to_name: Option<String>,
) -> serde_json::Value {
    serde_json::json!({
        "movement_type": m.movement_type,
        "from_location_id": m.from_location_id.to_string(),
        "from_location_name": from_name,
        "to_location_id": m.to_location_id.map(|id| id.to_string()),
        "to_location_name": to_name,
        "performed_by": m.performed_by,
        "remarks": m.remarks,
        "occurred_at": m.occurred_at.to_rfc3339(),
        "sequence_number": m.sequence_number,
    })
}

pub fn location_totals_to_json(t: &LocationTotals, name: Option<String>) -> serde_json::Value {
    serde_json::json!({
        "location_id": t.location_id.to_string(),
        "location_name": name,
        "pieces": t.pieces,
        "total_weight": t.total_weight.to_string(),
    })
}

pub fn raw_gold_entry_to_json(e: &RawGoldEntryRow) -> serde_json::Value {
    serde_json::json!({
        "entry_id": e.entry_id.to_string(),
        "kind": e.kind.as_str(),
        "weight": e.weight.to_string(),
        "signed_delta": e.signed_delta.to_string(),
        "notes": e.notes,
        "performed_by": e.performed_by,
        "occurred_at": e.occurred_at.to_rfc3339(),
        "balance_after": e.balance_after.to_string(),
    })
}

pub fn customer_to_json(c: &CustomerProfile) -> serde_json::Value {
    serde_json::json!({
        "id": c.id.to_string(),
        "name": c.name,
        "phone": c.phone,
        "balance": c.balance.to_string(),
    })
}

pub fn sold_item_to_json(r: &SoldItemRow) -> serde_json::Value {
    serde_json::json!({
        "item_id": r.item_id.0.to_string(),
        "product_id": r.product_id.0.to_string(),
        "weight": r.weight.to_string(),
        "from_location_id": r.from_location_id.to_string(),
        "sold_to_customer": r.sold_to_customer.map(|id| id.to_string()),
        "sold_to_name": r.sold_to_name,
        "performed_by": r.performed_by,
        "remarks": r.remarks,
        "sold_at": r.sold_at.to_rfc3339(),
    })
}

pub fn product_sales_to_json(p: &ProductSales, name: Option<String>) -> serde_json::Value {
    serde_json::json!({
        "product_id": p.product_id.0.to_string(),
        "product_name": name,
        "times_sold": p.times_sold,
        "total_weight": p.total_weight.to_string(),
    })
}

pub fn customer_sales_to_json(c: &CustomerSales, name: Option<String>) -> serde_json::Value {
    serde_json::json!({
        "customer_id": c.customer.map(|id| id.to_string()),
        "customer_name": c.name.clone().or(name),
        "orders": c.orders,
        "total_weight": c.total_weight.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use goldsmith_catalog::ProductId;
    use goldsmith_core::{AggregateId, LocationId};
    use goldsmith_stock::StockItemId;

    use super::*;

    #[test]
    fn item_rows_carry_joined_display_names() {
        let item = ItemReadModel {
            item_id: StockItemId(AggregateId::new()),
            product_id: ProductId(AggregateId::new()),
            weight: "4.250".parse().unwrap(),
            show_on_website: true,
            location_id: Some(LocationId::new()),
            sold: false,
            sold_at: None,
            sold_to_customer: None,
            sold_to_name: None,
            received_at: Utc::now(),
        };
        let names = ItemNames {
            product_name: Some("Filigree bangle".to_string()),
            category_name: Some("Bangles".to_string()),
            subcategory_name: Some("Filigree".to_string()),
            location_name: Some("Front counter".to_string()),
        };

        let row = item_to_json(&item, &names);
        assert_eq!(row["product_name"], "Filigree bangle");
        assert_eq!(row["category_name"], "Bangles");
        assert_eq!(row["subcategory_name"], "Filigree");
        assert_eq!(row["location_name"], "Front counter");
        assert_eq!(row["location_id"], item.location_id.unwrap().to_string());
    }

    #[test]
    fn item_rows_tolerate_missing_catalog_entries() {
        let item = ItemReadModel {
            item_id: StockItemId(AggregateId::new()),
            product_id: ProductId(AggregateId::new()),
            weight: "1.000".parse().unwrap(),
            show_on_website: false,
            location_id: None,
            sold: false,
            sold_at: None,
            sold_to_customer: None,
            sold_to_name: None,
            received_at: Utc::now(),
        };

        let row = item_to_json(&item, &ItemNames::default());
        assert_eq!(row["product_name"], serde_json::Value::Null);
        assert_eq!(row["location_name"], serde_json::Value::Null);
    }
}

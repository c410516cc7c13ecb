//! Physical stock: the item movement ledger write model.
//!
//! One `StockItem` aggregate per physical piece. Its append-only event stream
//! is the movement ledger; relocations and the (at most one) sale are events
//! in that stream, and every queryable view derives from it.

pub mod item;
pub mod location;

pub use item::{
    ItemState, ItemSold, ItemMoved, ItemReceived, MoveItem, ReceiveItem, SellItem,
    SetWebsiteVisibility, StockItem, StockItemCommand, StockItemEvent, StockItemId,
    VisibilityChanged,
};
pub use location::Location;

//! # Fleet View
//!
//! Pure functions over the locally mirrored fleet state. Nothing in this
//! crate mutates a collection or caches a result; every view is recomputed
//! from the snapshot it is handed.
//!
//! - [`filter`]: operator filter state and the order predicate
//! - [`pagination`]: page slicing and the page-number window
//! - [`summary`]: aggregate counts for the overview cards

pub mod filter;
pub mod pagination;
pub mod summary;

pub use filter::{FilterState, Selection};
pub use pagination::{
    EmptyReason, OrderPage, PAGE_SIZE, PageSlot, filter_orders, page_window, total_pages, view,
};
pub use summary::{FleetSummary, average_battery, delivery_rate, map_visible_orders, summarize};

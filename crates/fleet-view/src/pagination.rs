//! Order pagination and the page-number window

use crate::filter::FilterState;
use fleet_core::Order;
use std::fmt;

/// Orders shown per page
pub const PAGE_SIZE: usize = 10;

/// Window collapses to ellipses beyond this many pages
const MAX_PAGES_SHOWN: usize = 5;

/// One entry of the page-number navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page(usize),
    Ellipsis,
}

impl fmt::Display for PageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSlot::Page(page) => write!(f, "{}", page),
            PageSlot::Ellipsis => write!(f, "…"),
        }
    }
}

/// Why a page came back without items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The store holds no orders at all
    NoOrders,
    /// Orders exist but the active filters exclude all of them
    NoMatches,
}

impl EmptyReason {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::NoOrders => "No orders found",
            EmptyReason::NoMatches => "No orders match the active filters",
        }
    }
}

/// A single rendered page of the order backlog
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage<'a> {
    pub items: Vec<&'a Order>,
    /// Orders surviving the filters
    pub total_count: usize,
    pub total_pages: usize,
    /// Page actually shown, within `[1, max(total_pages, 1)]`
    pub page: usize,
    /// 1-based inclusive range of the shown items within the filtered result
    pub range: Option<(usize, usize)>,
    pub empty: Option<EmptyReason>,
    pub window: Vec<PageSlot>,
    pub has_prev: bool,
    pub has_next: bool,
}

impl OrderPage<'_> {
    /// Navigation is only rendered when something matched
    pub fn show_controls(&self) -> bool {
        self.total_count > 0
    }
}

pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

/// Page numbers to render for `current` out of `total` pages
pub fn page_window(current: usize, total: usize) -> Vec<PageSlot> {
    use PageSlot::{Ellipsis, Page};

    if total <= MAX_PAGES_SHOWN {
        return (1..=total).map(Page).collect();
    }

    if current <= 3 {
        vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(total)]
    } else if current >= total - 2 {
        vec![
            Page(1),
            Ellipsis,
            Page(total - 3),
            Page(total - 2),
            Page(total - 1),
            Page(total),
        ]
    } else {
        vec![
            Page(1),
            Ellipsis,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Ellipsis,
            Page(total),
        ]
    }
}

/// Orders matching `filter`, in store order
pub fn filter_orders<'a>(orders: &'a [Order], filter: &FilterState) -> Vec<&'a Order> {
    let predicate = filter.predicate();
    orders.iter().filter(|order| predicate(*order)).collect()
}

/// Reduce the order collection to the page selected by `filter`
pub fn view<'a>(orders: &'a [Order], filter: &FilterState) -> OrderPage<'a> {
    let filtered = filter_orders(orders, filter);
    let total_count = filtered.len();
    let total_pages = total_pages(total_count);
    let page = filter.page().clamp(1, total_pages.max(1));

    let start = (page - 1) * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(total_count);
    let items = filtered[start..end].to_vec();

    let empty = if !items.is_empty() {
        None
    } else if orders.is_empty() {
        Some(EmptyReason::NoOrders)
    } else {
        Some(EmptyReason::NoMatches)
    };

    OrderPage {
        range: (!items.is_empty()).then(|| (start + 1, end)),
        items,
        total_count,
        total_pages,
        page,
        empty,
        window: page_window(page, total_pages),
        has_prev: page > 1,
        has_next: page < total_pages,
    }
}

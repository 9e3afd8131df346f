//! Operator filter state for the order backlog

use fleet_core::{CoreError, Order, OrderStatus, Priority};
use std::fmt;
use std::str::FromStr;

/// `ALL` or a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "ALL"),
            Selection::Only(value) => write!(f, "{}", value),
        }
    }
}

impl<T: FromStr<Err = CoreError>> FromStr for Selection<T> {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Selection::All);
        }
        s.parse().map(Selection::Only)
    }
}

/// Search term, status filter, priority filter and the current page.
///
/// The page is reset to 1 by every filter mutation. Navigation never moves
/// the page outside `[1, total_pages]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    search_term: String,
    status: Selection<OrderStatus>,
    priority: Selection<Priority>,
    page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            status: Selection::All,
            priority: Selection::All,
            page: 1,
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn status_filter(&self) -> Selection<OrderStatus> {
        self.status
    }

    pub fn priority_filter(&self) -> Selection<Priority> {
        self.priority
    }

    /// Current page, 1-based
    pub fn page(&self) -> usize {
        self.page
    }

    /// True when any of the three predicates narrows the result
    pub fn is_filtering(&self) -> bool {
        !self.search_term.is_empty() || !self.status.is_all() || !self.priority.is_all()
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 1;
    }

    pub fn set_status_filter(&mut self, status: Selection<OrderStatus>) {
        self.status = status;
        self.page = 1;
    }

    pub fn set_priority_filter(&mut self, priority: Selection<Priority>) {
        self.priority = priority;
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.search_term.clear();
        self.status = Selection::All;
        self.priority = Selection::All;
        self.page = 1;
    }

    /// Jump to `page`; out-of-range requests are ignored. Returns whether the page changed.
    pub fn go_to_page(&mut self, page: usize, total_pages: usize) -> bool {
        if page >= 1 && page <= total_pages && page != self.page {
            self.page = page;
            return true;
        }
        false
    }

    pub fn next_page(&mut self, total_pages: usize) -> bool {
        if self.page < total_pages {
            self.page += 1;
            return true;
        }
        false
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            return true;
        }
        false
    }

    /// Pull the page back inside `[1, total_pages]` after the collection shrank
    pub fn clamp_to(&mut self, total_pages: usize) {
        self.page = self.page.clamp(1, total_pages.max(1));
    }

    /// Conjunction of the search, status and priority predicates
    pub fn predicate(&self) -> impl Fn(&Order) -> bool + '_ {
        let needle = self.search_term.to_lowercase();
        move |order: &Order| {
            order.matches_search(&needle)
                && self.status.matches(&order.status)
                && self.priority.matches(&order.priority)
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        (self.predicate())(order)
    }
}

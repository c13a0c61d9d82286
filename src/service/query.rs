//! Read parameters for `CrudService::read`.

use crate::model::{Filter, OrderBy};

/// Filters (AND by default), ordering, and paging for one read.
/// A limit or offset of zero means no restriction.
pub struct ReadQuery<T> {
    pub(crate) filters: Vec<Filter<T>>,
    pub(crate) use_or: bool,
    pub(crate) order_by: Vec<OrderBy<T>>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
}

impl<T> ReadQuery<T> {
    pub fn new() -> Self {
        ReadQuery {
            filters: Vec::new(),
            use_or: false,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn filter(mut self, filter: Filter<T>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter<T>>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Join filters with OR instead of AND.
    pub fn use_or(mut self, use_or: bool) -> Self {
        self.use_or = use_or;
        self
    }

    /// Append an ordering term; a bare column sorts ascending.
    pub fn order_by(mut self, order: impl Into<OrderBy<T>>) -> Self {
        self.order_by.push(order.into());
        self
    }

    pub fn order_by_all(mut self, order: impl IntoIterator<Item = OrderBy<T>>) -> Self {
        self.order_by.extend(order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit).filter(|n| *n > 0);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset).filter(|n| *n > 0);
        self
    }
}

impl<T> Default for ReadQuery<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ReadQuery<T> {
    fn clone(&self) -> Self {
        ReadQuery {
            filters: self.filters.clone(),
            use_or: self.use_or,
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

//! Typed column handles and the filter / ordering expressions built from them.

use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Named column of entity `E`. Entities expose these as associated constants.
pub struct Column<E> {
    name: &'static str,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Column<E> {
    pub const fn new(name: &'static str) -> Self {
        Column {
            name,
            _entity: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn compare(&self, op: CompareOp, value: Value) -> Filter<E> {
        Filter {
            column: self.name,
            op,
            value,
            _entity: PhantomData,
        }
    }

    pub fn eq(&self, value: impl Into<Value>) -> Filter<E> {
        self.compare(CompareOp::Eq, value.into())
    }

    pub fn ne(&self, value: impl Into<Value>) -> Filter<E> {
        self.compare(CompareOp::Ne, value.into())
    }

    pub fn lt(&self, value: impl Into<Value>) -> Filter<E> {
        self.compare(CompareOp::Lt, value.into())
    }

    pub fn le(&self, value: impl Into<Value>) -> Filter<E> {
        self.compare(CompareOp::Le, value.into())
    }

    pub fn gt(&self, value: impl Into<Value>) -> Filter<E> {
        self.compare(CompareOp::Gt, value.into())
    }

    pub fn ge(&self, value: impl Into<Value>) -> Filter<E> {
        self.compare(CompareOp::Ge, value.into())
    }

    /// SQL `LIKE` with `%` / `_` wildcards.
    pub fn like(&self, pattern: impl Into<String>) -> Filter<E> {
        self.compare(CompareOp::Like, Value::String(pattern.into()))
    }

    pub fn in_list<V: Into<Value>>(&self, values: impl IntoIterator<Item = V>) -> Filter<E> {
        let values = values.into_iter().map(Into::into).collect();
        self.compare(CompareOp::In, Value::Array(values))
    }

    pub fn is_null(&self) -> Filter<E> {
        self.compare(CompareOp::IsNull, Value::Null)
    }

    pub fn is_not_null(&self) -> Filter<E> {
        self.compare(CompareOp::IsNotNull, Value::Null)
    }

    pub fn asc(&self) -> OrderBy<E> {
        OrderBy {
            column: self.name,
            descending: false,
            _entity: PhantomData,
        }
    }

    pub fn desc(&self) -> OrderBy<E> {
        OrderBy {
            column: self.name,
            descending: true,
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for Column<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Column<E> {}

impl<E> fmt::Debug for Column<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Column").field(&self.name).finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    In,
    IsNull,
    IsNotNull,
}

/// Predicate on one column of `E`. Lists of filters are joined with AND or OR.
pub struct Filter<E> {
    column: &'static str,
    op: CompareOp,
    value: Value,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Filter<E> {
    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl<E> Clone for Filter<E> {
    fn clone(&self) -> Self {
        Filter {
            column: self.column,
            op: self.op,
            value: self.value.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("column", &self.column)
            .field("op", &self.op)
            .field("value", &self.value)
            .finish()
    }
}

/// One ordering term; ascending unless built with [`Column::desc`].
pub struct OrderBy<E> {
    column: &'static str,
    descending: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> OrderBy<E> {
    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }
}

impl<E> Clone for OrderBy<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for OrderBy<E> {}

impl<E> fmt::Debug for OrderBy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = if self.descending { "DESC" } else { "ASC" };
        write!(f, "OrderBy({} {})", self.column, dir)
    }
}

impl<E> From<Column<E>> for OrderBy<E> {
    fn from(column: Column<E>) -> Self {
        column.asc()
    }
}

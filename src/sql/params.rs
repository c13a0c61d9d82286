//! Convert `serde_json::Value` field values to types the `Any` driver can bind.

use crate::model::ColumnType;
use chrono::NaiveDateTime;
use serde_json::Value;
use sqlx::any::AnyArguments;
use sqlx::query::Query;
use sqlx::Any;

/// Ordered field name → value map used for inserts and updates.
pub type Fields = serde_json::Map<String, Value>;

pub type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse the timestamp spellings produced by serde, SQLite and PostgreSQL.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
}

/// Storage spelling: `YYYY-MM-DD HH:MM:SS[.ffffff]`, the same shape as `CURRENT_TIMESTAMP`.
pub fn timestamp_to_sql(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

/// serde spelling: `YYYY-MM-DDTHH:MM:SS[.ffffff]`.
pub fn timestamp_to_iso(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// A value that can be bound to an `Any` query. NULLs remember the column type so the
/// backend receives a typed NULL.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null(ColumnType),
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
}

impl BindValue {
    pub fn from_json(v: &Value, ty: ColumnType) -> Self {
        match v {
            Value::Null => BindValue::Null(ty),
            Value::Bool(b) => BindValue::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => BindValue::I64(i),
                (None, Some(f)) => BindValue::F64(f),
                (None, None) => BindValue::String(n.to_string()),
            },
            Value::String(s) => match ty {
                ColumnType::Timestamp => BindValue::String(
                    parse_timestamp(s)
                        .map(|dt| timestamp_to_sql(&dt))
                        .unwrap_or_else(|| s.clone()),
                ),
                _ => BindValue::String(s.clone()),
            },
            Value::Array(_) | Value::Object(_) => BindValue::String(v.to_string()),
        }
    }

    pub fn bind<'q>(self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        match self {
            BindValue::Null(ColumnType::Integer) => query.bind(None::<i64>),
            BindValue::Null(_) => query.bind(None::<String>),
            BindValue::Bool(b) => query.bind(b),
            BindValue::I64(n) => query.bind(n),
            BindValue::F64(n) => query.bind(n),
            BindValue::String(s) => query.bind(s),
        }
    }
}

/// Bind every parameter in order.
pub fn bind_all<'q>(mut query: AnyQuery<'q>, params: &[BindValue]) -> AnyQuery<'q> {
    for p in params {
        query = p.clone().bind(query);
    }
    query
}

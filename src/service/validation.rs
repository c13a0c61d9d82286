//! Check field maps and filter expressions against an entity schema before any SQL runs.

use crate::error::DbError;
use crate::model::{ColumnDef, ColumnType, Filter, OrderBy, TableSchema};
use crate::sql::{parse_timestamp, Fields, Ordering, Predicate};
use serde_json::Value;

pub struct FieldValidator;

impl FieldValidator {
    /// Every key must be a column and every non-null value must fit its column type.
    /// Nullability and other constraints are left to the database.
    pub fn validate(schema: &TableSchema, fields: &Fields) -> Result<(), DbError> {
        for (name, value) in fields {
            let column = schema.column(name).ok_or_else(|| unknown_column(schema, name))?;
            validate_field(schema, column, value)?;
        }
        Ok(())
    }

    /// As [`validate`](Self::validate), plus: not empty, and no primary key or
    /// server-generated columns.
    pub fn validate_updates(schema: &TableSchema, updates: &Fields) -> Result<(), DbError> {
        if updates.is_empty() {
            return Err(DbError::InvalidValue(format!(
                "update of '{}' needs at least one field to set",
                schema.name
            )));
        }
        Self::validate(schema, updates)?;
        if let Some(c) = updates
            .keys()
            .filter_map(|k| schema.column(k))
            .find(|c| c.is_generated())
        {
            return Err(DbError::InvalidArgument(format!(
                "{}.{} is assigned by the database and cannot be updated",
                schema.name, c.name
            )));
        }
        Ok(())
    }

    /// Resolve each filter to its schema column.
    pub fn predicates<'a, E>(schema: &'a TableSchema, filters: &'a [Filter<E>]) -> Result<Vec<Predicate<'a>>, DbError> {
        filters
            .iter()
            .map(|f| -> Result<Predicate<'a>, DbError> {
                let column = schema
                    .column(f.column())
                    .ok_or_else(|| unknown_column(schema, f.column()))?;
                Ok(Predicate {
                    column,
                    op: f.op(),
                    value: f.value(),
                })
            })
            .collect()
    }

    /// Resolve each ordering term to its schema column.
    pub fn orderings<'a, E>(schema: &'a TableSchema, order_by: &[OrderBy<E>]) -> Result<Vec<Ordering<'a>>, DbError> {
        order_by
            .iter()
            .map(|o| -> Result<Ordering<'a>, DbError> {
                let column = schema
                    .column(o.column())
                    .ok_or_else(|| unknown_column(schema, o.column()))?;
                Ok(Ordering {
                    column,
                    descending: o.is_descending(),
                })
            })
            .collect()
    }
}

fn unknown_column(schema: &TableSchema, name: &str) -> DbError {
    DbError::InvalidArgument(format!("'{}' has no column '{}'", schema.name, name))
}

fn validate_field(schema: &TableSchema, column: &ColumnDef, v: &Value) -> Result<(), DbError> {
    let ok = match (column.ty, v) {
        (_, Value::Null) => true,
        (ColumnType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
        (ColumnType::String(_), Value::String(_)) => true,
        (ColumnType::Timestamp, Value::String(s)) => parse_timestamp(s).is_some(),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(DbError::InvalidArgument(format!(
            "{}.{} expects {}, got {}",
            schema.name,
            column.name,
            expected(column.ty),
            v
        )))
    }
}

fn expected(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Integer => "an integer",
        ColumnType::String(_) => "a string",
        ColumnType::Timestamp => "a timestamp string",
    }
}

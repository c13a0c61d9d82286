use crate::error::DbError;
use crate::model::{ColumnDef, ColumnType, TableSchema};
use crate::sql::params::{parse_timestamp, timestamp_to_iso, Fields};
use serde_json::Value;
use sqlx::any::AnyRow;
use sqlx::Row;

/// Row selected with `select_list` (or returned by `insert`) as a field map. NULL cells
/// are left out; timestamps use the serde spelling.
pub fn row_to_json(row: &AnyRow, schema: &TableSchema) -> Result<Fields, DbError> {
    let mut map = Fields::new();
    for column in schema.columns {
        let v = cell_to_value(row, column)?;
        if !v.is_null() {
            map.insert(column.name.to_string(), v);
        }
    }
    Ok(map)
}

fn cell_to_value(row: &AnyRow, column: &ColumnDef) -> Result<Value, DbError> {
    let name = column.name;
    let decode = |e: sqlx::Error| DbError::Decode(format!("column '{}': {}", name, e));
    Ok(match column.ty {
        ColumnType::Integer => row
            .try_get::<Option<i64>, _>(name)
            .map_err(decode)?
            .map_or(Value::Null, Value::from),
        ColumnType::String(_) => row
            .try_get::<Option<String>, _>(name)
            .map_err(decode)?
            .map_or(Value::Null, Value::String),
        ColumnType::Timestamp => match row.try_get::<Option<String>, _>(name).map_err(decode)? {
            Some(s) => {
                let dt = parse_timestamp(&s).ok_or_else(|| {
                    DbError::Decode(format!("column '{}': unrecognized timestamp '{}'", name, s))
                })?;
                Value::String(timestamp_to_iso(&dt))
            }
            None => Value::Null,
        },
    })
}

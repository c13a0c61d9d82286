//! Builds parameterized INSERT, SELECT, UPDATE, DELETE and table DDL from a schema.

use crate::model::{ColumnDef, CompareOp, ServerDefault, TableSchema};
use crate::sql::dialect::{quoted, Dialect};
use crate::sql::params::{BindValue, Fields};
use serde_json::Value;

/// One validated filter: a schema column, an operator and its operand.
pub struct Predicate<'a> {
    pub column: &'a ColumnDef,
    pub op: CompareOp,
    pub value: &'a Value,
}

/// How predicates are combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Junction {
    And,
    Or,
}

impl Junction {
    pub fn from_use_or(use_or: bool) -> Self {
        if use_or {
            Junction::Or
        } else {
            Junction::And
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            Junction::And => " AND ",
            Junction::Or => " OR ",
        }
    }
}

/// One ORDER BY term.
pub struct Ordering<'a> {
    pub column: &'a ColumnDef,
    pub descending: bool,
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// Push `value` for `column` and return its placeholder text.
    fn placeholder(&mut self, column: &ColumnDef, value: &Value, dialect: Dialect) -> String {
        let n = self.push_param(BindValue::from_json(value, column.ty));
        dialect.placeholder(n, column.ty)
    }
}

fn select_column_list(schema: &TableSchema, dialect: Dialect) -> String {
    schema
        .columns
        .iter()
        .map(|c| dialect.select_column(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// ` WHERE ...` for the predicates, or empty when there are none.
fn where_clause(q: &mut QueryBuf, predicates: &[Predicate<'_>], junction: Junction, dialect: Dialect) -> String {
    if predicates.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = predicates
        .iter()
        .map(|p| {
            let col = quoted(p.column.name);
            match (p.op, p.value) {
                (CompareOp::Eq, Value::Null) | (CompareOp::IsNull, _) => format!("{} IS NULL", col),
                (CompareOp::Ne, Value::Null) | (CompareOp::IsNotNull, _) => format!("{} IS NOT NULL", col),
                (CompareOp::In, Value::Array(values)) => {
                    if values.is_empty() {
                        return "1 = 0".to_string();
                    }
                    let phs: Vec<String> = values
                        .iter()
                        .map(|v| q.placeholder(p.column, v, dialect))
                        .collect();
                    format!("{} IN ({})", col, phs.join(", "))
                }
                (op, v) => {
                    let ph = q.placeholder(p.column, v, dialect);
                    format!("{} {} {}", col, operator(op), ph)
                }
            }
        })
        .collect();
    if parts.len() == 1 {
        format!(" WHERE {}", parts[0])
    } else {
        format!(" WHERE ({})", parts.join(junction.sql()))
    }
}

fn operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq | CompareOp::In => "=",
        CompareOp::Ne => "<>",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
        CompareOp::Like => "LIKE",
        CompareOp::IsNull => "IS",
        CompareOp::IsNotNull => "IS NOT",
    }
}

/// SELECT with optional filters, ORDER BY terms in the given order, optional LIMIT/OFFSET.
pub fn select_list(
    schema: &TableSchema,
    predicates: &[Predicate<'_>],
    junction: Junction,
    order_by: &[Ordering<'_>],
    limit: Option<u64>,
    offset: Option<u64>,
    dialect: Dialect,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(schema.name);
    let where_clause = where_clause(&mut q, predicates, junction, dialect);
    let order_clause = if order_by.is_empty() {
        String::new()
    } else {
        let terms: Vec<String> = order_by
            .iter()
            .map(|o| format!("{} {}", quoted(o.column.name), if o.descending { "DESC" } else { "ASC" }))
            .collect();
        format!(" ORDER BY {}", terms.join(", "))
    };
    let tail = dialect.limit_offset(limit, offset);
    let cols = select_column_list(schema, dialect);
    q.sql = format!("SELECT {} FROM {}{}{}{}", cols, table, where_clause, order_clause, tail);
    q
}

/// SELECT COUNT(*) with optional filters.
pub fn count(schema: &TableSchema, predicates: &[Predicate<'_>], junction: Junction, dialect: Dialect) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, predicates, junction, dialect);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(schema.name), where_clause);
    q
}

/// INSERT: columns in schema order, values from `fields`. Columns the database can fill
/// (autoincrement key, server default) are left out when `fields` has no value for them;
/// any other missing column is sent as NULL so NOT NULL constraints fire. The stored row
/// comes back through RETURNING, in the same column shape as `select_list`.
pub fn insert(schema: &TableSchema, fields: &Fields, dialect: Dialect) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(schema.name);
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in schema.columns {
        let val = fields.get(c.name);
        let missing = val.map_or(true, Value::is_null);
        if missing && c.may_omit_on_insert() {
            continue;
        }
        let val = val.unwrap_or(&Value::Null);
        placeholders.push(q.placeholder(c, val, dialect));
        cols.push(quoted(c.name));
    }
    let returning = select_column_list(schema, dialect);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// Set-based UPDATE: SET only schema columns present in `updates`.
pub fn update(
    schema: &TableSchema,
    updates: &Fields,
    predicates: &[Predicate<'_>],
    junction: Junction,
    dialect: Dialect,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(schema.name);
    let mut sets = Vec::new();
    for (k, v) in updates {
        let Some(c) = schema.column(k) else { continue };
        let rhs = q.placeholder(c, v, dialect);
        sets.push(format!("{} = {}", quoted(c.name), rhs));
    }
    let where_clause = where_clause(&mut q, predicates, junction, dialect);
    q.sql = format!("UPDATE {} SET {}{}", table, sets.join(", "), where_clause);
    q
}

/// Set-based DELETE.
pub fn delete(schema: &TableSchema, predicates: &[Predicate<'_>], junction: Junction, dialect: Dialect) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, predicates, junction, dialect);
    q.sql = format!("DELETE FROM {}{}", quoted(schema.name), where_clause);
    q
}

/// CREATE TABLE IF NOT EXISTS with column constraints, named CHECKs and foreign keys.
pub fn create_table(schema: &TableSchema, dialect: Dialect) -> String {
    let mut defs: Vec<String> = Vec::new();
    let mut constraints: Vec<String> = Vec::new();
    for c in schema.columns {
        if c.primary_key && c.autoincrement {
            defs.push(dialect.serial_primary_key(c.name));
            continue;
        }
        let mut def = format!("{} {}", quoted(c.name), dialect.column_type(c.ty));
        if c.primary_key {
            def.push_str(" PRIMARY KEY");
        }
        if !c.nullable && !c.primary_key {
            def.push_str(" NOT NULL");
        }
        if c.unique {
            def.push_str(" UNIQUE");
        }
        if let Some(ServerDefault::CurrentTimestamp) = c.server_default {
            def.push_str(" DEFAULT CURRENT_TIMESTAMP");
        }
        defs.push(def);

        if c.non_empty {
            constraints.push(format!(
                "CONSTRAINT {} CHECK (length({}) > 0)",
                quoted(&format!("ck_{}_{}_non_empty", schema.name, c.name)),
                quoted(c.name)
            ));
        }
        if let Some(fk) = c.references {
            constraints.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                quoted(c.name),
                quoted(fk.table),
                quoted(fk.column)
            ));
        }
    }
    defs.extend(constraints);
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(schema.name),
        defs.join(",\n  ")
    )
}

pub fn drop_table(schema: &TableSchema) -> String {
    format!("DROP TABLE IF EXISTS {}", quoted(schema.name))
}

//! `users` table: schema, entity and typed column handles.

use crate::model::column::Column;
use crate::model::schema::{ColumnDef, ColumnType, TableSchema};
use crate::model::Entity;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub static USERS: TableSchema = TableSchema {
    name: "users",
    columns: &[
        ColumnDef::serial_primary_key("id"),
        ColumnDef::new("nickname", ColumnType::String(50))
            .not_null()
            .unique()
            .non_empty(),
        ColumnDef::new("created_at", ColumnType::Timestamp)
            .not_null()
            .default_now(),
        ColumnDef::new("name", ColumnType::String(50)).not_null().non_empty(),
        ColumnDef::new("surname", ColumnType::String(50)).not_null().non_empty(),
    ],
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Users {
    /// Unset until the insert is flushed.
    pub id: Option<i64>,
    pub nickname: String,
    /// Set by the database at insert time.
    pub created_at: Option<NaiveDateTime>,
    pub name: String,
    pub surname: String,
}

impl Users {
    pub const ID: Column<Users> = Column::new("id");
    pub const NICKNAME: Column<Users> = Column::new("nickname");
    pub const CREATED_AT: Column<Users> = Column::new("created_at");
    pub const NAME: Column<Users> = Column::new("name");
    pub const SURNAME: Column<Users> = Column::new("surname");
}

impl Entity for Users {
    fn schema() -> &'static TableSchema {
        &USERS
    }
}

impl fmt::Display for Users {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "users(id={}, nickname={}, created_at={}, name={}, surname={})",
            opt(&self.id),
            self.nickname,
            opt(&self.created_at),
            self.name,
            self.surname
        )
    }
}

pub(crate) fn opt<T: fmt::Display>(v: &Option<T>) -> String {
    v.as_ref().map_or_else(|| "None".to_string(), ToString::to_string)
}

//! `reminders` table, keyed to `users` by `user_id`.

use crate::model::column::Column;
use crate::model::schema::{ColumnDef, ColumnType, TableSchema};
use crate::model::users::opt;
use crate::model::Entity;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub static REMINDERS: TableSchema = TableSchema {
    name: "reminders",
    columns: &[
        ColumnDef::serial_primary_key("id"),
        ColumnDef::new("user_id", ColumnType::Integer)
            .not_null()
            .references("users", "id"),
        ColumnDef::new("task_description", ColumnType::String(250)).not_null(),
        ColumnDef::new("event_date", ColumnType::Timestamp).not_null(),
        ColumnDef::new("remind_before", ColumnType::Integer).not_null(),
    ],
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reminders {
    pub id: Option<i64>,
    pub user_id: i64,
    pub task_description: String,
    pub event_date: NaiveDateTime,
    /// Minutes before `event_date`.
    pub remind_before: i64,
}

impl Reminders {
    pub const ID: Column<Reminders> = Column::new("id");
    pub const USER_ID: Column<Reminders> = Column::new("user_id");
    pub const TASK_DESCRIPTION: Column<Reminders> = Column::new("task_description");
    pub const EVENT_DATE: Column<Reminders> = Column::new("event_date");
    pub const REMIND_BEFORE: Column<Reminders> = Column::new("remind_before");
}

impl Entity for Reminders {
    fn schema() -> &'static TableSchema {
        &REMINDERS
    }
}

impl fmt::Display for Reminders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reminders(id={}, user_id={}, task_description={}, event_date={}, remind_before={})",
            opt(&self.id),
            self.user_id,
            self.task_description,
            self.event_date,
            self.remind_before
        )
    }
}

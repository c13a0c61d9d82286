//! Declarative table descriptors. Each entity publishes one `TableSchema` constant.

/// Storage type of a column. `String` carries the declared maximum length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    String(u32),
    Timestamp,
}

/// Value filled in by the database when the insert omits the column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerDefault {
    CurrentTimestamp,
}

/// Target of a foreign key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub primary_key: bool,
    pub autoincrement: bool,
    pub nullable: bool,
    pub unique: bool,
    /// Adds `CHECK (length(col) > 0)`.
    pub non_empty: bool,
    pub server_default: Option<ServerDefault>,
    pub references: Option<ForeignKey>,
}

impl ColumnDef {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        ColumnDef {
            name,
            ty,
            primary_key: false,
            autoincrement: false,
            nullable: true,
            unique: false,
            non_empty: false,
            server_default: None,
            references: None,
        }
    }

    /// Auto-incrementing integer primary key.
    pub const fn serial_primary_key(name: &'static str) -> Self {
        let mut c = ColumnDef::new(name, ColumnType::Integer);
        c.primary_key = true;
        c.autoincrement = true;
        c.nullable = false;
        c
    }

    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    pub const fn default_now(mut self) -> Self {
        self.server_default = Some(ServerDefault::CurrentTimestamp);
        self
    }

    pub const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some(ForeignKey { table, column });
        self
    }

    /// Assigned by the database and never rewritten: primary key and server defaults.
    pub fn is_generated(&self) -> bool {
        self.primary_key || self.server_default.is_some()
    }

    /// The insert may leave this column out and let the database fill it.
    pub fn may_omit_on_insert(&self) -> bool {
        self.autoincrement || self.server_default.is_some()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Tables this one references through foreign keys.
    pub fn dependencies(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter_map(|c| c.references.map(|fk| fk.table))
            .filter(move |t| *t != self.name)
    }
}

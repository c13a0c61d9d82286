//! CrudService: generic CRUD using the safe SQL builder; DataBaseService: engine, tables and session scope.

mod crud;
mod database;
mod query;
mod validation;
pub use crud::{Created, CrudService};
pub use database::DataBaseService;
pub use query::ReadQuery;
pub use validation::FieldValidator;

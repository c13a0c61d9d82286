//! Safe SQL builder: identifiers from schema constants only, values as parameters.

mod builder;
mod dialect;
pub mod params;
mod row;
pub use builder::*;
pub use dialect::*;
pub use params::*;
pub use row::*;

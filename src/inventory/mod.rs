//! Link inventory: model types and the external spreadsheet source.

mod models;
mod sheet;

pub use models::*;
pub use sheet::*;

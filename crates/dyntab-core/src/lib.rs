pub mod catalog;
pub mod error;
pub mod table;
pub mod types;

pub use catalog::{Catalog, TableHandle};
pub use error::{DyntabError, ErrorKind};
pub use table::Table;
pub use types::{Column, Row, TypeTag, Value};

#[cfg(test)]
mod tests;

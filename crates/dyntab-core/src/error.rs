use crate::types::TypeTag;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DyntabError {
    #[error("table '{0}' already exists")]
    DuplicateTable(String),
    #[error("table '{0}' does not exist")]
    UnknownTable(String),
    #[error("column '{0}' already exists")]
    DuplicateColumn(String),
    #[error("column '{0}' does not exist")]
    UnknownColumn(String),
    #[error("number of values must match the number of columns: expected {expected}, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("invalid type for column '{column}': expected {expected}, got {}", type_name(.actual))]
    TypeMismatch {
        column: String,
        expected: TypeTag,
        actual: Option<TypeTag>,
    },
    #[error("row index {index} is out of bounds (rows: {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("unknown column type '{0}'")]
    UnknownType(String),
}

fn type_name(tag: &Option<TypeTag>) -> &'static str {
    tag.map(TypeTag::name).unwrap_or("absent")
}

/// Discriminant of [`DyntabError`], for adapters mapping failures to
/// transport responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateTable,
    UnknownTable,
    DuplicateColumn,
    UnknownColumn,
    ArityMismatch,
    TypeMismatch,
    IndexOutOfBounds,
    UnknownType,
}

impl DyntabError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DyntabError::DuplicateTable(_) => ErrorKind::DuplicateTable,
            DyntabError::UnknownTable(_) => ErrorKind::UnknownTable,
            DyntabError::DuplicateColumn(_) => ErrorKind::DuplicateColumn,
            DyntabError::UnknownColumn(_) => ErrorKind::UnknownColumn,
            DyntabError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            DyntabError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            DyntabError::IndexOutOfBounds { .. } => ErrorKind::IndexOutOfBounds,
            DyntabError::UnknownType(_) => ErrorKind::UnknownType,
        }
    }
}

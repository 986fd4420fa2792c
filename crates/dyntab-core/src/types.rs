use crate::error::DyntabError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// The closed set of value kinds a column may declare.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Integer,
    Boolean,
    Float,
}

/// External type names accepted at the boundary. Anything else is rejected.
const TYPE_NAMES: &[(&str, TypeTag)] = &[
    ("str", TypeTag::String),
    ("string", TypeTag::String),
    ("int", TypeTag::Integer),
    ("integer", TypeTag::Integer),
    ("bool", TypeTag::Boolean),
    ("boolean", TypeTag::Boolean),
    ("float", TypeTag::Float),
];

impl TypeTag {
    /// Canonical short name, as reported in schema listings.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::String => "str",
            TypeTag::Integer => "int",
            TypeTag::Boolean => "bool",
            TypeTag::Float => "float",
        }
    }
}

impl FromStr for TypeTag {
    type Err = DyntabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TYPE_NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, tag)| *tag)
            .ok_or_else(|| DyntabError::UnknownType(s.to_string()))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell. `Absent` fills rows that predate a column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Absent,
    String(String),
    Integer(i64),
    Boolean(bool),
    Float(f64),
}

impl Value {
    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Value::Absent => None,
            Value::String(_) => Some(TypeTag::String),
            Value::Integer(_) => Some(TypeTag::Integer),
            Value::Boolean(_) => Some(TypeTag::Boolean),
            Value::Float(_) => Some(TypeTag::Float),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

// Floats compare by bit pattern with -0.0 folded into 0.0, so equality is
// reflexive (NaN == NaN) and agrees with Hash.
fn float_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_bits(*a) == float_bits(*b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Absent => {}
            Value::String(v) => v.hash(state),
            Value::Integer(v) => v.hash(state),
            Value::Boolean(v) => v.hash(state),
            Value::Float(v) => float_bits(*v).hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => Ok(()),
            Value::String(v) => f.write_str(v),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            // `{:?}` keeps the fractional part on whole floats ("25.0").
            Value::Float(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: TypeTag,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: TypeTag) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Values in schema column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }
}

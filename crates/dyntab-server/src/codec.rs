//! JSON representation of tables, rows and cell values.

use dyntab_core::{Column, Table, TypeTag, Value};
use serde::Serialize;
use serde_json::{json, Map, Number, Value as JsonValue};

/// Decodes one JSON cell into an engine value.
///
/// Integral numbers become `Integer`, other numbers `Float`, `null` the absent
/// marker. Integers beyond `i64` are rejected rather than rounded to a float.
/// Arrays and objects have no engine counterpart.
pub fn json_to_value(value: &JsonValue) -> Result<Value, String> {
    match value {
        JsonValue::Null => Ok(Value::Absent),
        JsonValue::Bool(v) => Ok(Value::Boolean(*v)),
        JsonValue::String(v) => Ok(Value::String(v.clone())),
        JsonValue::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(Value::Integer(v))
            } else if n.is_u64() {
                Err(format!("integer out of range: {n}"))
            } else if let Some(v) = n.as_f64() {
                Ok(Value::Float(v))
            } else {
                Err(format!("unsupported number: {n}"))
            }
        }
        other => Err(format!("unsupported value: {other}")),
    }
}

pub fn json_to_values(values: &[JsonValue]) -> Result<Vec<Value>, String> {
    values.iter().map(json_to_value).collect()
}

pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Absent => JsonValue::Null,
        Value::String(v) => JsonValue::String(v.clone()),
        Value::Integer(v) => json!(v),
        Value::Boolean(v) => JsonValue::Bool(*v),
        // Non-finite floats have no JSON form.
        Value::Float(v) => Number::from_f64(*v)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
    }
}

/// Decodes `[name, type]` pairs into a schema. Type names go through the
/// closed lookup on [`TypeTag`].
pub fn decode_columns(pairs: &[(String, String)]) -> Result<Vec<Column>, String> {
    pairs
        .iter()
        .map(|(name, type_name)| {
            type_name
                .parse::<TypeTag>()
                .map(|tag| Column::new(name.clone(), tag))
                .map_err(|_| format!("Invalid column type '{type_name}' for column '{name}'"))
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ColumnView {
    pub column_name: String,
    pub column_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TableLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub rows: String,
    pub columns: String,
    pub remove_duplicates: String,
}

impl TableLinks {
    pub fn for_table(name: &str) -> Self {
        let base = format!("/tables/{name}");
        Self {
            rows: format!("{base}/rows"),
            columns: format!("{base}/columns"),
            remove_duplicates: format!("{base}/remove_duplicates"),
            self_link: base,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TableView {
    pub table_name: String,
    pub column_info: Vec<ColumnView>,
    pub rows: Vec<JsonValue>,
    #[serde(rename = "_links")]
    pub links: TableLinks,
}

impl TableView {
    pub fn new(name: &str, table: &Table) -> Self {
        let column_info = table
            .columns()
            .iter()
            .map(|c| ColumnView {
                column_name: c.name.clone(),
                column_type: c.data_type.name(),
            })
            .collect();
        let rows = table
            .rows()
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                for (column, value) in table.columns().iter().zip(&row.values) {
                    obj.insert(column.name.clone(), value_to_json(value));
                }
                JsonValue::Object(obj)
            })
            .collect();
        Self {
            table_name: name.to_string(),
            column_info,
            rows,
            links: TableLinks::for_table(name),
        }
    }
}

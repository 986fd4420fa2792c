use dyntab_core::{Catalog, Column, DyntabError, TypeTag, Value};
use tracing::info;

pub const DEMO_TABLE: &str = "Table1";

/// Creates the demonstration table with a few sample rows, including one
/// duplicate for `remove_duplicates` to find.
pub fn seed_demo_table(catalog: &Catalog) -> Result<(), DyntabError> {
    let table = catalog.add_table(
        DEMO_TABLE,
        vec![
            Column::new("Name", TypeTag::String),
            Column::new("Age", TypeTag::Integer),
            Column::new("City", TypeTag::String),
            Column::new("IsStudent", TypeTag::Boolean),
        ],
    )?;
    let people: [(&str, i64, &str, bool); 4] = [
        ("Alice", 25, "New York", false),
        ("Bob", 30, "San Francisco", true),
        ("Alice", 25, "New York", false),
        ("Charlie", 22, "Los Angeles", true),
    ];
    for (name, age, city, is_student) in people {
        table.add_row(vec![
            Value::from(name),
            Value::from(age),
            Value::from(city),
            Value::from(is_student),
        ])?;
    }
    for line in table.render() {
        info!(table = DEMO_TABLE, "{line}");
    }
    Ok(())
}

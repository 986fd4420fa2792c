#[cfg(test)]
mod tests {
    use crate::catalog::Catalog;
    use crate::error::{DyntabError, ErrorKind};
    use crate::table::Table;
    use crate::types::{Column, Row, TypeTag, Value};
    use std::sync::Arc;
    use std::thread;

    fn people() -> Table {
        Table::new(vec![
            Column::new("Name", TypeTag::String),
            Column::new("Age", TypeTag::Integer),
        ])
        .expect("schema")
    }

    fn person(name: &str, age: i64) -> Vec<Value> {
        vec![Value::from(name), Value::from(age)]
    }

    fn assert_lockstep(table: &Table) {
        for row in table.rows() {
            assert_eq!(row.values.len(), table.columns().len());
        }
    }

    #[test]
    fn remove_duplicates_keeps_first_occurrences() {
        let mut table = people();
        table.add_row(person("Alice", 25)).expect("alice");
        table.add_row(person("Bob", 30)).expect("bob");
        table.add_row(person("Alice", 25)).expect("alice again");

        assert_eq!(table.remove_duplicates(), 1);
        assert_eq!(
            table.rows(),
            &[Row::new(person("Alice", 25)), Row::new(person("Bob", 30))]
        );
    }

    #[test]
    fn remove_duplicates_is_idempotent_and_order_preserving() {
        let mut table = people();
        for (name, age) in [("C", 3), ("A", 1), ("C", 3), ("B", 2), ("A", 1), ("C", 3)] {
            table.add_row(person(name, age)).expect("row");
        }
        assert_eq!(table.remove_duplicates(), 3);
        let once = table.clone();
        assert_eq!(table.remove_duplicates(), 0);
        assert_eq!(table, once);
        let names: Vec<String> = table.rows().iter().map(|r| r.values[0].to_string()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn remove_duplicates_compares_absent_cells() {
        let mut table = Table::new(vec![Column::new("Name", TypeTag::String)]).expect("schema");
        table.add_row(vec![Value::from("X")]).expect("x");
        table.add_row(vec![Value::from("X")]).expect("x");
        table.add_column("Score", TypeTag::Float).expect("column");
        table
            .add_row(vec![Value::from("X"), Value::Float(1.5)])
            .expect("scored");
        assert_eq!(table.remove_duplicates(), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].values[1], Value::Absent);
    }

    #[test]
    fn type_mismatch_leaves_rows_untouched() {
        let mut table = Table::new(vec![Column::new("Name", TypeTag::String)]).expect("schema");
        table.add_row(vec![Value::from("X")]).expect("x");
        let err = table.add_row(vec![Value::from(42i64)]).unwrap_err();
        assert_eq!(
            err,
            DyntabError::TypeMismatch {
                column: "Name".into(),
                expected: TypeTag::String,
                actual: Some(TypeTag::Integer),
            }
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn boolean_never_satisfies_integer_column() {
        let mut table = people();
        let err = table
            .add_row(vec![Value::from("Eve"), Value::Boolean(true)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(table.is_empty());
    }

    #[test]
    fn integer_does_not_widen_to_float() {
        let mut table = Table::new(vec![Column::new("Score", TypeTag::Float)]).expect("schema");
        assert!(table.add_row(vec![Value::Integer(3)]).is_err());
        table.add_row(vec![Value::Float(3.0)]).expect("float");
    }

    #[test]
    fn absent_value_is_rejected_on_insert() {
        let mut table = people();
        let err = table
            .add_row(vec![Value::from("Eve"), Value::Absent])
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid type for column 'Age': expected int, got absent");
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let mut table = people();
        let err = table.add_row(vec![Value::from("Eve")]).unwrap_err();
        assert_eq!(err, DyntabError::ArityMismatch { expected: 2, actual: 1 });
    }

    #[test]
    fn update_on_empty_table_is_out_of_bounds() {
        let mut table = Table::new(vec![Column::new("Name", TypeTag::String)]).expect("schema");
        let err = table.update_row(0, vec![Value::from("x")]).unwrap_err();
        assert_eq!(err, DyntabError::IndexOutOfBounds { index: 0, len: 0 });
    }

    #[test]
    fn update_after_insert_with_same_values_is_a_no_op() {
        let mut table = people();
        table.add_row(person("Alice", 25)).expect("alice");
        table.add_row(person("Bob", 30)).expect("bob");
        let before = table.clone();
        table.update_row(1, person("Bob", 30)).expect("update");
        assert_eq!(table, before);
    }

    #[test]
    fn update_replaces_row_and_validates_before_writing() {
        let mut table = people();
        table.add_row(person("Alice", 25)).expect("alice");
        table.update_row(0, person("Alicia", 26)).expect("update");
        assert_eq!(table.row(0), Some(&Row::new(person("Alicia", 26))));

        let err = table
            .update_row(0, vec![Value::from(1i64), Value::from(2i64)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(table.rows()[0], Row::new(person("Alicia", 26)));
    }

    #[test]
    fn delete_row_shifts_later_rows() {
        let mut table = people();
        for i in 0..5 {
            table.add_row(person(&format!("p{i}"), i)).expect("row");
        }
        let before = table.rows().to_vec();
        let removed = table.delete_row(2).expect("delete");
        assert_eq!(removed, before[2]);
        assert_eq!(&table.rows()[..2], &before[..2]);
        assert_eq!(&table.rows()[2..], &before[3..]);
        assert_eq!(
            table.delete_row(4).unwrap_err(),
            DyntabError::IndexOutOfBounds { index: 4, len: 4 }
        );
    }

    #[test]
    fn duplicate_column_keeps_schema() {
        let mut table = Table::new(vec![
            Column::new("A", TypeTag::String),
            Column::new("B", TypeTag::Integer),
        ])
        .expect("schema");
        let err = table.add_column("A", TypeTag::Boolean).unwrap_err();
        assert_eq!(err, DyntabError::DuplicateColumn("A".into()));
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn add_then_delete_column_round_trips() {
        let mut table = people();
        table.add_row(person("Alice", 25)).expect("alice");
        table.add_row(person("Bob", 30)).expect("bob");
        let before = table.clone();

        table.add_column("City", TypeTag::String).expect("add");
        assert_lockstep(&table);
        assert!(table.rows().iter().all(|r| r.values[2].is_absent()));

        table.delete_column("City").expect("delete");
        assert_eq!(table, before);
    }

    #[test]
    fn delete_column_removes_values_positionally() {
        let mut table = people();
        table.add_row(person("Alice", 25)).expect("alice");
        table.delete_column("Name").expect("delete");
        assert_eq!(table.columns(), &[Column::new("Age", TypeTag::Integer)]);
        assert_eq!(table.rows()[0], Row::new(vec![Value::Integer(25)]));
        assert_eq!(
            table.delete_column("Name").unwrap_err(),
            DyntabError::UnknownColumn("Name".into())
        );
    }

    #[test]
    fn lockstep_holds_across_mixed_operations() {
        let mut table = people();
        table.add_row(person("Alice", 25)).expect("alice");
        table.add_column("Active", TypeTag::Boolean).expect("add");
        table
            .add_row(vec![Value::from("Bob"), Value::from(30i64), Value::from(true)])
            .expect("bob");
        let _ = table.add_row(person("Carol", 40));
        table.delete_column("Age").expect("delete");
        let _ = table.update_row(0, vec![Value::from("A"), Value::from(1i64)]);
        table.remove_duplicates();
        assert_lockstep(&table);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn new_table_rejects_repeated_column_names() {
        let err = Table::new(vec![
            Column::new("A", TypeTag::String),
            Column::new("A", TypeTag::Integer),
        ])
        .unwrap_err();
        assert_eq!(err, DyntabError::DuplicateColumn("A".into()));
    }

    #[test]
    fn render_is_restartable() {
        let mut table = people();
        table.add_row(person("Alice", 25)).expect("alice");
        table.add_column("City", TypeTag::String).expect("add");

        let lines: Vec<String> = table.render().collect();
        assert_eq!(lines, vec!["Name|Age|City".to_string(), "Alice|25|".to_string()]);
        assert_eq!(table.render().collect::<Vec<_>>(), lines);
    }

    #[test]
    fn catalog_table_lifecycle() {
        let catalog = Catalog::new();
        catalog
            .add_table("people", vec![Column::new("Name", TypeTag::String)])
            .expect("create");
        assert_eq!(
            catalog
                .add_table("people", Vec::new())
                .unwrap_err(),
            DyntabError::DuplicateTable("people".into())
        );

        let handle = catalog.get_table("people").expect("get");
        handle.add_row(vec![Value::from("X")]).expect("row");
        assert_eq!(catalog.get_table("people").expect("get").len(), 1);

        catalog.remove_table("people").expect("remove");
        assert!(!catalog.contains("people"));
        assert_eq!(
            catalog.get_table("people").unwrap_err().kind(),
            ErrorKind::UnknownTable
        );
        assert_eq!(
            catalog.remove_table("people").unwrap_err(),
            DyntabError::UnknownTable("people".into())
        );
    }

    #[test]
    fn catalog_rejects_bad_schema_without_registering() {
        let catalog = Catalog::new();
        let err = catalog
            .add_table(
                "t",
                vec![Column::new("A", TypeTag::String), Column::new("A", TypeTag::Float)],
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateColumn);
        assert!(catalog.is_empty());
    }

    #[test]
    fn catalog_lists_tables_in_name_order() {
        let catalog = Catalog::new();
        for name in ["zeta", "alpha", "mid"] {
            catalog.add_table(name, Vec::new()).expect("create");
        }
        let names: Vec<String> = catalog.list_tables().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        assert_eq!(catalog.table_names(), names);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn concurrent_writers_keep_table_consistent() {
        let catalog = Arc::new(Catalog::new());
        catalog
            .add_table(
                "events",
                vec![
                    Column::new("Source", TypeTag::String),
                    Column::new("Seq", TypeTag::Integer),
                ],
            )
            .expect("create");

        let mut workers = Vec::new();
        for worker in 0..4i64 {
            let catalog = catalog.clone();
            workers.push(thread::spawn(move || {
                let table = catalog.get_table("events").expect("get");
                for seq in 0..50i64 {
                    let values = vec![Value::from(format!("w{worker}")), Value::from(seq)];
                    // A concurrent schema change may briefly widen the table.
                    while let Err(err) = table.add_row(values.clone()) {
                        assert_eq!(err.kind(), ErrorKind::ArityMismatch);
                        thread::yield_now();
                    }
                }
            }));
        }
        let churn = {
            let catalog = catalog.clone();
            thread::spawn(move || {
                let table = catalog.get_table("events").expect("get");
                for round in 0..20 {
                    let column = format!("extra_{round}");
                    table.add_column(&column, TypeTag::Boolean).expect("add");
                    table.delete_column(&column).expect("drop");
                }
            })
        };
        for worker in workers {
            worker.join().expect("join");
        }
        churn.join().expect("join");

        let table = catalog.get_table("events").expect("get");
        table.read(|t| {
            assert_eq!(t.columns().len(), 2);
            assert_lockstep(t);
        });
        assert_eq!(table.len(), 200);
        assert_eq!(table.remove_duplicates(), 0);
    }

    #[test]
    fn concurrent_catalog_lifecycle_stays_consistent() {
        let catalog = Arc::new(Catalog::new());
        catalog
            .add_table("shared", vec![Column::new("Seq", TypeTag::Integer)])
            .expect("create");

        let mut threads = Vec::new();
        for worker in 0..4 {
            let catalog = catalog.clone();
            threads.push(thread::spawn(move || {
                for round in 0..25 {
                    let name = format!("scratch_{worker}_{round}");
                    let handle = catalog
                        .add_table(&name, vec![Column::new("Flag", TypeTag::Boolean)])
                        .expect("create");
                    handle.add_row(vec![Value::from(true)]).expect("row");
                    catalog.remove_table(&name).expect("remove");
                    // A handle outlives removal but the name no longer resolves.
                    assert_eq!(handle.len(), 1);
                    assert_eq!(
                        catalog.get_table(&name).unwrap_err(),
                        DyntabError::UnknownTable(name.clone())
                    );
                }
                catalog
                    .add_table(&format!("keep_{worker}"), Vec::new())
                    .expect("keep");
            }));
        }
        for reader in 0..2i64 {
            let catalog = catalog.clone();
            threads.push(thread::spawn(move || {
                for seq in 0..50i64 {
                    let shared = catalog.get_table("shared").expect("shared");
                    shared.add_row(vec![Value::from(reader * 100 + seq)]).expect("row");
                    for (name, handle) in catalog.list_tables() {
                        // Listing takes each table lock only after the map lock is released.
                        let width = handle.read(|t| t.columns().len());
                        assert!(width <= 1, "{name}");
                    }
                }
            }));
        }
        for handle in threads {
            handle.join().expect("join");
        }

        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.table_names(),
            vec!["keep_0", "keep_1", "keep_2", "keep_3", "shared"]
        );
        let shared = catalog.get_table("shared").expect("shared");
        assert_eq!(shared.len(), 100);
        assert_eq!(shared.remove_duplicates(), 0);
    }

    #[test]
    fn handle_render_reflects_current_state() {
        let catalog = Catalog::new();
        let handle = catalog
            .add_table("t", vec![Column::new("A", TypeTag::Integer)])
            .expect("create");
        handle.add_row(vec![Value::from(1i64)]).expect("row");
        assert_eq!(handle.render().collect::<Vec<_>>(), vec!["A", "1"]);
        handle.update_row(0, vec![Value::from(2i64)]).expect("update");
        assert_eq!(handle.render().last().as_deref(), Some("2"));
        assert_eq!(handle.snapshot().rows(), handle.rows().as_slice());
    }
}

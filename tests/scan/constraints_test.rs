#[cfg(test)]
mod tests {
    use schemer::model::{Catalog, Collection, CollectionKey, DbObjectType};
    use schemer::provider::ConstraintRow;
    use schemer::scan::ConstraintProcessor;

    fn catalog(tables: &[(&str, &str)]) -> Catalog {
        let mut catalog = Catalog::new("c1");
        for (schema, table) in tables {
            catalog
                .schema_entry(schema)
                .tables
                .push(Collection::new(*schema, *table, DbObjectType::Table));
        }
        catalog.sort_collections();
        catalog
    }

    #[test]
    fn two_adjacent_rows_build_one_two_column_foreign_key() {
        let mut cat = catalog(&[("s1", "items"), ("s1", "parents")]);
        let mut proc = ConstraintProcessor::new("c1");

        proc.process(
            &mut cat,
            &ConstraintRow::foreign_key(
                "s1", "items", "fk_parent", "col_a", "s1", "parents", "pa",
            ),
        )
        .unwrap();
        proc.process(
            &mut cat,
            &ConstraintRow::foreign_key(
                "s1", "items", "fk_parent", "col_b", "s1", "parents", "pb",
            ),
        )
        .unwrap();

        let items = cat.table("s1", "items").unwrap();
        assert_eq!(items.foreign_keys.len(), 1);
        let fk = &items.foreign_keys[0];
        assert_eq!(fk.name, "fk_parent");
        let names: Vec<&str> = fk.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["col_a", "col_b"]);

        let parents = cat.table("s1", "parents").unwrap();
        assert_eq!(parents.referenced_by.len(), 1);
        let back = &parents.referenced_by[0];
        assert_eq!(back.source, CollectionKey::new("c1", "s1", "items"));
        assert_eq!(back.foreign_keys.len(), 1);
        assert_eq!(back.foreign_keys[0].columns, fk.columns);
    }

    #[test]
    fn two_foreign_keys_to_one_table_share_one_referenced_by_entry() {
        let mut cat = catalog(&[("s1", "orders"), ("s1", "users")]);
        let mut proc = ConstraintProcessor::new("c1");

        proc.process(
            &mut cat,
            &ConstraintRow::foreign_key("s1", "orders", "fk_buyer", "buyer_id", "s1", "users", "id"),
        )
        .unwrap();
        proc.process(
            &mut cat,
            &ConstraintRow::foreign_key(
                "s1", "orders", "fk_seller", "seller_id", "s1", "users", "id",
            ),
        )
        .unwrap();

        let users = cat.table("s1", "users").unwrap();
        assert_eq!(users.referenced_by.len(), 1);
        assert_eq!(users.referenced_by[0].foreign_keys.len(), 2);
    }

    #[test]
    fn self_referencing_foreign_key_lands_on_both_edge_lists() {
        let mut cat = catalog(&[("s1", "employees")]);
        let mut proc = ConstraintProcessor::new("c1");

        proc.process(
            &mut cat,
            &ConstraintRow::foreign_key(
                "s1",
                "employees",
                "fk_manager",
                "manager_id",
                "s1",
                "employees",
                "id",
            ),
        )
        .unwrap();

        let employees = cat.table("s1", "employees").unwrap();
        assert_eq!(employees.foreign_keys.len(), 1);
        assert_eq!(employees.referenced_by.len(), 1);
        assert_eq!(
            employees.referenced_by[0].source,
            CollectionKey::new("c1", "s1", "employees")
        );
    }

    #[test]
    fn interleaved_tables_do_not_merge_same_named_constraints() {
        // Adjacency is per table: a unique key on another table in between
        // does not break the first table's merge, because merging keys on
        // each table's own most recent entry.
        let mut cat = catalog(&[("s1", "a"), ("s1", "b")]);
        let mut proc = ConstraintProcessor::new("c1");

        proc.process(&mut cat, &ConstraintRow::unique("s1", "a", "uq", "x"))
            .unwrap();
        proc.process(&mut cat, &ConstraintRow::unique("s1", "b", "uq", "y"))
            .unwrap();
        proc.process(&mut cat, &ConstraintRow::unique("s1", "a", "uq", "z"))
            .unwrap();

        let a = cat.table("s1", "a").unwrap();
        let b = cat.table("s1", "b").unwrap();
        assert_eq!(a.alternate_keys.len(), 1);
        assert_eq!(
            a.alternate_keys[0].columns,
            vec!["x".to_string(), "z".to_string()]
        );
        assert_eq!(b.alternate_keys[0].columns, vec!["y".to_string()]);
    }
}

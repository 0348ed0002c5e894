#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use futures::stream::{self, StreamExt};

    use schemer::error::{ProviderError, ProviderResult};
    use schemer::model::{CollectionKey, DbObjectType, IndexType, ReferentialAction};
    use schemer::provider::{
        CollectionRow, ColumnRow, ConstraintRow, IndexColumnRow, IndexRow, MetadataProvider,
        MetadataStream, TableScope,
    };
    use schemer::scan::ScanWarning;
    use schemer::{ScanOptions, Schemer};

    /// In-memory provider serving one fixed metadata set in either mode.
    ///
    /// Bulk streams are served in (schema, table[, index]) order, as the
    /// provider contract requires.
    #[derive(Clone, Default)]
    struct FixtureProvider {
        bulk: bool,
        collections: Vec<CollectionRow>,
        columns: Vec<ColumnRow>,
        indexes: Vec<IndexRow>,
        index_columns: Vec<IndexColumnRow>,
        constraints: Vec<ConstraintRow>,
        counts: HashMap<(String, String), Result<Option<u64>, String>>,
        /// Sleep this long before yielding each column row.
        column_delay: Option<Duration>,
    }

    fn stream_of<T: Send + 'static>(
        rows: Vec<T>,
        delay: Option<Duration>,
    ) -> MetadataStream<'static, T> {
        stream::iter(rows.into_iter().map(Ok))
            .then(move |row| async move {
                if let Some(d) = delay {
                    tokio::time::sleep(d).await;
                }
                row
            })
            .boxed()
    }

    impl FixtureProvider {
        fn scoped<T: Clone>(rows: &[T], matches: impl Fn(&T) -> bool) -> Vec<T> {
            rows.iter().filter(|r| matches(r)).cloned().collect()
        }
    }

    #[async_trait]
    impl MetadataProvider for FixtureProvider {
        fn is_bulk(&self) -> bool {
            self.bulk
        }

        async fn collections(
            &self,
            _catalog: &str,
        ) -> ProviderResult<MetadataStream<'_, CollectionRow>> {
            Ok(stream_of(self.collections.clone(), None))
        }

        async fn columns(
            &self,
            scope: &TableScope,
        ) -> ProviderResult<MetadataStream<'_, ColumnRow>> {
            let rows = Self::scoped(&self.columns, |r| {
                r.schema == scope.schema && r.table == scope.table
            });
            Ok(stream_of(rows, self.column_delay))
        }

        async fn indexes(
            &self,
            scope: &TableScope,
        ) -> ProviderResult<MetadataStream<'_, IndexRow>> {
            let rows = Self::scoped(&self.indexes, |r| {
                r.schema == scope.schema && r.table == scope.table
            });
            Ok(stream_of(rows, None))
        }

        async fn index_columns(
            &self,
            scope: &TableScope,
        ) -> ProviderResult<MetadataStream<'_, IndexColumnRow>> {
            let rows = Self::scoped(&self.index_columns, |r| {
                r.schema == scope.schema && r.table == scope.table
            });
            Ok(stream_of(rows, None))
        }

        async fn constraints(
            &self,
            scope: &TableScope,
        ) -> ProviderResult<MetadataStream<'_, ConstraintRow>> {
            let rows = Self::scoped(&self.constraints, |r| {
                r.schema == scope.schema && r.table == scope.table
            });
            Ok(stream_of(rows, None))
        }

        async fn columns_bulk(
            &self,
            _catalog: &str,
        ) -> ProviderResult<MetadataStream<'_, ColumnRow>> {
            Ok(stream_of(self.columns.clone(), self.column_delay))
        }

        async fn indexes_bulk(
            &self,
            _catalog: &str,
        ) -> ProviderResult<MetadataStream<'_, IndexRow>> {
            Ok(stream_of(self.indexes.clone(), None))
        }

        async fn index_columns_bulk(
            &self,
            _catalog: &str,
        ) -> ProviderResult<MetadataStream<'_, IndexColumnRow>> {
            Ok(stream_of(self.index_columns.clone(), None))
        }

        async fn constraints_bulk(
            &self,
            _catalog: &str,
        ) -> ProviderResult<MetadataStream<'_, ConstraintRow>> {
            Ok(stream_of(self.constraints.clone(), None))
        }

        async fn records_count(&self, scope: &TableScope) -> ProviderResult<Option<u64>> {
            match self
                .counts
                .get(&(scope.schema.clone(), scope.table.clone()))
            {
                Some(Ok(count)) => Ok(*count),
                Some(Err(message)) => Err(ProviderError::backend(message.clone())),
                None => Ok(None),
            }
        }
    }

    fn collection(schema: &str, name: &str, object_type: DbObjectType) -> CollectionRow {
        CollectionRow {
            schema: schema.to_string(),
            name: name.to_string(),
            object_type,
        }
    }

    fn column(
        table: &str,
        name: &str,
        ordinal: u32,
        type_name: &str,
        nullable: bool,
        pk_ordinal: Option<u32>,
    ) -> ColumnRow {
        ColumnRow {
            schema: "main".to_string(),
            table: table.to_string(),
            name: name.to_string(),
            ordinal,
            type_name: type_name.to_string(),
            nullable,
            pk_ordinal,
        }
    }

    /// Two tables and a view in one schema: orders carries a foreign key
    /// into users, an index, and both tables have record counts.
    fn sample_fixture(bulk: bool) -> FixtureProvider {
        let mut counts = HashMap::new();
        counts.insert(("main".to_string(), "users".to_string()), Ok(Some(2)));
        counts.insert(("main".to_string(), "orders".to_string()), Ok(Some(5)));

        FixtureProvider {
            bulk,
            collections: vec![
                collection("main", "users", DbObjectType::Table),
                collection("main", "orders", DbObjectType::Table),
                collection("main", "v_orders", DbObjectType::View),
            ],
            columns: vec![
                column("orders", "id", 1, "integer", false, Some(1)),
                column("orders", "user_id", 2, "integer", false, None),
                column("orders", "created_at", 3, "text", true, None),
                column("users", "id", 1, "integer", false, Some(1)),
                column("users", "email", 2, "varchar(80)", false, None),
                column("users", "name", 3, "varchar(80)", true, None),
            ],
            indexes: vec![
                IndexRow {
                    schema: "main".to_string(),
                    table: "orders".to_string(),
                    name: "ix_orders_user".to_string(),
                    type_tag: "btree".to_string(),
                    unique: false,
                    primary: false,
                },
                IndexRow {
                    schema: "main".to_string(),
                    table: "users".to_string(),
                    name: "ux_users_email".to_string(),
                    type_tag: "btree".to_string(),
                    unique: true,
                    primary: false,
                },
            ],
            index_columns: vec![
                IndexColumnRow {
                    schema: "main".to_string(),
                    table: "orders".to_string(),
                    index: "ix_orders_user".to_string(),
                    column: "user_id".to_string(),
                    descending: false,
                },
                IndexColumnRow {
                    schema: "main".to_string(),
                    table: "users".to_string(),
                    index: "ux_users_email".to_string(),
                    column: "email".to_string(),
                    descending: false,
                },
            ],
            constraints: vec![
                ConstraintRow::primary_key("main", "orders", "pk_orders", "id"),
                ConstraintRow {
                    on_delete: ReferentialAction::Cascade,
                    ..ConstraintRow::foreign_key(
                        "main", "orders", "fk_orders_user", "user_id", "main", "users", "id",
                    )
                },
                ConstraintRow::primary_key("main", "users", "pk_users", "id"),
                ConstraintRow::unique("main", "users", "uq_users_email", "email"),
            ],
            counts,
            column_delay: None,
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    #[tokio::test]
    async fn per_object_scan_assembles_the_full_graph() {
        init_tracing();
        let scanner = Schemer::new(sample_fixture(false));
        let outcome = scanner.scan_catalog("c1").await.unwrap();
        assert!(outcome.warnings.is_empty());
        let catalog = outcome.catalog;

        let schema = catalog.schema("main").unwrap();
        assert_eq!(schema.tables.len(), 2);
        assert_eq!(schema.views.len(), 1);

        let users = catalog.table("main", "users").unwrap();
        let columns: Vec<&str> = users.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["id", "email", "name"]);
        let email = users.column("email").unwrap();
        assert_eq!(email.type_name, "varchar(80)");
        assert!(!email.nullable);
        assert!(users.column("missing").is_none());
        let pk = users.primary_key.as_ref().unwrap();
        assert_eq!(pk.name, "pk_users");
        assert_eq!(pk.columns, vec!["id".to_string()]);
        assert_eq!(users.alternate_keys.len(), 1);
        assert_eq!(users.record_count, Some(2));

        let orders = catalog.table("main", "orders").unwrap();
        assert_eq!(orders.foreign_keys.len(), 1);
        let fk = &orders.foreign_keys[0];
        assert_eq!(fk.references, CollectionKey::new("c1", "main", "users"));
        assert_eq!(fk.on_delete, ReferentialAction::Cascade);
        assert_eq!(orders.indexes.len(), 1);
        assert_eq!(orders.indexes[0].index_type, IndexType::BTree);
        assert_eq!(orders.indexes[0].columns.len(), 1);
        assert_eq!(orders.record_count, Some(5));

        // The bidirectional invariant: exactly one back-edge on users,
        // keyed by orders, mirroring the outgoing key.
        assert_eq!(users.referenced_by.len(), 1);
        let back = &users.referenced_by[0];
        assert_eq!(back.source, CollectionKey::new("c1", "main", "orders"));
        assert_eq!(back.foreign_keys.len(), 1);
        assert_eq!(back.foreign_keys[0].name, fk.name);
        assert_eq!(back.foreign_keys[0].columns, fk.columns);
    }

    #[tokio::test]
    async fn bulk_and_per_object_strategies_build_equal_catalogs() {
        let per_object = Schemer::new(sample_fixture(false))
            .scan_catalog("c1")
            .await
            .unwrap();
        let bulk = Schemer::new(sample_fixture(true))
            .scan_catalog("c1")
            .await
            .unwrap();

        assert_eq!(per_object.catalog, bulk.catalog);
    }

    #[tokio::test]
    async fn primary_key_columns_follow_pk_position_not_column_order() {
        let fixture = FixtureProvider {
            collections: vec![collection("main", "events", DbObjectType::Table)],
            columns: vec![
                column("events", "region", 1, "text", false, Some(2)),
                column("events", "id", 2, "integer", false, Some(1)),
                column("events", "payload", 3, "text", true, None),
            ],
            constraints: vec![
                ConstraintRow::primary_key("main", "events", "pk_events", "id"),
                ConstraintRow::primary_key("main", "events", "pk_events", "region"),
            ],
            ..FixtureProvider::default()
        };

        let outcome = Schemer::new(fixture).scan_catalog("c1").await.unwrap();
        let pk = outcome
            .catalog
            .table("main", "events")
            .unwrap()
            .primary_key
            .clone()
            .unwrap();
        assert_eq!(pk.name, "pk_events");
        assert_eq!(pk.columns, vec!["id".to_string(), "region".to_string()]);
    }

    #[tokio::test]
    async fn missing_referenced_table_fails_the_scan_and_names_it() {
        let fixture = FixtureProvider {
            collections: vec![collection("s1", "t1", DbObjectType::Table)],
            columns: vec![
                ColumnRow {
                    schema: "s1".to_string(),
                    ..column("t1", "col1", 1, "integer", false, Some(1))
                },
                ColumnRow {
                    schema: "s1".to_string(),
                    ..column("t1", "col2", 2, "integer", false, None)
                },
            ],
            constraints: vec![
                ConstraintRow::primary_key("s1", "t1", "pk_t1", "col1"),
                ConstraintRow::foreign_key("s1", "t1", "fk_t1_t2", "col2", "s1", "t2", "id"),
            ],
            ..FixtureProvider::default()
        };

        let failure = Schemer::new(fixture).scan_catalog("c1").await.unwrap_err();
        assert!(failure.to_string().contains("t2"));

        // The partial catalog is still returned for inspection.
        let t1 = failure.catalog.table("s1", "t1").unwrap();
        assert_eq!(t1.columns.len(), 2);
        assert!(t1.primary_key.is_some());
    }

    #[tokio::test]
    async fn deadline_expiry_aborts_the_scan() {
        for bulk in [false, true] {
            let fixture = FixtureProvider {
                column_delay: Some(Duration::from_millis(50)),
                ..sample_fixture(bulk)
            };
            let scanner = Schemer::with_options(
                fixture,
                ScanOptions::with_deadline(Duration::from_millis(1)),
            );

            let failure = scanner.scan_catalog("c1").await.unwrap_err();
            assert!(
                failure.to_string().contains("deadline exceeded"),
                "unexpected failure: {failure}"
            );
        }
    }

    #[tokio::test]
    async fn record_count_failure_becomes_a_warning() {
        let mut fixture = sample_fixture(false);
        fixture.counts.insert(
            ("main".to_string(), "orders".to_string()),
            Err("permission denied".to_string()),
        );

        let outcome = Schemer::new(fixture).scan_catalog("c1").await.unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        match &outcome.warnings[0] {
            ScanWarning::RecordCount { table, message, .. } => {
                assert_eq!(table, "orders");
                assert!(message.contains("permission denied"));
            }
        }

        let orders = outcome.catalog.table("main", "orders").unwrap();
        assert_eq!(orders.record_count, None);
        // The other table's count still landed.
        assert_eq!(
            outcome.catalog.table("main", "users").unwrap().record_count,
            Some(2)
        );
    }

    #[tokio::test]
    async fn record_counts_can_be_disabled() {
        let options = ScanOptions {
            fetch_record_counts: false,
            ..ScanOptions::default()
        };
        let scanner = Schemer::with_options(sample_fixture(false), options);
        assert!(!scanner.options().fetch_record_counts);

        let outcome = scanner.scan_catalog("c1").await.unwrap();
        assert!(outcome.catalog.tables().all(|t| t.record_count.is_none()));
    }

    #[tokio::test]
    async fn index_rows_need_no_name_order_within_a_table() {
        // Index streams only promise (schema, table) order; one table's
        // indexes may arrive in any name order, while the index-column
        // stream stays name-sorted.
        for bulk in [false, true] {
            let fixture = FixtureProvider {
                bulk,
                collections: vec![collection("main", "t1", DbObjectType::Table)],
                indexes: vec![
                    IndexRow {
                        schema: "main".to_string(),
                        table: "t1".to_string(),
                        name: "ix_b".to_string(),
                        type_tag: "btree".to_string(),
                        unique: false,
                        primary: false,
                    },
                    IndexRow {
                        schema: "main".to_string(),
                        table: "t1".to_string(),
                        name: "ix_a".to_string(),
                        type_tag: "btree".to_string(),
                        unique: false,
                        primary: false,
                    },
                ],
                index_columns: vec![
                    IndexColumnRow {
                        schema: "main".to_string(),
                        table: "t1".to_string(),
                        index: "ix_a".to_string(),
                        column: "col_a".to_string(),
                        descending: false,
                    },
                    IndexColumnRow {
                        schema: "main".to_string(),
                        table: "t1".to_string(),
                        index: "ix_b".to_string(),
                        column: "col_b".to_string(),
                        descending: true,
                    },
                ],
                ..FixtureProvider::default()
            };

            let outcome = Schemer::new(fixture).scan_catalog("c1").await.unwrap();
            let t1 = outcome.catalog.table("main", "t1").unwrap();
            assert_eq!(t1.indexes.len(), 2, "bulk = {bulk}");

            let ix_a = t1.indexes.iter().find(|i| i.name == "ix_a").unwrap();
            assert_eq!(ix_a.columns.len(), 1);
            assert_eq!(ix_a.columns[0].name, "col_a");

            let ix_b = t1.indexes.iter().find(|i| i.name == "ix_b").unwrap();
            assert_eq!(ix_b.columns.len(), 1);
            assert!(ix_b.columns[0].descending);
        }
    }

    #[tokio::test]
    async fn two_adjacent_fk_rows_build_one_mirrored_two_column_key() {
        let fixture = FixtureProvider {
            collections: vec![
                collection("main", "items", DbObjectType::Table),
                collection("main", "parents", DbObjectType::Table),
            ],
            constraints: vec![
                ConstraintRow::foreign_key(
                    "main", "items", "fk_parent", "col_a", "main", "parents", "pa",
                ),
                ConstraintRow::foreign_key(
                    "main", "items", "fk_parent", "col_b", "main", "parents", "pb",
                ),
            ],
            ..FixtureProvider::default()
        };

        let outcome = Schemer::new(fixture).scan_catalog("c1").await.unwrap();
        let items = outcome.catalog.table("main", "items").unwrap();
        assert_eq!(items.foreign_keys.len(), 1);
        let names: Vec<&str> = items.foreign_keys[0]
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["col_a", "col_b"]);

        let parents = outcome.catalog.table("main", "parents").unwrap();
        assert_eq!(parents.referenced_by.len(), 1);
        assert_eq!(
            parents.referenced_by[0].foreign_keys[0].columns,
            items.foreign_keys[0].columns
        );
    }

    #[tokio::test]
    async fn scanned_catalog_round_trips_through_json() {
        let outcome = Schemer::new(sample_fixture(false))
            .scan_catalog("c1")
            .await
            .unwrap();

        let json = serde_json::to_string(&outcome.catalog).unwrap();
        let back: schemer::model::Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome.catalog);
    }
}

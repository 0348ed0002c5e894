//! Scan orchestration.
//!
//! `Schemer` owns one `scan_catalog` workflow: list and classify every
//! collection, then drive the bulk or per-object strategy. Concurrent
//! phases only fetch provider rows; every catalog write happens after the
//! phase's join barrier, on the calling task.

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tracing::{debug, info, warn};

use super::constraints::ConstraintProcessor;
use super::deadline::Deadline;
use super::matchers::{IndexKey, SortedIndexes, SortedTables, TableKey};
use super::runner::join_tasks;
use super::ScanWarning;
use crate::config::ScanOptions;
use crate::error::{ProviderError, ScanError, ScanFailure, ScanResult, TaskErrors};
use crate::model::{
    Catalog, Collection, Column, DbObjectType, Index, IndexColumn, IndexType, UniqueKey,
};
use crate::provider::{
    ColumnRow, ConstraintRow, IndexColumnRow, IndexRow, MetadataProvider, MetadataStream,
    TableScope,
};

/// A completed scan: the finished catalog plus non-fatal diagnostics.
#[derive(Debug)]
pub struct ScanOutcome {
    pub catalog: Catalog,
    pub warnings: Vec<ScanWarning>,
}

/// The scanning orchestrator.
///
/// Generic over the provider so engine dispatch is static; the scanner
/// itself keeps no state between calls — every `scan_catalog` builds a
/// fresh graph from scratch.
pub struct Schemer<P> {
    provider: P,
    options: ScanOptions,
}

/// Output of one fetch task; stitched onto the catalog after the barrier.
enum Fetch {
    /// Per-object: columns of one table.
    Columns {
        schema: String,
        table: String,
        rows: Vec<ColumnRow>,
    },
    /// Bulk: the catalog-wide column stream.
    ColumnsBulk(Vec<ColumnRow>),
    /// Per-object: indexes of one table, already assembled.
    Indexes {
        schema: String,
        table: String,
        indexes: Vec<Index>,
    },
    /// Bulk: the raw catalog-wide index and index-column streams.
    IndexesBulk {
        rows: Vec<IndexRow>,
        column_rows: Vec<IndexColumnRow>,
    },
    Constraints(Vec<ConstraintRow>),
    Records {
        schema: String,
        table: String,
        result: Result<Option<u64>, ProviderError>,
    },
}

impl<P: MetadataProvider> Schemer<P> {
    /// Scanner with default options.
    pub fn new(provider: P) -> Self {
        Self::with_options(provider, ScanOptions::default())
    }

    /// Scanner with explicit options.
    pub fn with_options(provider: P, options: ScanOptions) -> Self {
        Self { provider, options }
    }

    /// The configured options.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan one catalog and assemble its graph.
    ///
    /// On failure the returned [`ScanFailure`] still carries the partially
    /// populated catalog for diagnostic inspection; it must not be treated
    /// as valid or complete.
    pub async fn scan_catalog(&self, name: &str) -> Result<ScanOutcome, ScanFailure> {
        let deadline = Deadline::from_timeout(self.options.deadline);
        let mut catalog = Catalog::new(name);
        let mut warnings = Vec::new();

        info!(
            catalog = name,
            bulk = self.provider.is_bulk(),
            "starting catalog scan"
        );

        if let Err(err) = self.classify_collections(&mut catalog, deadline).await {
            return Err(ScanFailure {
                catalog,
                warnings,
                errors: err.into(),
            });
        }

        let result = if self.provider.is_bulk() {
            self.scan_bulk(&mut catalog, deadline, &mut warnings).await
        } else {
            self.scan_per_object(&mut catalog, deadline, &mut warnings)
                .await
        };

        match result {
            Ok(()) => {
                info!(
                    catalog = name,
                    schemas = catalog.schemas.len(),
                    warnings = warnings.len(),
                    "catalog scan complete"
                );
                Ok(ScanOutcome { catalog, warnings })
            }
            Err(errors) => {
                warn!(catalog = name, failures = errors.len(), "catalog scan failed");
                Err(ScanFailure {
                    catalog,
                    warnings,
                    errors,
                })
            }
        }
    }

    /// Step 1: one collection listing, classified into schemas and into
    /// tables vs views by object type.
    async fn classify_collections(
        &self,
        catalog: &mut Catalog,
        deadline: Deadline,
    ) -> ScanResult<()> {
        let context = format!("listing collections of {}", catalog.name);
        let stream = self
            .provider
            .collections(&catalog.name)
            .await
            .map_err(|e| ScanError::provider(&context, e))?;
        let rows = drain(stream, deadline, &context).await?;

        for row in rows {
            let collection = Collection::new(&row.schema, &row.name, row.object_type);
            let schema = catalog.schema_entry(&row.schema);
            match row.object_type {
                DbObjectType::Table => schema.tables.push(collection),
                DbObjectType::View => schema.views.push(collection),
            }
        }
        catalog.sort_collections();

        debug!(
            catalog = %catalog.name,
            tables = catalog.tables().count(),
            "collections classified"
        );
        Ok(())
    }

    /// Bulk strategy: three catalog-wide fetch tasks (plus best-effort
    /// record counts), then one sequential stitch pass.
    async fn scan_bulk(
        &self,
        catalog: &mut Catalog,
        deadline: Deadline,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<(), TaskErrors> {
        let name = catalog.name.clone();
        let provider = &self.provider;
        let mut tasks: Vec<BoxFuture<'_, ScanResult<Fetch>>> = Vec::new();

        {
            let name = name.clone();
            tasks.push(
                async move {
                    let context = format!("reading catalog-wide columns of {name}");
                    let stream = provider
                        .columns_bulk(&name)
                        .await
                        .map_err(|e| ScanError::provider(&context, e))?;
                    Ok(Fetch::ColumnsBulk(drain(stream, deadline, &context).await?))
                }
                .boxed(),
            );
        }
        {
            let name = name.clone();
            tasks.push(
                async move {
                    let context = format!("reading catalog-wide indexes of {name}");
                    let stream = provider
                        .indexes_bulk(&name)
                        .await
                        .map_err(|e| ScanError::provider(&context, e))?;
                    let rows = drain(stream, deadline, &context).await?;

                    let context = format!("reading catalog-wide index columns of {name}");
                    let stream = provider
                        .index_columns_bulk(&name)
                        .await
                        .map_err(|e| ScanError::provider(&context, e))?;
                    let column_rows = drain(stream, deadline, &context).await?;
                    Ok(Fetch::IndexesBulk { rows, column_rows })
                }
                .boxed(),
            );
        }
        {
            let name = name.clone();
            tasks.push(
                async move {
                    let context = format!("reading catalog-wide constraints of {name}");
                    let stream = provider
                        .constraints_bulk(&name)
                        .await
                        .map_err(|e| ScanError::provider(&context, e))?;
                    Ok(Fetch::Constraints(drain(stream, deadline, &context).await?))
                }
                .boxed(),
            );
        }
        if self.options.fetch_record_counts {
            for key in catalog.table_keys() {
                tasks.push(record_count_task(provider, key.schema, key.name, &name, deadline));
            }
        }

        let fetches = join_tasks(tasks).await?;
        debug!(catalog = %name, "bulk fetch phase joined");

        let mut errors = Vec::new();
        let mut constraint_rows = Vec::new();

        for fetch in fetches {
            match fetch {
                Fetch::ColumnsBulk(rows) => {
                    if let Err(e) = stitch_columns(catalog, rows, deadline) {
                        errors.push(e);
                    }
                }
                Fetch::IndexesBulk { rows, column_rows } => {
                    if let Err(e) = stitch_indexes(catalog, rows, column_rows, deadline) {
                        errors.push(e);
                    }
                }
                Fetch::Constraints(rows) => constraint_rows = rows,
                Fetch::Records {
                    schema,
                    table,
                    result,
                } => install_record_count(catalog, schema, table, result, warnings),
                Fetch::Columns { .. } | Fetch::Indexes { .. } => {
                    unreachable!("per-object fetch in bulk path")
                }
            }
        }

        finalize_tables(catalog);

        let mut processor = ConstraintProcessor::new(&name);
        for row in &constraint_rows {
            let fold = deadline
                .check("processing constraints")
                .and_then(|()| processor.process(catalog, row));
            if let Err(e) = fold {
                errors.push(e);
                break;
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TaskErrors::new(errors))
        }
    }

    /// Per-object strategy: one columns task and one indexes task per base
    /// table (plus best-effort record counts), a join barrier, then the
    /// strictly sequential constraint pass.
    async fn scan_per_object(
        &self,
        catalog: &mut Catalog,
        deadline: Deadline,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<(), TaskErrors> {
        let name = catalog.name.clone();
        let provider = &self.provider;
        let keys: Vec<(String, String)> = catalog
            .tables()
            .map(|t| (t.schema.clone(), t.name.clone()))
            .collect();

        let mut tasks: Vec<BoxFuture<'_, ScanResult<Fetch>>> = Vec::new();
        for (schema, table) in &keys {
            {
                let scope = TableScope::new(&name, schema, table);
                tasks.push(
                    async move {
                        let context = format!("reading columns of {scope}");
                        let stream = provider
                            .columns(&scope)
                            .await
                            .map_err(|e| ScanError::provider(&context, e))?;
                        Ok(Fetch::Columns {
                            schema: scope.schema,
                            table: scope.table,
                            rows: drain(stream, deadline, &context).await?,
                        })
                    }
                    .boxed(),
                );
            }
            {
                let scope = TableScope::new(&name, schema, table);
                tasks.push(
                    async move {
                        let context = format!("reading indexes of {scope}");
                        let stream = provider
                            .indexes(&scope)
                            .await
                            .map_err(|e| ScanError::provider(&context, e))?;
                        let rows = drain(stream, deadline, &context).await?;

                        let context = format!("reading index columns of {scope}");
                        let stream = provider
                            .index_columns(&scope)
                            .await
                            .map_err(|e| ScanError::provider(&context, e))?;
                        let column_rows = drain(stream, deadline, &context).await?;

                        let indexes = assemble_indexes(rows, column_rows)?;
                        Ok(Fetch::Indexes {
                            schema: scope.schema,
                            table: scope.table,
                            indexes,
                        })
                    }
                    .boxed(),
                );
            }
            if self.options.fetch_record_counts {
                tasks.push(record_count_task(
                    provider,
                    schema.clone(),
                    table.clone(),
                    &name,
                    deadline,
                ));
            }
        }

        let fetches = join_tasks(tasks).await?;
        debug!(catalog = %name, tables = keys.len(), "per-object fetch phase joined");

        for fetch in fetches {
            match fetch {
                Fetch::Columns {
                    schema,
                    table,
                    rows,
                } => {
                    if let Some(t) = catalog.table_mut(&schema, &table) {
                        t.columns = rows.into_iter().map(column_from_row).collect();
                    }
                }
                Fetch::Indexes {
                    schema,
                    table,
                    indexes,
                } => {
                    if let Some(t) = catalog.table_mut(&schema, &table) {
                        t.indexes = indexes;
                    }
                }
                Fetch::Records {
                    schema,
                    table,
                    result,
                } => install_record_count(catalog, schema, table, result, warnings),
                Fetch::ColumnsBulk(_) | Fetch::IndexesBulk { .. } | Fetch::Constraints(_) => {
                    unreachable!("bulk fetch in per-object path")
                }
            }
        }

        finalize_tables(catalog);

        // Constraints run one table at a time: a foreign-key row mutates
        // the referenced table too, so this pass is never concurrent.
        let mut errors = Vec::new();
        let mut processor = ConstraintProcessor::new(&name);
        for (schema, table) in &keys {
            let scope = TableScope::new(&name, schema, table);
            let context = format!("reading constraints of {scope}");
            let fold: ScanResult<()> = async {
                let stream = self
                    .provider
                    .constraints(&scope)
                    .await
                    .map_err(|e| ScanError::provider(&context, e))?;
                let rows = drain(stream, deadline, &context).await?;
                for row in &rows {
                    processor.process(catalog, row)?;
                }
                Ok(())
            }
            .await;
            if let Err(e) = fold {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TaskErrors::new(errors))
        }
    }
}

/// Exhaust a row stream, checking the deadline before each read.
async fn drain<T>(
    mut stream: MetadataStream<'_, T>,
    deadline: Deadline,
    context: &str,
) -> ScanResult<Vec<T>> {
    let mut rows = Vec::new();
    loop {
        deadline.check(context)?;
        match stream.next().await {
            Some(Ok(row)) => rows.push(row),
            Some(Err(err)) => return Err(ScanError::provider(context, err)),
            None => break,
        }
    }
    Ok(rows)
}

/// Best-effort record count; provider failures become warnings, never
/// scan errors. Deadline expiry still aborts.
fn record_count_task<'a, P: MetadataProvider>(
    provider: &'a P,
    schema: String,
    table: String,
    catalog: &str,
    deadline: Deadline,
) -> BoxFuture<'a, ScanResult<Fetch>> {
    let scope = TableScope::new(catalog, &schema, &table);
    async move {
        deadline.check(&format!("counting records of {scope}"))?;
        let result = provider.records_count(&scope).await;
        Ok(Fetch::Records {
            schema,
            table,
            result,
        })
    }
    .boxed()
}

fn column_from_row(row: ColumnRow) -> Column {
    Column {
        name: row.name,
        ordinal: row.ordinal,
        type_name: row.type_name,
        nullable: row.nullable,
        pk_ordinal: row.pk_ordinal,
    }
}

/// Stitch catalog-wide column rows onto their tables.
fn stitch_columns(
    catalog: &mut Catalog,
    rows: Vec<ColumnRow>,
    deadline: Deadline,
) -> ScanResult<()> {
    let mut matcher = table_matcher(catalog);
    for row in rows {
        deadline.check("stitching columns")?;
        if matcher.sequential_find(&row.schema, &row.table).is_none() {
            return Err(ScanError::UnknownTable {
                kind: "column",
                schema: row.schema,
                table: row.table,
            });
        }
        let table = catalog
            .table_mut(&row.schema, &row.table)
            .unwrap_or_else(|| unreachable!("matcher returned this key"));
        table.columns.push(column_from_row(row));
    }
    Ok(())
}

/// Stitch catalog-wide index rows, then their index-column rows.
fn stitch_indexes(
    catalog: &mut Catalog,
    rows: Vec<IndexRow>,
    column_rows: Vec<IndexColumnRow>,
    deadline: Deadline,
) -> ScanResult<()> {
    let mut matcher = table_matcher(catalog);
    for row in rows {
        deadline.check("stitching indexes")?;
        if matcher.sequential_find(&row.schema, &row.table).is_none() {
            return Err(ScanError::UnknownTable {
                kind: "index",
                schema: row.schema,
                table: row.table,
            });
        }
        let table = catalog
            .table_mut(&row.schema, &row.table)
            .unwrap_or_else(|| unreachable!("matcher returned this key"));
        table.indexes.push(Index {
            name: row.name,
            index_type: IndexType::parse(&row.type_tag),
            unique: row.unique,
            primary: row.primary,
            columns: Vec::new(),
        });
    }

    // Index rows only promise (schema, table) order, so the key list is
    // sorted here before the single-pass matcher walks it.
    let mut keys: Vec<IndexKey> = catalog
        .tables()
        .flat_map(|t| {
            t.indexes.iter().map(|i| IndexKey {
                schema: t.schema.clone(),
                table: t.name.clone(),
                index: i.name.clone(),
            })
        })
        .collect();
    keys.sort();
    let mut matcher = SortedIndexes::new(keys);
    for row in column_rows {
        deadline.check("stitching index columns")?;
        if matcher
            .sequential_find(&row.schema, &row.table, &row.index)
            .is_none()
        {
            return Err(ScanError::UnknownIndex {
                schema: row.schema,
                table: row.table,
                index: row.index,
            });
        }
        let table = catalog
            .table_mut(&row.schema, &row.table)
            .unwrap_or_else(|| unreachable!("matcher returned this key"));
        let index = table
            .index_mut(&row.index)
            .unwrap_or_else(|| unreachable!("matcher returned this key"));
        index.columns.push(IndexColumn {
            name: row.column,
            descending: row.descending,
        });
    }
    Ok(())
}

/// Assemble one table's indexes from its index and index-column rows.
fn assemble_indexes(
    rows: Vec<IndexRow>,
    column_rows: Vec<IndexColumnRow>,
) -> ScanResult<Vec<Index>> {
    let mut indexes = Vec::with_capacity(rows.len());
    let mut keys = Vec::with_capacity(rows.len());
    for row in rows {
        keys.push(IndexKey {
            schema: row.schema,
            table: row.table,
            index: row.name.clone(),
        });
        indexes.push(Index {
            name: row.name,
            index_type: IndexType::parse(&row.type_tag),
            unique: row.unique,
            primary: row.primary,
            columns: Vec::new(),
        });
    }

    // Index rows carry no name-order promise; sort before matching.
    keys.sort();
    let mut matcher = SortedIndexes::new(keys);
    for row in column_rows {
        if matcher
            .sequential_find(&row.schema, &row.table, &row.index)
            .is_none()
        {
            return Err(ScanError::UnknownIndex {
                schema: row.schema,
                table: row.table,
                index: row.index,
            });
        }
        let index = indexes
            .iter_mut()
            .find(|i| i.name == row.index)
            .unwrap_or_else(|| unreachable!("matcher returned this key"));
        index.columns.push(IndexColumn {
            name: row.column,
            descending: row.descending,
        });
    }
    Ok(indexes)
}

fn table_matcher(catalog: &Catalog) -> SortedTables {
    SortedTables::new(
        catalog
            .tables()
            .map(|t| TableKey {
                schema: t.schema.clone(),
                name: t.name.clone(),
            })
            .collect(),
    )
}

/// Order every table's columns by ordinal and derive primary keys from
/// pk-tagged columns (ascending pk ordinal) where no key exists yet.
///
/// Runs after the fetch barrier and before constraint processing in both
/// strategies, so a later PRIMARY KEY constraint row only names the
/// derived key instead of rebuilding it.
fn finalize_tables(catalog: &mut Catalog) {
    for schema in catalog.schemas.values_mut() {
        for table in &mut schema.tables {
            table.columns.sort_by_key(|c| c.ordinal);
            if table.primary_key.is_some() {
                continue;
            }
            let mut tagged: Vec<(u32, String)> = table
                .columns
                .iter()
                .filter_map(|c| c.pk_ordinal.map(|o| (o, c.name.clone())))
                .collect();
            if tagged.is_empty() {
                continue;
            }
            tagged.sort_by_key(|(ordinal, _)| *ordinal);
            table.primary_key = Some(UniqueKey {
                name: String::new(),
                columns: tagged.into_iter().map(|(_, name)| name).collect(),
            });
        }
    }
}

/// Install a best-effort record count, or record the warning.
fn install_record_count(
    catalog: &mut Catalog,
    schema: String,
    table: String,
    result: Result<Option<u64>, ProviderError>,
    warnings: &mut Vec<ScanWarning>,
) {
    match result {
        Ok(count) => {
            if let Some(t) = catalog.table_mut(&schema, &table) {
                t.record_count = count;
            }
        }
        Err(err) => {
            warn!(schema = %schema, table = %table, error = %err, "record count unavailable");
            warnings.push(ScanWarning::RecordCount {
                schema,
                table,
                message: err.to_string(),
            });
        }
    }
}

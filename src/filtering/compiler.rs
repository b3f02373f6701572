use std::collections::HashMap;
use std::str::FromStr;

use sea_orm::{
    ConnectionTrait, DatabaseBackend, EntityTrait, FromQueryResult, JsonValue, ModelTrait,
    PaginatorTrait, QueryFilter, QuerySelect, QueryTrait, Select, Value,
    sea_query::{
        Alias, Asterisk, ColumnRef, Expr, IntoColumnRef, JoinType, Order, Query, SelectStatement,
    },
};

use super::buckets::{FilterBuckets, bucketize};
use super::conditions::{PredicateContext, apply_filter, apply_negation, base_column, predicate, negated};
use super::search::build_free_text_condition;
use super::sort::apply_sorting;
use super::value::FilterValue;
use crate::errors::QueryError;
use crate::models::{FilterOperator, FilterOption, NormalizedSearchParams, SearchExtras};
use crate::pagination::{Listed, page_range};

/// Many-to-many relation reachable through a join table.
///
/// For products and labels: `field = "labels"`, `join_table = "products_labels"`,
/// `local_key = "product_id"`, `foreign_key = "label_id"`. With
/// `.with_related_table("labels", "id")` each row carries the full label rows instead
/// of their ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationConfig {
    /// Filter field and output key
    pub field: &'static str,
    pub join_table: &'static str,
    /// Join-table column pointing at the base entity
    pub local_key: &'static str,
    /// Join-table column holding the related id
    pub foreign_key: &'static str,
    /// Base-entity column referenced by `local_key`
    pub primary_key: &'static str,
    /// Related entity table whose rows are embedded, if any
    pub related_table: Option<&'static str>,
    /// Related-table column referenced by `foreign_key`
    pub related_key: &'static str,
}

impl RelationConfig {
    #[must_use]
    pub const fn new(
        field: &'static str,
        join_table: &'static str,
        local_key: &'static str,
        foreign_key: &'static str,
    ) -> Self {
        Self {
            field,
            join_table,
            local_key,
            foreign_key,
            primary_key: "id",
            related_table: None,
            related_key: "id",
        }
    }

    #[must_use]
    pub const fn with_primary_key(mut self, primary_key: &'static str) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Embed rows of `table`, joined on `table.key = join_table.foreign_key`.
    #[must_use]
    pub const fn with_related_table(mut self, table: &'static str, key: &'static str) -> Self {
        self.related_table = Some(table);
        self.related_key = key;
        self
    }

    fn local_column(&self) -> ColumnRef {
        (Alias::new(self.join_table), Alias::new(self.local_key)).into_column_ref()
    }

    fn foreign_column(&self) -> ColumnRef {
        (Alias::new(self.join_table), Alias::new(self.foreign_key)).into_column_ref()
    }
}

/// How the relation is attached to the base query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// Join the relation table so relation filters restrict the base rows
    Inner,
    /// Leave base rows unrestricted; the related collection is loaded afterwards
    Left,
}

impl JoinStrategy {
    #[must_use]
    pub fn for_buckets(buckets: &FilterBuckets<'_>) -> Self {
        if buckets.has_relation_filters() {
            Self::Inner
        } else {
            Self::Left
        }
    }
}

/// Per-entity settings the compiler needs next to the request.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig<'a> {
    /// Plural resource name, used in logs and errors
    pub resource: &'a str,
    pub relation: Option<&'a RelationConfig>,
    /// Columns matched by the free-text `q`
    pub search_columns: &'a [&'a str],
    pub language: &'a str,
    pub backend: DatabaseBackend,
}

impl SearchConfig<'_> {
    const fn predicate_context(&self) -> PredicateContext<'_> {
        PredicateContext {
            backend: self.backend,
            language: self.language,
        }
    }
}

/// A compiled list query: the filtered query for counting and the sorted, ranged
/// query for the page.
#[derive(Debug, Clone)]
pub struct CompiledQuery<E: EntityTrait> {
    pub join: JoinStrategy,
    pub counted: Select<E>,
    pub paged: Select<E>,
    /// Inclusive row range of the page
    pub range: (u64, u64),
}

fn relation_condition(
    relation: &RelationConfig,
    filter: &FilterOption,
    context: PredicateContext<'_>,
) -> sea_orm::Condition {
    let column = relation.foreign_column();
    match (filter.operator, filter.not_op) {
        (Some(FilterOperator::In), _) => {
            let value = FilterValue::coerce(&filter.value, FilterOperator::In);
            predicate(FilterOperator::In, &column, &value, context)
        }
        (None, Some(not_op)) => {
            let value = FilterValue::coerce(&filter.value, not_op.as_operator());
            negated(not_op, &column, &value, context)
        }
        _ => {
            let value = FilterValue::coerce(&filter.value, FilterOperator::Eq);
            predicate(FilterOperator::Eq, &column, &value, context)
        }
    }
}

fn join_relation<E: EntityTrait>(mut select: Select<E>, relation: &RelationConfig) -> Select<E> {
    QueryTrait::query(&mut select).join(
        JoinType::InnerJoin,
        Alias::new(relation.join_table),
        Expr::col(base_column::<E>(relation.primary_key)).equals(relation.local_column()),
    );
    select.distinct()
}

/// Compile normalized parameters onto `select`.
///
/// Steps, in order: relation join and relation filters, base filters (with their
/// negated operators), negation-only filters, full-text filters, free-text `q`,
/// extension predicates, sort, range. Only the last two are excluded from the count.
#[must_use]
pub fn compile<E, X>(
    select: Select<E>,
    params: &NormalizedSearchParams<X>,
    config: &SearchConfig<'_>,
) -> CompiledQuery<E>
where
    E: EntityTrait,
    X: SearchExtras,
{
    let context = config.predicate_context();
    let buckets = bucketize(&params.filters, config.relation.map(|relation| relation.field));
    let join = JoinStrategy::for_buckets(&buckets);
    let mut select = select;

    if let Some(relation) = config.relation {
        if join == JoinStrategy::Inner {
            select = join_relation(select, relation);
        }
        for filter in &buckets.relation {
            select = select.filter(relation_condition(relation, filter, context));
        }
    }

    for filter in &buckets.base {
        select = apply_filter(select, filter, &base_column::<E>(&filter.field), context);
    }

    for filter in &buckets.not_only {
        select = apply_negation(select, filter, &base_column::<E>(&filter.field), context);
    }

    for filter in &buckets.fulltext {
        select = apply_filter(select, filter, &base_column::<E>(&filter.field), context);
    }

    if let Some(q) = params.q.as_deref() {
        let columns: Vec<ColumnRef> = config
            .search_columns
            .iter()
            .map(|column| base_column::<E>(column))
            .collect();
        if let Some(condition) = build_free_text_condition(q, &columns) {
            select = select.filter(condition);
        }
    }

    for (column, value) in params.extras.conditions() {
        select = select.filter(Expr::col(base_column::<E>(column)).eq(value));
    }

    let counted = select.clone();
    let range = page_range(params.page, params.limit);
    let paged = apply_sorting(select, &params.sort)
        .offset(range.0)
        .limit(params.limit);

    tracing::debug!(
        resource = config.resource,
        join = ?join,
        relation_filters = buckets.relation.len(),
        base_filters = buckets.base.len(),
        not_only_filters = buckets.not_only.len(),
        fulltext_filters = buckets.fulltext.len(),
        page = params.page,
        limit = params.limit,
        "Compiled list query"
    );

    CompiledQuery {
        join,
        counted,
        paged,
        range,
    }
}

impl<E> CompiledQuery<E>
where
    E: EntityTrait,
    E::Model: Sync,
{
    /// Run the count and the page query. Returns the page rows and the unpaginated count.
    pub async fn run<C: ConnectionTrait>(
        self,
        db: &C,
        resource: &str,
    ) -> Result<(Vec<E::Model>, u64), QueryError> {
        let total = self
            .counted
            .count(db)
            .await
            .map_err(|source| QueryError::execution(resource, source))?;
        if total == 0 {
            return Ok((Vec::new(), 0));
        }
        let rows = self
            .paged
            .all(db)
            .await
            .map_err(|source| QueryError::execution(resource, source))?;
        Ok((rows, total))
    }
}

/// Compile and execute in one step.
pub async fn compile_and_run<E, X, C>(
    db: &C,
    select: Select<E>,
    params: &NormalizedSearchParams<X>,
    config: &SearchConfig<'_>,
) -> Result<(Vec<E::Model>, u64), QueryError>
where
    E: EntityTrait,
    E::Model: Sync,
    X: SearchExtras,
    C: ConnectionTrait,
{
    compile(select, params, config).run(db, config.resource).await
}

/// Stable string key for a primary-key value, `None` for unsupported types.
fn value_key(value: &Value) -> Option<String> {
    match value {
        Value::String(Some(text)) => Some(text.to_string()),
        Value::Char(Some(c)) => Some(c.to_string()),
        Value::TinyInt(Some(n)) => Some(n.to_string()),
        Value::SmallInt(Some(n)) => Some(n.to_string()),
        Value::Int(Some(n)) => Some(n.to_string()),
        Value::BigInt(Some(n)) => Some(n.to_string()),
        Value::TinyUnsigned(Some(n)) => Some(n.to_string()),
        Value::SmallUnsigned(Some(n)) => Some(n.to_string()),
        Value::Unsigned(Some(n)) => Some(n.to_string()),
        Value::BigUnsigned(Some(n)) => Some(n.to_string()),
        Value::Uuid(Some(uuid)) => Some(uuid.to_string()),
        _ => None,
    }
}

fn json_key(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Batched lookup of the related collection for `keys`.
///
/// Selects the join table's local key next to either the foreign id or, with a related
/// table, every column of the related row.
fn related_statement(relation: &RelationConfig, keys: Vec<Value>) -> SelectStatement {
    let mut statement = Query::select();
    statement
        .column(relation.local_column())
        .from(Alias::new(relation.join_table))
        .and_where(Expr::col(relation.local_column()).is_in(keys));

    match relation.related_table {
        Some(table) => {
            statement.column((Alias::new(table), Asterisk)).inner_join(
                Alias::new(table),
                Expr::col((Alias::new(table), Alias::new(relation.related_key)))
                    .equals(relation.foreign_column()),
            );
        }
        None => {
            statement.column(relation.foreign_column());
        }
    }

    statement
        .order_by(relation.local_column(), Order::Asc)
        .order_by(relation.foreign_column(), Order::Asc)
        .to_owned()
}

/// Split one lookup row into its local key and the related item.
fn related_entry(relation: &RelationConfig, mut row: JsonValue) -> Option<(String, JsonValue)> {
    let object = row.as_object_mut()?;
    let local = object.remove(relation.local_key).as_ref().and_then(json_key)?;
    let item = match relation.related_table {
        Some(_) => JsonValue::Object(std::mem::take(object)),
        None => object.remove(relation.foreign_key).filter(|value| !value.is_null())?,
    };
    Some((local, item))
}

/// Load the related collection for `keys`, grouped by local key.
///
/// Items are related rows as JSON objects when the relation names a related table,
/// foreign ids otherwise. No query is issued for an empty key list.
pub async fn load_related<C: ConnectionTrait>(
    db: &C,
    relation: &RelationConfig,
    keys: Vec<Value>,
    resource: &str,
) -> Result<HashMap<String, Vec<JsonValue>>, QueryError> {
    if keys.is_empty() {
        return Ok(HashMap::new());
    }

    let statement = related_statement(relation, keys);
    let rows = JsonValue::find_by_statement(db.get_database_backend().build(&statement))
        .all(db)
        .await
        .map_err(|source| QueryError::execution(resource, source))?;

    let mut related: HashMap<String, Vec<JsonValue>> = HashMap::new();
    for (local, item) in rows.into_iter().filter_map(|row| related_entry(relation, row)) {
        related.entry(local).or_default().push(item);
    }
    Ok(related)
}

/// Attach each row's related collection (possibly empty) under the relation field.
pub async fn attach_related<E, C>(
    db: &C,
    relation: &RelationConfig,
    rows: Vec<E::Model>,
    resource: &str,
) -> Result<Vec<Listed<E::Model>>, QueryError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let Ok(column) = E::Column::from_str(relation.primary_key) else {
        tracing::warn!(
            resource,
            primary_key = relation.primary_key,
            "Relation primary key is not a column of the entity, skipping related lookup"
        );
        return Ok(rows
            .into_iter()
            .map(|row| Listed::with_related(row, relation.field, Vec::new()))
            .collect());
    };

    let keys: Vec<Value> = rows.iter().map(|row| row.get(column)).collect();
    let mut related = load_related(db, relation, keys.clone(), resource).await?;

    Ok(rows
        .into_iter()
        .zip(keys)
        .map(|(row, key)| {
            let items = value_key(&key)
                .and_then(|key| related.remove(&key))
                .unwrap_or_default();
            Listed::with_related(row, relation.field, items)
        })
        .collect())
}

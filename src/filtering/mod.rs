//! # Filtering, search and the list-query compiler
//!
//! Turns [`NormalizedSearchParams`](crate::models::NormalizedSearchParams) into a Sea-ORM
//! [`Select`](sea_orm::Select) with a matching count query.
//!
//! ## Filters
//!
//! Filters are first split into buckets by [`bucketize`]:
//!
//! - **relation**: the entity's relation field (e.g. `labels`), matched against the join
//!   table's foreign key. Their presence switches the join strategy to inner.
//! - **fulltext**: `fts`, `plfts`, `phfts`
//! - **not-only**: a negated operator and nothing else
//! - **base**: everything else; a missing operator means `eq`
//!
//! ## Operators
//!
//! ```rust,ignore
//! GET /products?filter[sell_price][operator]=gte&filter[sell_price][value]=1000
//! GET /products?filter[name][operator]=ilike&filter[name][value]=phone
//! GET /products?filter[id][operator]=in&filter[id][value]=p1,p2
//! GET /products?filter[description][operator]=is&filter[description][value]=null
//! GET /products?filter[status][notOp]=eq&filter[status][value]=archived
//! ```
//!
//! `like` and `ilike` both compare `UPPER(column)` against `%VALUE%`.
//!
//! ## Full-text search
//!
//! On `PostgreSQL` the full-text operators map to `websearch_to_tsquery`,
//! `plainto_tsquery` and `phraseto_tsquery` with the entity's configured language.
//! `SQLite` and `MySQL` fall back to substring matching with the same term semantics.

pub mod buckets;
pub mod compiler;
pub mod conditions;
pub mod search;
pub mod sort;
pub mod value;

pub use buckets::{FilterBuckets, bucketize};
pub use compiler::{
    CompiledQuery, JoinStrategy, RelationConfig, SearchConfig, attach_related, compile,
    compile_and_run, load_related,
};
pub use conditions::{PredicateContext, apply_filter, negated, predicate};
pub use search::{TextSearchMode, build_free_text_condition, build_fulltext_condition};
pub use sort::apply_sorting;
pub use value::FilterValue;

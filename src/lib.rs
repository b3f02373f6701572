//! Query-string search parameters and a Sea-ORM list-query compiler for Axum.
//!
//! ```rust,ignore
//! GET /products?q=phone&page=2&limit=5&sort[sell_price]=desc
//!     &filter[labels][operator]=in&filter[labels][value]=l1,l2
//! ```
//!
//! [`codec`] decodes and encodes the query string, [`models`] normalizes it,
//! [`filtering`] compiles it onto a `Select`, and [`pagination`] wraps the page.
//! [`ListResource`] ties them together per entity and [`routes::list_handler`] exposes
//! it over HTTP.

pub mod codec;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod traits;

pub use codec::{decode, encode};
pub use errors::{ApiError, QueryError};
pub use filtering::{JoinStrategy, RelationConfig, SearchConfig, compile, compile_and_run};
pub use models::{
    FilterNotOperator, FilterOperator, FilterOption, NormalizedSearchParams, SearchDefaults,
    SearchExtras, SearchParams, SortDirection, SortOption,
};
pub use pagination::{Listed, PaginatedResponse, Pagination};
pub use routes::{SearchQuery, list_handler};
pub use traits::ListResource;

// Re-export for implementors
pub use async_trait::async_trait;

//! Search request model shared by the codec, the normalizer and the compiler.
//!
//! A list endpoint receives a [`SearchParams`] (everything optional, straight from the
//! query string) and turns it into a [`NormalizedSearchParams`] with an explicit
//! [`SearchDefaults`] value. Filter values stay strings here; they are only coerced when
//! a predicate is built.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
pub const DEFAULT_SORT_COLUMN: &str = "created_at";

/// Sort direction, `asc` or `desc` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Only the exact lowercase literals are accepted.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// One sort key. Earlier entries take precedence over later ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct SortOption {
    pub field: String,
    #[serde(rename = "dir")]
    pub direction: SortDirection,
}

impl SortOption {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Comparison operators accepted in `filter[field][operator]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equality (=)
    Eq,
    /// Not equal (!=)
    Neq,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Case-insensitive substring match
    Like,
    /// Case-insensitive substring match (same as `Like`)
    Ilike,
    /// Membership in a comma-separated list
    In,
    /// IS NULL / IS TRUE / IS FALSE
    Is,
    /// Web-search style full-text query
    Fts,
    /// Plain full-text query, every term must match
    Plfts,
    /// Exact phrase full-text query
    Phfts,
}

impl FilterOperator {
    pub const ALL: [Self; 13] = [
        Self::Eq,
        Self::Neq,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Like,
        Self::Ilike,
        Self::In,
        Self::Is,
        Self::Fts,
        Self::Plfts,
        Self::Phfts,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::In => "in",
            Self::Is => "is",
            Self::Fts => "fts",
            Self::Plfts => "plfts",
            Self::Phfts => "phfts",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == token)
    }

    #[must_use]
    pub const fn is_fulltext(self) -> bool {
        matches!(self, Self::Fts | Self::Plfts | Self::Phfts)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operators allowed in `filter[field][notOp]`. Each one is applied as `NOT (...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterNotOperator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    Ilike,
}

impl FilterNotOperator {
    pub const ALL: [Self; 7] = [
        Self::Eq,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Like,
        Self::Ilike,
    ];

    #[must_use]
    pub const fn as_operator(self) -> FilterOperator {
        match self {
            Self::Eq => FilterOperator::Eq,
            Self::Lt => FilterOperator::Lt,
            Self::Lte => FilterOperator::Lte,
            Self::Gt => FilterOperator::Gt,
            Self::Gte => FilterOperator::Gte,
            Self::Like => FilterOperator::Like,
            Self::Ilike => FilterOperator::Ilike,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.as_operator().as_str()
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == token)
    }
}

impl fmt::Display for FilterNotOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single filter entry.
///
/// `operator` and `not_op` are independent: a filter may carry a positive operator, a
/// negated one, or both (applied together with AND) against the same `value`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    pub field: String,
    pub value: String,
    pub operator: Option<FilterOperator>,
    pub not_op: Option<FilterNotOperator>,
}

impl FilterOption {
    #[must_use]
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            operator: None,
            not_op: None,
        }
    }

    #[must_use]
    pub const fn with_operator(mut self, operator: FilterOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    #[must_use]
    pub const fn with_not(mut self, not_op: FilterNotOperator) -> Self {
        self.not_op = Some(not_op);
        self
    }
}

/// Entity-specific query keys that sit next to the generic grammar.
///
/// Orders accept `status=completed`, labels accept `type=order_attribute`, and so on.
/// The codec offers every key it does not understand to [`SearchExtras::accept`];
/// unclaimed keys end up in [`SearchParams::passthrough`].
pub trait SearchExtras: Clone + Default + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Claim a query pair. Returns `false` to leave it to the passthrough list.
    fn accept(&mut self, key: &str, value: &str) -> bool {
        let _ = (key, value);
        false
    }

    /// Drop values outside the allowed set. Never fails.
    #[must_use]
    fn normalize(self) -> Self {
        self
    }

    /// Append the query pairs that [`SearchExtras::accept`] would read back.
    fn encode(&self, pairs: &mut Vec<(String, String)>) {
        let _ = pairs;
    }

    /// Equality predicates `(column, value)` applied to the base entity.
    fn conditions(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

impl SearchExtras for () {}

/// Keep `value` only if it is one of `allowed`.
#[must_use]
pub fn literal_choice(value: Option<String>, allowed: &[&str]) -> Option<String> {
    value.filter(|v| allowed.contains(&v.as_str()))
}

/// Search request as received. Empty `sort`/`filters` mean "not provided".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchParams<X = ()> {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub q: Option<String>,
    pub sort: Vec<SortOption>,
    pub filters: Vec<FilterOption>,
    pub extras: X,
    /// Query pairs outside the grammar, in arrival order.
    pub passthrough: Vec<(String, String)>,
}

/// Defaults used by [`SearchParams::normalize`]. Each entity may supply its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDefaults {
    pub page: u64,
    pub limit: u64,
    pub max_limit: u64,
    pub sort: Vec<SortOption>,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            sort: vec![SortOption::desc(DEFAULT_SORT_COLUMN)],
        }
    }
}

impl SearchDefaults {
    #[must_use]
    pub fn with_sort(mut self, sort: Vec<SortOption>) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }
}

/// Search request with every default resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSearchParams<X = ()> {
    pub page: u64,
    pub limit: u64,
    pub q: Option<String>,
    pub sort: Vec<SortOption>,
    pub filters: Vec<FilterOption>,
    pub extras: X,
    pub passthrough: Vec<(String, String)>,
}

impl<X: SearchExtras> SearchParams<X> {
    /// Resolve defaults. Out-of-range or missing values fall back silently; a `limit`
    /// above the maximum takes the default limit, it is not clamped.
    #[must_use]
    pub fn normalize(self, defaults: &SearchDefaults) -> NormalizedSearchParams<X> {
        self.normalize_with(defaults, X::normalize)
    }

    /// Same as [`SearchParams::normalize`] with a caller-supplied extras normalizer.
    pub fn normalize_with<F>(self, defaults: &SearchDefaults, extra: F) -> NormalizedSearchParams<X>
    where
        F: FnOnce(X) -> X,
    {
        let page = self
            .page
            .and_then(|page| u64::try_from(page).ok())
            .filter(|page| *page > 0)
            .unwrap_or(defaults.page);

        let limit = self
            .limit
            .and_then(|limit| u64::try_from(limit).ok())
            .filter(|limit| (1..=defaults.max_limit).contains(limit))
            .unwrap_or(defaults.limit);

        let sort = if self.sort.is_empty() {
            defaults.sort.clone()
        } else {
            self.sort
        };

        NormalizedSearchParams {
            page,
            limit,
            q: self.q.filter(|q| !q.trim().is_empty()),
            sort,
            filters: self.filters,
            extras: extra(self.extras),
            passthrough: self.passthrough,
        }
    }
}

impl<X> From<NormalizedSearchParams<X>> for SearchParams<X> {
    fn from(params: NormalizedSearchParams<X>) -> Self {
        Self {
            page: Some(i64::try_from(params.page).unwrap_or(i64::MAX)),
            limit: Some(i64::try_from(params.limit).unwrap_or(i64::MAX)),
            q: params.q,
            sort: params.sort,
            filters: params.filters,
            extras: params.extras,
            passthrough: params.passthrough,
        }
    }
}

//! # Query-string codec
//!
//! Two-way translation between a URL query string and [`SearchParams`].
//!
//! ```text
//! page=2&limit=5&q=phone
//! sort[sell_price]=desc&sort[name]=asc
//! filter[status]=active                      shorthand for filter[status][value]
//! filter[labels][operator]=in
//! filter[labels][value]=l1,l2
//! filter[status][notOp]=eq
//! ```
//!
//! Decoding is total: unknown keys are kept in [`SearchParams::passthrough`] and
//! malformed entries are dropped. Encoding emits keys in a fixed order (page, limit,
//! q, sort, filters, extension keys, passthrough) so that decode-then-encode is stable.

use url::form_urlencoded;

use crate::models::{
    FilterNotOperator, FilterOperator, FilterOption, SearchExtras, SearchParams, SortDirection,
    SortOption,
};

const PAGE_KEY: &str = "page";
const LIMIT_KEY: &str = "limit";
const QUERY_KEY: &str = "q";
const SORT_PREFIX: &str = "sort";
const FILTER_PREFIX: &str = "filter";

const VALUE_PART: &str = "value";
const OPERATOR_PART: &str = "operator";
const NOT_OPERATOR_PART: &str = "notOp";

/// Split `prefix[field]` or `prefix[field][part]`.
///
/// Returns `None` when the key does not follow that shape, including an empty field
/// or a field containing a bracket.
fn split_bracketed<'a>(key: &'a str, prefix: &str) -> Option<(&'a str, Option<&'a str>)> {
    let rest = key.strip_prefix(prefix)?.strip_prefix('[')?;
    let close = rest.find(']')?;
    let field = &rest[..close];
    if field.is_empty() || field.contains('[') {
        return None;
    }

    let tail = &rest[close + 1..];
    if tail.is_empty() {
        return Some((field, None));
    }

    let part = tail.strip_prefix('[')?.strip_suffix(']')?;
    if part.is_empty() || part.contains(['[', ']']) {
        return None;
    }
    Some((field, Some(part)))
}

fn parse_integer(key: &str, value: &str) -> Option<i64> {
    match value.trim().parse() {
        Ok(number) => Some(number),
        Err(_) => {
            tracing::trace!(key, value, "ignoring non-integer pagination value");
            None
        }
    }
}

/// Filter entry being assembled from its parts, in first-seen order.
#[derive(Debug)]
struct FilterDraft {
    field: String,
    value: Option<String>,
    operator: Option<FilterOperator>,
    not_op: Option<FilterNotOperator>,
    malformed: bool,
}

impl FilterDraft {
    fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            value: None,
            operator: None,
            not_op: None,
            malformed: false,
        }
    }

    /// Whether `part` is one of `value`, `operator` or `notOp` (a bare key means `value`).
    fn knows(part: Option<&str>) -> bool {
        matches!(
            part.unwrap_or(VALUE_PART),
            VALUE_PART | OPERATOR_PART | NOT_OPERATOR_PART
        )
    }

    /// Record one known part.
    fn set(&mut self, part: Option<&str>, raw: &str) {
        match part.unwrap_or(VALUE_PART) {
            VALUE_PART => self.value = Some(raw.to_string()),
            OPERATOR_PART if raw.is_empty() => self.operator = None,
            OPERATOR_PART => match FilterOperator::parse(raw) {
                Some(operator) => self.operator = Some(operator),
                None => {
                    tracing::trace!(field = %self.field, operator = raw, "unknown filter operator");
                    self.malformed = true;
                }
            },
            NOT_OPERATOR_PART if raw.is_empty() => self.not_op = None,
            NOT_OPERATOR_PART => match FilterNotOperator::parse(raw) {
                Some(not_op) => self.not_op = Some(not_op),
                None => {
                    tracing::trace!(field = %self.field, not_op = raw, "unknown negated operator");
                    self.malformed = true;
                }
            },
            _ => {}
        }
    }

    fn finish(self) -> Option<FilterOption> {
        if self.malformed {
            return None;
        }
        match self.value {
            Some(value) if !value.is_empty() => Some(FilterOption {
                field: self.field,
                value,
                operator: self.operator,
                not_op: self.not_op,
            }),
            _ => {
                tracing::trace!(field = %self.field, "dropping filter without a value");
                None
            }
        }
    }
}

/// Decode a query string (with or without the leading `?`).
#[must_use]
pub fn decode<X: SearchExtras>(query: &str) -> SearchParams<X> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = SearchParams::<X>::default();
    let mut drafts: Vec<FilterDraft> = Vec::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            PAGE_KEY => params.page = parse_integer(PAGE_KEY, &value),
            LIMIT_KEY => params.limit = parse_integer(LIMIT_KEY, &value),
            QUERY_KEY => params.q = Some(value.into_owned()),
            other => {
                if let Some((field, None)) = split_bracketed(other, SORT_PREFIX) {
                    match SortDirection::parse(&value) {
                        Some(direction) => params.sort.push(SortOption {
                            field: field.to_string(),
                            direction,
                        }),
                        None => tracing::trace!(field, direction = %value, "unknown sort direction"),
                    }
                    continue;
                }

                if let Some((field, part)) = split_bracketed(other, FILTER_PREFIX)
                    .filter(|(_, part)| FilterDraft::knows(*part))
                {
                    let index = match drafts.iter().position(|draft| draft.field == field) {
                        Some(index) => index,
                        None => {
                            drafts.push(FilterDraft::new(field));
                            drafts.len() - 1
                        }
                    };
                    drafts[index].set(part, &value);
                    continue;
                }

                if !params.extras.accept(other, &value) {
                    params
                        .passthrough
                        .push((other.to_string(), value.into_owned()));
                }
            }
        }
    }

    params.filters = drafts.into_iter().filter_map(FilterDraft::finish).collect();
    params
}

/// Encode parameters into a query string without the leading `?`.
///
/// A page or limit of zero and an empty `q` are omitted.
#[must_use]
pub fn encode<X: SearchExtras>(params: &SearchParams<X>) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());

    if let Some(page) = params.page.filter(|page| *page != 0) {
        out.append_pair(PAGE_KEY, &page.to_string());
    }
    if let Some(limit) = params.limit.filter(|limit| *limit != 0) {
        out.append_pair(LIMIT_KEY, &limit.to_string());
    }
    if let Some(q) = params.q.as_deref().filter(|q| !q.is_empty()) {
        out.append_pair(QUERY_KEY, q);
    }

    for sort in &params.sort {
        out.append_pair(
            &format!("{SORT_PREFIX}[{}]", sort.field),
            sort.direction.as_str(),
        );
    }

    for filter in &params.filters {
        let field = &filter.field;
        if !filter.value.is_empty() {
            out.append_pair(&format!("{FILTER_PREFIX}[{field}][{VALUE_PART}]"), &filter.value);
        }
        if let Some(operator) = filter.operator {
            out.append_pair(
                &format!("{FILTER_PREFIX}[{field}][{OPERATOR_PART}]"),
                operator.as_str(),
            );
        }
        if let Some(not_op) = filter.not_op {
            out.append_pair(
                &format!("{FILTER_PREFIX}[{field}][{NOT_OPERATOR_PART}]"),
                not_op.as_str(),
            );
        }
    }

    let mut extra_pairs = Vec::new();
    params.extras.encode(&mut extra_pairs);
    out.extend_pairs(extra_pairs.iter());
    out.extend_pairs(params.passthrough.iter());

    out.finish()
}

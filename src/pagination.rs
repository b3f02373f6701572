//! Response envelope for list endpoints.

use serde::{Deserialize, Serialize, Serializer, ser::Error as _};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Largest offset the SQL drivers accept; they bind it as a signed 64-bit integer.
const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Row offset of the first item on `page` (1-based), capped at `i64::MAX`.
#[must_use]
pub const fn page_offset(page: u64, limit: u64) -> u64 {
    let offset = page.saturating_sub(1).saturating_mul(limit);
    if offset > MAX_OFFSET { MAX_OFFSET } else { offset }
}

/// Inclusive zero-based row range `[start, end]` covered by `page`.
#[must_use]
pub const fn page_range(page: u64, limit: u64) -> (u64, u64) {
    let start = page_offset(page, limit);
    (start, start.saturating_add(limit.saturating_sub(1)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    /// `ceil(total_items / page_size)`, zero when there are no items
    pub total_pages: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_items.div_ceil(page_size)
        };
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    /// Wrap one page of rows. `page` and `limit` are echoed as given; `total` is the
    /// unpaginated count.
    #[must_use]
    pub fn assemble(rows: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        Self {
            data: rows,
            pagination: Pagination::new(page, limit, total),
        }
    }
}

/// A listed row, optionally carrying its related collection under the relation field
/// name.
///
/// Serializes as the row's own JSON object with one extra key, e.g.
/// `{"id": "p1", "name": "Phone", "labels": [{"id": "l1", "name": "Sale"}]}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Listed<M> {
    pub item: M,
    pub relation: Option<&'static str>,
    pub related: Vec<JsonValue>,
}

impl<M> Listed<M> {
    #[must_use]
    pub fn plain(item: M) -> Self {
        Self {
            item,
            relation: None,
            related: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_related(item: M, relation: &'static str, related: Vec<JsonValue>) -> Self {
        Self {
            item,
            relation: Some(relation),
            related,
        }
    }
}

impl<M: Serialize> Serialize for Listed<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = serde_json::to_value(&self.item).map_err(S::Error::custom)?;
        if let Some(field) = self.relation {
            match value.as_object_mut() {
                Some(object) => {
                    object.insert(field.to_string(), JsonValue::Array(self.related.clone()));
                }
                None => return Err(S::Error::custom("listed item must serialize to an object")),
            }
        }
        value.serialize(serializer)
    }
}

use crate::models::FilterOption;

/// Filters partitioned by how the compiler applies them.
///
/// Each filter lands in exactly one bucket; original order is kept inside a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterBuckets<'a> {
    /// Filters on the relation field (e.g. `labels`)
    pub relation: Vec<&'a FilterOption>,
    /// `fts`, `plfts` and `phfts` filters
    pub fulltext: Vec<&'a FilterOption>,
    /// Filters carrying only a negated operator
    pub not_only: Vec<&'a FilterOption>,
    /// Everything else
    pub base: Vec<&'a FilterOption>,
}

impl FilterBuckets<'_> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.relation.len() + self.fulltext.len() + self.not_only.len() + self.base.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn has_relation_filters(&self) -> bool {
        !self.relation.is_empty()
    }
}

/// Partition filters. Checked in order: relation field, full-text operator,
/// negation only, base.
#[must_use]
pub fn bucketize<'a>(filters: &'a [FilterOption], relation_field: Option<&str>) -> FilterBuckets<'a> {
    let mut buckets = FilterBuckets::default();
    for filter in filters {
        if relation_field == Some(filter.field.as_str()) {
            buckets.relation.push(filter);
        } else if filter.operator.is_some_and(|op| op.is_fulltext()) {
            buckets.fulltext.push(filter);
        } else if filter.operator.is_none() && filter.not_op.is_some() {
            buckets.not_only.push(filter);
        } else {
            buckets.base.push(filter);
        }
    }
    buckets
}

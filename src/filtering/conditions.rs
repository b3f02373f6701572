use sea_orm::{
    DatabaseBackend,
    sea_query::{Alias, ColumnRef, Condition, Expr, Func, IntoColumnRef, SimpleExpr},
    EntityTrait, QueryFilter, Select,
};

use super::search::{TextSearchMode, build_fulltext_condition};
use super::value::FilterValue;
use crate::models::{FilterNotOperator, FilterOperator, FilterOption};

/// `entity.field`, qualified so it stays unambiguous once a join table is present.
pub(crate) fn base_column<E: EntityTrait>(field: &str) -> ColumnRef {
    (E::default(), Alias::new(field)).into_column_ref()
}

/// `UPPER(column) LIKE '%VALUE%'`. Wildcards in `value` are not escaped.
pub(crate) fn build_like_condition(column: &ColumnRef, value: &str) -> SimpleExpr {
    Expr::expr(Func::upper(Expr::col(column.clone()))).like(format!("%{}%", value.to_uppercase()))
}

/// Everything a predicate needs besides the column and value.
#[derive(Debug, Clone, Copy)]
pub struct PredicateContext<'a> {
    pub backend: DatabaseBackend,
    pub language: &'a str,
}

/// Map one operator to a predicate on `column`.
#[must_use]
pub fn predicate(
    operator: FilterOperator,
    column: &ColumnRef,
    value: &FilterValue,
    context: PredicateContext<'_>,
) -> Condition {
    let col = || Expr::col(column.clone());
    let expr = match operator {
        FilterOperator::Eq => col().eq(value.to_value()),
        FilterOperator::Neq => col().ne(value.to_value()),
        FilterOperator::Lt => col().lt(value.to_value()),
        FilterOperator::Lte => col().lte(value.to_value()),
        FilterOperator::Gt => col().gt(value.to_value()),
        FilterOperator::Gte => col().gte(value.to_value()),
        FilterOperator::Like | FilterOperator::Ilike => build_like_condition(column, &value.as_text()),
        FilterOperator::In => col().is_in(value.to_values()),
        FilterOperator::Is => match value {
            FilterValue::Null => col().is_null(),
            FilterValue::Bool(flag) => col().is(*flag),
            other => col().is(other.to_value()),
        },
        FilterOperator::Fts => {
            return build_fulltext_condition(TextSearchMode::WebSearch, column, &value.as_text(), context);
        }
        FilterOperator::Plfts => {
            return build_fulltext_condition(TextSearchMode::Plain, column, &value.as_text(), context);
        }
        FilterOperator::Phfts => {
            return build_fulltext_condition(TextSearchMode::Phrase, column, &value.as_text(), context);
        }
    };
    Condition::all().add(expr)
}

/// `NOT (column <op> value)`.
#[must_use]
pub fn negated(
    not_op: FilterNotOperator,
    column: &ColumnRef,
    value: &FilterValue,
    context: PredicateContext<'_>,
) -> Condition {
    predicate(not_op.as_operator(), column, value, context).not()
}

/// Apply a filter's positive operator (defaulting to `eq`) and then its negated
/// operator, if any, against `column`.
#[must_use]
pub fn apply_filter<E: EntityTrait>(
    select: Select<E>,
    filter: &FilterOption,
    column: &ColumnRef,
    context: PredicateContext<'_>,
) -> Select<E> {
    let operator = filter.operator.unwrap_or(FilterOperator::Eq);
    let value = FilterValue::coerce(&filter.value, operator);
    let select = select.filter(predicate(operator, column, &value, context));
    apply_negation(select, filter, column, context)
}

/// Apply only the negated operator of a filter.
#[must_use]
pub fn apply_negation<E: EntityTrait>(
    select: Select<E>,
    filter: &FilterOption,
    column: &ColumnRef,
    context: PredicateContext<'_>,
) -> Select<E> {
    match filter.not_op {
        Some(not_op) => {
            let value = FilterValue::coerce(&filter.value, not_op.as_operator());
            select.filter(negated(not_op, column, &value, context))
        }
        None => select,
    }
}

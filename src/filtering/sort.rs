use sea_orm::{EntityTrait, QueryOrder, Select, sea_query::{Order, SimpleExpr}};

use super::conditions::base_column;
use crate::models::{SortDirection, SortOption};

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// Order by each key in turn. Entries with an empty field are skipped.
#[must_use]
pub fn apply_sorting<E: EntityTrait>(select: Select<E>, sort: &[SortOption]) -> Select<E> {
    sort.iter()
        .filter(|option| !option.field.is_empty())
        .fold(select, |select, option| {
            select.order_by(
                SimpleExpr::Column(base_column::<E>(&option.field)),
                option.direction.into(),
            )
        })
}

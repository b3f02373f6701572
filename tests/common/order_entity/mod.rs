use chrono::{DateTime, Utc};
use listcrate::filtering::RelationConfig;
use listcrate::models::literal_choice;
use listcrate::{ListResource, SearchDefaults, SearchExtras, SortOption, async_trait};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const ORDER_STATUSES: [&str; 7] = [
    "draft",
    "wait_for_confirmation",
    "in_processing",
    "in_delivery",
    "completed",
    "canceled",
    "canceled_by_customer",
];

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub order_code: String,
    pub status: String,
    pub amount_payable: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// `status=<order status>` next to the generic grammar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderExtras {
    pub status: Option<String>,
}

impl SearchExtras for OrderExtras {
    fn accept(&mut self, key: &str, value: &str) -> bool {
        if key == "status" {
            self.status = Some(value.to_string());
            return true;
        }
        false
    }

    fn normalize(self) -> Self {
        Self {
            status: literal_choice(self.status, &ORDER_STATUSES),
        }
    }

    fn encode(&self, pairs: &mut Vec<(String, String)>) {
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }
    }

    fn conditions(&self) -> Vec<(&'static str, String)> {
        self.status
            .iter()
            .map(|status| ("status", status.clone()))
            .collect()
    }
}

pub struct Orders;

#[async_trait]
impl ListResource for Orders {
    type EntityType = Entity;
    type Model = Model;
    type Extras = OrderExtras;

    const RESOURCE_NAME_PLURAL: &'static str = "orders";

    fn relation() -> Option<RelationConfig> {
        Some(RelationConfig::new(
            "labels",
            "orders_labels",
            "order_id",
            "label_id",
        )
        .with_related_table("labels", "id"))
    }

    fn search_columns() -> Vec<&'static str> {
        vec!["name", "order_code"]
    }

    fn defaults() -> SearchDefaults {
        SearchDefaults::default().with_sort(vec![SortOption::asc("order_code")])
    }
}

use chrono::{DateTime, Utc};
use listcrate::filtering::RelationConfig;
use listcrate::{ListResource, async_trait};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub product_code: String,
    pub status: String,
    pub sell_price: i32,
    pub is_featured: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub struct Products;

#[async_trait]
impl ListResource for Products {
    type EntityType = Entity;
    type Model = Model;
    type Extras = ();

    const RESOURCE_NAME_PLURAL: &'static str = "products";

    fn relation() -> Option<RelationConfig> {
        Some(RelationConfig::new(
            "labels",
            "products_labels",
            "product_id",
            "label_id",
        )
        .with_related_table("labels", "id"))
    }

    fn search_columns() -> Vec<&'static str> {
        vec!["name", "product_code"]
    }
}

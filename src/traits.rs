use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, ModelTrait, Select};
use serde::Serialize;

use crate::errors::QueryError;
use crate::filtering::{RelationConfig, SearchConfig, attach_related, compile_and_run};
use crate::models::{SearchDefaults, SearchExtras, SearchParams};
use crate::pagination::{Listed, PaginatedResponse};

/// An entity exposed through a paginated, searchable list endpoint.
///
/// Implementors pick the entity, its relation and its free-text columns; [`list`] does
/// the rest.
///
/// [`list`]: ListResource::list
#[async_trait]
pub trait ListResource: Send + Sync + 'static {
    type EntityType: EntityTrait<Model = Self::Model> + Sync;
    type Model: FromQueryResult + ModelTrait<Entity = Self::EntityType> + Serialize + Send + Sync;
    type Extras: SearchExtras;

    const RESOURCE_NAME_PLURAL: &'static str;
    /// Text-search configuration used by the `PostgreSQL` full-text operators
    const FULLTEXT_LANGUAGE: &'static str = "english";

    /// Query the list starts from. Override to scope rows, e.g. by tenant.
    fn base_query() -> Select<Self::EntityType> {
        Self::EntityType::find()
    }

    fn relation() -> Option<RelationConfig> {
        None
    }

    /// Columns searched by the free-text `q` parameter.
    fn search_columns() -> Vec<&'static str> {
        Vec::new()
    }

    fn defaults() -> SearchDefaults {
        SearchDefaults::default()
    }

    async fn list(
        db: &DatabaseConnection,
        params: SearchParams<Self::Extras>,
    ) -> Result<PaginatedResponse<Listed<Self::Model>>, QueryError> {
        let params = params.normalize(&Self::defaults());
        let relation = Self::relation();
        let search_columns = Self::search_columns();
        let config = SearchConfig {
            resource: Self::RESOURCE_NAME_PLURAL,
            relation: relation.as_ref(),
            search_columns: &search_columns,
            language: Self::FULLTEXT_LANGUAGE,
            backend: db.get_database_backend(),
        };

        let (rows, total) = compile_and_run(db, Self::base_query(), &params, &config).await?;

        let data = match relation.as_ref() {
            Some(relation) => {
                attach_related::<Self::EntityType, _>(db, relation, rows, Self::RESOURCE_NAME_PLURAL)
                    .await?
            }
            None => rows.into_iter().map(Listed::plain).collect(),
        };

        tracing::debug!(
            resource = Self::RESOURCE_NAME_PLURAL,
            returned = data.len(),
            total,
            "Listed resources"
        );

        Ok(PaginatedResponse::assemble(data, total, params.page, params.limit))
    }
}

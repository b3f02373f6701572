use std::convert::Infallible;

use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use sea_orm::DatabaseConnection;

use crate::codec::decode;
use crate::errors::ApiError;
use crate::models::{SearchExtras, SearchParams};
use crate::pagination::{Listed, PaginatedResponse};
use crate::traits::ListResource;

/// Extracts [`SearchParams`] from the request's query string. Never rejects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchQuery<X = ()>(pub SearchParams<X>);

impl<S, X> FromRequestParts<S> for SearchQuery<X>
where
    S: Send + Sync,
    X: SearchExtras,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(decode(parts.uri.query().unwrap_or_default())))
    }
}

/// `GET` handler for a [`ListResource`].
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/products", get(list_handler::<Products>))
///     .with_state(db);
/// ```
pub async fn list_handler<T: ListResource>(
    State(db): State<DatabaseConnection>,
    SearchQuery(params): SearchQuery<T::Extras>,
) -> Result<Json<PaginatedResponse<Listed<T::Model>>>, ApiError> {
    Ok(Json(T::list(&db, params).await?))
}

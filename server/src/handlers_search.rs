use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query, State};
use axum::Json;
use geonear_core::{Paginator, ProximitySearch};
use tokio::task;

use crate::auth::Requester;
use crate::errors::{map_query_rejection, map_search_error, ApiError};
use crate::handler_utils::{nearby_user, validate_search_query};
use crate::models::{SearchQuery, SearchResponse};
use crate::state::AppState;

/// `GET /users`: other users strictly within `distance` km of the requester,
/// nearest first.
pub(crate) async fn search_nearby(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let owner_id = requester.require_user()?;
    let Query(query) = query.map_err(map_query_rejection)?;
    let request = validate_search_query(&query, &state.config, owner_id)?;

    let search = ProximitySearch::new(
        state.directory.clone(),
        Paginator::new(state.config.max_page_size),
    );
    let page = task::spawn_blocking(move || search.search(request))
        .await
        .map_err(|_| ApiError::internal("search worker task failed"))?
        .map_err(map_search_error)?;

    tracing::debug!(
        owner_id,
        distance_km = request.distance_km,
        page = page.page,
        size = page.size,
        total = page.total,
        returned = page.results.len(),
        "proximity search completed"
    );

    Ok(Json(SearchResponse {
        total: page.total,
        page: page.page,
        size: page.size,
        results: page.results.into_iter().map(nearby_user).collect(),
    }))
}

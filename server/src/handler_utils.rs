use geonear_core::{OwnerId, ScoredResult, SearchRequest, UserRecord};

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::models::{
    NearbyUser, SearchQuery, DEFAULT_DISTANCE_KM, DEFAULT_PAGE, DEFAULT_PAGE_LIMIT,
};

/// Applies defaults and rejects out-of-range parameters before the search runs.
pub(crate) fn validate_search_query(
    query: &SearchQuery,
    config: &AppConfig,
    owner_id: OwnerId,
) -> Result<SearchRequest, ApiError> {
    let page = query.page.unwrap_or(DEFAULT_PAGE);
    if page < 1 {
        return Err(ApiError::invalid_argument("page must be >= 1"));
    }

    let max_page_size = config.max_page_size;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if limit < 1 || usize::try_from(limit).map_or(true, |limit| limit > max_page_size) {
        return Err(ApiError::invalid_argument(format!(
            "limit must be between 1 and {max_page_size}"
        )));
    }

    let max_distance_km = config.max_distance_km;
    let distance = query.distance.unwrap_or(DEFAULT_DISTANCE_KM);
    if u64::try_from(distance).map_or(true, |distance| distance > max_distance_km) {
        return Err(ApiError::invalid_argument(format!(
            "distance must be between 0 and {max_distance_km}"
        )));
    }

    Ok(SearchRequest {
        owner_id,
        page: page as u64,
        limit: limit as usize,
        distance_km: distance as f64,
    })
}

pub(crate) fn nearby_user(hit: ScoredResult<UserRecord>) -> NearbyUser {
    NearbyUser {
        user: hit.item.into(),
        distance: hit.distance_km,
    }
}

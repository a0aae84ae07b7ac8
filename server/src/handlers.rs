use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use geonear_core::{OwnerId, Profile, WalRecord};

use crate::auth::Requester;
use crate::errors::{map_directory_error, map_json_rejection, map_store_error, ApiError};
pub(crate) use crate::handlers_health::{live, ready};
pub(crate) use crate::handlers_search::search_nearby;
use crate::models::{LocationResponse, RegisterUserRequest, UpdateLocationRequest, UserResponse};
use crate::persistence::commit_change;
use crate::state::AppState;

pub(crate) async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(payload) = payload.map_err(map_json_rejection)?;

    let user = commit_change(&state, |directory| {
        let user = directory
            .register_user(payload.id, payload.username, payload.email, payload.is_active)
            .map_err(map_directory_error)?;
        let record = WalRecord::RegisterUser {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
        };
        Ok((record, UserResponse::from(user)))
    })
    .await?;

    tracing::info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub(crate) async fn get_user(
    Path(id): Path<OwnerId>,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let directory = state.directory.read().map_err(map_store_error)?;
    let user = directory
        .get_user(id)
        .ok_or_else(|| ApiError::not_found(format!("user {id} not found")))?;
    Ok(Json(UserResponse::from(user)))
}

pub(crate) async fn update_profile(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<Profile>, JsonRejection>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let user_id = requester.require_user()?;
    let Json(profile) = payload.map_err(map_json_rejection)?;

    let profile = commit_change(&state, |directory| {
        let profile = directory
            .update_profile(user_id, profile)
            .map_err(map_directory_error)?
            .clone();
        let record = WalRecord::UpdateProfile {
            id: user_id,
            profile: profile.clone(),
        };
        Ok((record, profile))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

pub(crate) async fn update_location(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<UpdateLocationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LocationResponse>), ApiError> {
    let user_id = requester.require_user()?;
    let Json(payload) = payload.map_err(map_json_rejection)?;

    let response = commit_change(&state, |directory| {
        let (point, created) = directory
            .update_location(user_id, payload.latitude, payload.longitude)
            .map_err(map_directory_error)?;
        let record = WalRecord::UpdateLocation {
            id: user_id,
            latitude: point.latitude,
            longitude: point.longitude,
        };
        Ok((
            record,
            LocationResponse {
                latitude: point.latitude,
                longitude: point.longitude,
                created,
            },
        ))
    })
    .await?;

    tracing::debug!(
        user_id,
        latitude = response.latitude,
        longitude = response.longitude,
        created = response.created,
        "location updated"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

pub(crate) async fn clear_location(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> Result<StatusCode, ApiError> {
    let user_id = requester.require_user()?;

    commit_change(&state, |directory| {
        directory
            .clear_location(user_id)
            .map_err(map_directory_error)?;
        Ok((WalRecord::ClearLocation { id: user_id }, ()))
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn remove_user(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> Result<StatusCode, ApiError> {
    let user_id = requester.require_user()?;

    commit_change(&state, |directory| {
        directory
            .remove_user(user_id)
            .ok_or_else(|| ApiError::not_found(format!("user {user_id} not found")))?;
        Ok((WalRecord::RemoveUser { id: user_id }, ()))
    })
    .await?;

    tracing::info!(user_id, "user removed");
    Ok(StatusCode::NO_CONTENT)
}

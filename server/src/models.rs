use geonear_core::{OwnerId, Profile, UserRecord};
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_PAGE: i64 = 1;
pub(crate) const DEFAULT_PAGE_LIMIT: i64 = 100;
pub(crate) const DEFAULT_DISTANCE_KM: i64 = 100;

#[derive(Debug, Serialize)]
pub(crate) struct LiveResponse {
    pub(crate) status: &'static str,
    pub(crate) uptime_ms: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReadyChecks {
    pub(crate) engine_loaded: bool,
    pub(crate) storage_available: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReadyResponse {
    pub(crate) status: &'static str,
    pub(crate) uptime_ms: u64,
    pub(crate) checks: ReadyChecks,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterUserRequest {
    pub(crate) id: OwnerId,
    pub(crate) username: String,
    pub(crate) email: String,
    #[serde(default = "default_active")]
    pub(crate) is_active: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: OwnerId,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) is_active: bool,
    pub(crate) profile: Profile,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
            profile: user.profile.clone(),
        }
    }
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            profile: user.profile,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateLocationRequest {
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct LocationResponse {
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) created: bool,
}

/// Raw query parameters of `GET /users`; signed so that negative values reach
/// validation instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    pub(crate) page: Option<i64>,
    pub(crate) limit: Option<i64>,
    /// Whole kilometres.
    pub(crate) distance: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NearbyUser {
    #[serde(flatten)]
    pub(crate) user: UserResponse,
    /// Great-circle distance from the requester in kilometres.
    pub(crate) distance: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchResponse {
    pub(crate) total: usize,
    pub(crate) page: u64,
    pub(crate) size: usize,
    pub(crate) results: Vec<NearbyUser>,
}

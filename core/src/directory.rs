use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geo::{GeoError, GeoPoint, OwnerId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Serialized as an ISO-8601 calendar date (`YYYY-MM-DD`).
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: OwnerId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryError {
    UserExists(OwnerId),
    UserNotFound(OwnerId),
    InvalidUsername,
    InvalidEmail,
    DuplicateUsername(String),
    DuplicateEmail(String),
    Location(GeoError),
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserExists(id) => write!(f, "user {id} already exists"),
            Self::UserNotFound(id) => write!(f, "user {id} not found"),
            Self::InvalidUsername => write!(f, "username must not be empty"),
            Self::InvalidEmail => write!(f, "email must contain a single '@'"),
            Self::DuplicateUsername(name) => write!(f, "username '{name}' is already taken"),
            Self::DuplicateEmail(email) => write!(f, "email '{email}' is already registered"),
            Self::Location(error) => write!(f, "invalid location: {error}"),
        }
    }
}

impl Error for DirectoryError {}

impl From<GeoError> for DirectoryError {
    fn from(value: GeoError) -> Self {
        Self::Location(value)
    }
}

/// In-memory table of users, their profiles and their optional coordinate.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: BTreeMap<OwnerId, UserRecord>,
    usernames: BTreeMap<String, OwnerId>,
    /// Keyed by the ASCII-lowercased address.
    emails: BTreeMap<String, OwnerId>,
    mutation_version: u64,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn located_len(&self) -> usize {
        self.users
            .values()
            .filter(|user| user.location.is_some())
            .count()
    }

    /// Incremented once by every successful mutation. Persistence uses it
    /// as the WAL sequence.
    pub fn mutation_version(&self) -> u64 {
        self.mutation_version
    }

    pub(crate) fn restore_mutation_version(&mut self, version: u64) {
        self.mutation_version = version;
    }

    pub fn register_user(
        &mut self,
        id: OwnerId,
        username: impl Into<String>,
        email: impl Into<String>,
        is_active: bool,
    ) -> Result<&UserRecord, DirectoryError> {
        let username = username.into().trim().to_string();
        let email = email.into().trim().to_string();
        if self.users.contains_key(&id) {
            return Err(DirectoryError::UserExists(id));
        }
        validate_username(&username)?;
        validate_email(&email)?;
        self.check_unique(id, &username, &email)?;

        self.usernames.insert(username.clone(), id);
        self.emails.insert(email.to_ascii_lowercase(), id);
        self.bump_mutation_version();
        Ok(self.users.entry(id).or_insert(UserRecord {
            id,
            username,
            email,
            is_active,
            profile: Profile::default(),
            location: None,
        }))
    }

    pub fn get_user(&self, id: OwnerId) -> Option<&UserRecord> {
        self.users.get(&id)
    }

    pub fn get_location(&self, id: OwnerId) -> Option<&GeoPoint> {
        self.users.get(&id).and_then(|user| user.location.as_ref())
    }

    pub fn update_profile(
        &mut self,
        id: OwnerId,
        profile: Profile,
    ) -> Result<&Profile, DirectoryError> {
        let user = self
            .users
            .get_mut(&id)
            .ok_or(DirectoryError::UserNotFound(id))?;
        user.profile = profile;
        self.mutation_version = self.mutation_version.saturating_add(1);
        Ok(&user.profile)
    }

    /// Creates the user's coordinate on first call and mutates it in place
    /// afterwards. Returns the stored point and whether it was created.
    pub fn update_location(
        &mut self,
        id: OwnerId,
        latitude: f64,
        longitude: f64,
    ) -> Result<(GeoPoint, bool), DirectoryError> {
        let point = GeoPoint::new(id, latitude, longitude)?;
        let user = self
            .users
            .get_mut(&id)
            .ok_or(DirectoryError::UserNotFound(id))?;
        let created = match user.location.as_mut() {
            Some(existing) => {
                existing.latitude = point.latitude;
                existing.longitude = point.longitude;
                false
            }
            None => {
                user.location = Some(point);
                true
            }
        };
        self.mutation_version = self.mutation_version.saturating_add(1);
        Ok((point, created))
    }

    pub fn clear_location(&mut self, id: OwnerId) -> Result<Option<GeoPoint>, DirectoryError> {
        let user = self
            .users
            .get_mut(&id)
            .ok_or(DirectoryError::UserNotFound(id))?;
        let removed = user.location.take();
        self.mutation_version = self.mutation_version.saturating_add(1);
        Ok(removed)
    }

    pub fn remove_user(&mut self, id: OwnerId) -> Option<UserRecord> {
        let removed = self.users.remove(&id)?;
        self.usernames.remove(&removed.username);
        self.emails.remove(&removed.email.to_ascii_lowercase());
        self.bump_mutation_version();
        Some(removed)
    }

    pub fn iter_users(&self) -> impl Iterator<Item = &UserRecord> + '_ {
        self.users.values()
    }

    /// Located users with their coordinate, in ascending owner order.
    pub fn iter_located(&self) -> impl Iterator<Item = (&UserRecord, &GeoPoint)> + '_ {
        self.users
            .values()
            .filter_map(|user| user.location.as_ref().map(|point| (user, point)))
    }

    /// Restores a previously validated record, keeping the uniqueness rules.
    pub(crate) fn insert_record(&mut self, record: UserRecord) -> Result<(), DirectoryError> {
        if self.users.contains_key(&record.id) {
            return Err(DirectoryError::UserExists(record.id));
        }
        self.check_unique(record.id, &record.username, &record.email)?;
        self.usernames.insert(record.username.clone(), record.id);
        self.emails
            .insert(record.email.to_ascii_lowercase(), record.id);
        self.users.insert(record.id, record);
        self.bump_mutation_version();
        Ok(())
    }

    fn check_unique(&self, id: OwnerId, username: &str, email: &str) -> Result<(), DirectoryError> {
        if self.usernames.get(username).is_some_and(|owner| *owner != id) {
            return Err(DirectoryError::DuplicateUsername(username.to_string()));
        }
        if self
            .emails
            .get(&email.to_ascii_lowercase())
            .is_some_and(|owner| *owner != id)
        {
            return Err(DirectoryError::DuplicateEmail(email.to_string()));
        }
        Ok(())
    }

    fn bump_mutation_version(&mut self) {
        self.mutation_version = self.mutation_version.saturating_add(1);
    }
}

fn validate_username(username: &str) -> Result<(), DirectoryError> {
    if username.is_empty() {
        return Err(DirectoryError::InvalidUsername);
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), DirectoryError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DirectoryError::InvalidEmail);
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(DirectoryError::InvalidEmail);
    }
    Ok(())
}

use std::error::Error;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::directory::{DirectoryError, Profile, UserDirectory};
use crate::geo::OwnerId;

mod fsync;
mod snapshot;
mod wal;

use snapshot::{load_snapshot, write_snapshot};
use wal::{append_wal, replay_wal, truncate_wal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalRecord {
    RegisterUser {
        id: OwnerId,
        username: String,
        email: String,
        is_active: bool,
    },
    UpdateProfile {
        id: OwnerId,
        profile: Profile,
    },
    UpdateLocation {
        id: OwnerId,
        latitude: f64,
        longitude: f64,
    },
    ClearLocation {
        id: OwnerId,
    },
    RemoveUser {
        id: OwnerId,
    },
}

#[derive(Debug)]
pub enum PersistenceError {
    Io(std::io::Error),
    Serde(serde_json::Error),
    Directory(DirectoryError),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::Directory(error) => write!(f, "directory error: {error}"),
            Self::InvalidData(message) => write!(f, "invalid persistence data: {message}"),
        }
    }
}

impl Error for PersistenceError {}

impl From<std::io::Error> for PersistenceError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

impl From<DirectoryError> for PersistenceError {
    fn from(value: DirectoryError) -> Self {
        Self::Directory(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Checkpointed,
    WalOnly { reason: String },
}

/// Loads the snapshot (if any) and replays the write-ahead log on top of it.
pub fn load_directory(
    snapshot_path: &Path,
    wal_path: &Path,
) -> Result<UserDirectory, PersistenceError> {
    let mut directory = load_snapshot(snapshot_path)?;
    replay_wal(wal_path, &mut directory)?;
    Ok(directory)
}

/// Appends `record` to the WAL, then checkpoints `directory`.
///
/// `directory` must already contain the effect of `record`; its mutation
/// version becomes the WAL sequence of the record. A failed checkpoint
/// leaves the change durable in the WAL, and replay skips any record the
/// snapshot already covers.
pub fn persist_change(
    snapshot_path: &Path,
    wal_path: &Path,
    directory: &UserDirectory,
    record: &WalRecord,
) -> Result<PersistOutcome, PersistenceError> {
    append_wal(wal_path, directory.mutation_version(), record)?;

    match write_snapshot(snapshot_path, directory).and_then(|_| truncate_wal(wal_path)) {
        Ok(()) => Ok(PersistOutcome::Checkpointed),
        Err(error) => Ok(PersistOutcome::WalOnly {
            reason: error.to_string(),
        }),
    }
}

pub fn apply_wal_record(
    directory: &mut UserDirectory,
    record: &WalRecord,
) -> Result<(), PersistenceError> {
    match record {
        WalRecord::RegisterUser {
            id,
            username,
            email,
            is_active,
        } => {
            if let Some(existing) = directory.get_user(*id) {
                if existing.username == *username
                    && existing.email == *email
                    && existing.is_active == *is_active
                {
                    return Ok(());
                }
                return Err(PersistenceError::InvalidData(format!(
                    "user {id} already exists with different fields"
                )));
            }
            directory.register_user(*id, username.clone(), email.clone(), *is_active)?;
            Ok(())
        }
        WalRecord::UpdateProfile { id, profile } => {
            directory.update_profile(*id, profile.clone())?;
            Ok(())
        }
        WalRecord::UpdateLocation {
            id,
            latitude,
            longitude,
        } => {
            directory.update_location(*id, *latitude, *longitude)?;
            Ok(())
        }
        WalRecord::ClearLocation { id } => {
            directory.clear_location(*id)?;
            Ok(())
        }
        WalRecord::RemoveUser { id } => {
            let _ = directory.remove_user(*id);
            Ok(())
        }
    }
}

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::directory::{UserDirectory, UserRecord};
use crate::geo::GeoPoint;

use super::fsync::write_atomically;
use super::PersistenceError;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDocument {
    version: u32,
    /// Mutation version of the directory when the snapshot was taken.
    #[serde(default)]
    mutation_version: u64,
    users: Vec<UserRecord>,
}

pub(super) fn load_snapshot(path: &Path) -> Result<UserDirectory, PersistenceError> {
    if !path.exists() {
        return Ok(UserDirectory::new());
    }

    let raw = fs::read_to_string(path)?;
    let snapshot: SnapshotDocument = serde_json::from_str(&raw)?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(PersistenceError::InvalidData(format!(
            "unsupported snapshot version {}",
            snapshot.version
        )));
    }

    let mut directory = UserDirectory::new();
    for mut user in snapshot.users {
        if let Some(location) = user.location {
            if location.owner_id != user.id {
                return Err(PersistenceError::InvalidData(format!(
                    "location of user {} is owned by {}",
                    user.id, location.owner_id
                )));
            }
            let validated = GeoPoint::new(user.id, location.latitude, location.longitude)
                .map_err(|error| {
                    PersistenceError::InvalidData(format!(
                        "user {} has an invalid location: {error}",
                        user.id
                    ))
                })?;
            user.location = Some(validated);
        }
        let id = user.id;
        directory.insert_record(user).map_err(|error| {
            PersistenceError::InvalidData(format!("snapshot user {id} rejected: {error}"))
        })?;
    }
    directory.restore_mutation_version(snapshot.mutation_version);

    Ok(directory)
}

pub(super) fn write_snapshot(
    path: &Path,
    directory: &UserDirectory,
) -> Result<(), PersistenceError> {
    let snapshot = SnapshotDocument {
        version: SNAPSHOT_VERSION,
        mutation_version: directory.mutation_version(),
        users: directory.iter_users().cloned().collect(),
    };

    let bytes = serde_json::to_vec_pretty(&snapshot)?;
    write_atomically(path, &bytes)
}

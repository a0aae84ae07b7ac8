use std::sync::atomic::Ordering;

use geonear_core::{persist_change, PersistOutcome, UserDirectory, WalRecord};
use tokio::task;

use crate::errors::{map_store_error, ApiError};
use crate::state::AppState;

/// Applies one directory mutation, persists it, and publishes the result.
///
/// With persistence enabled `change` runs against a private copy of the
/// directory, and readers keep seeing the previous directory until the WAL
/// record is durable. Without persistence it runs in place under the write
/// lock. Writers are serialised either way.
pub(crate) async fn commit_change<T>(
    state: &AppState,
    change: impl FnOnce(&mut UserDirectory) -> Result<(WalRecord, T), ApiError>,
) -> Result<T, ApiError> {
    let _serial = state.write_serial.lock().await;

    if !state.config.persistence_enabled {
        let mut directory = state.directory.write().map_err(map_store_error)?;
        let (_, output) = change(&mut directory)?;
        return Ok(output);
    }

    let mut staged = state.directory.read().map_err(map_store_error)?.clone();
    let (record, output) = change(&mut staged)?;
    let staged = persist_staged(state, staged, record).await?;

    let mut directory = state.directory.write().map_err(|error| {
        state.engine_loaded.store(false, Ordering::Relaxed);
        tracing::error!(%error, "directory update failed after wal append");
        ApiError::internal("in-memory state update failed after wal append; restart required")
    })?;
    *directory = staged;

    Ok(output)
}

async fn persist_staged(
    state: &AppState,
    staged: UserDirectory,
    record: WalRecord,
) -> Result<UserDirectory, ApiError> {
    let snapshot_path = state.config.snapshot_path.clone();
    let wal_path = state.config.wal_path.clone();
    let persisted = task::spawn_blocking(move || {
        persist_change(&snapshot_path, &wal_path, &staged, &record).map(|outcome| (outcome, staged))
    })
    .await
    .map_err(|_| ApiError::internal("persistence worker task failed"))?;

    match persisted {
        Ok((PersistOutcome::Checkpointed, staged)) => {
            state.storage_available.store(true, Ordering::Relaxed);
            Ok(staged)
        }
        Ok((PersistOutcome::WalOnly { reason }, staged)) => {
            tracing::warn!(%reason, "checkpoint failed; change is durable in wal only");
            Ok(staged)
        }
        Err(error) => {
            state.storage_available.store(false, Ordering::Relaxed);
            tracing::error!(%error, "failed to append wal record");
            Err(ApiError::internal("failed to persist state"))
        }
    }
}

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::directory::UserDirectory;

use super::fsync::{ensure_parent_dir, truncate_file_synced};
use super::{apply_wal_record, PersistenceError, WalRecord};

/// One WAL line. `sequence` is the directory's mutation version once
/// `record` has been applied.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WalEntry<R = WalRecord> {
    pub(super) sequence: u64,
    pub(super) record: R,
}

pub(super) fn append_wal(
    path: &Path,
    sequence: u64,
    record: &WalRecord,
) -> Result<(), PersistenceError> {
    ensure_parent_dir(path)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut line = serde_json::to_vec(&WalEntry { sequence, record })?;
    line.push(b'\n');
    file.write_all(&line)?;
    file.flush()?;
    file.sync_data()?;
    Ok(())
}

pub(super) fn truncate_wal(path: &Path) -> Result<(), PersistenceError> {
    ensure_parent_dir(path)?;
    truncate_file_synced(path)
}

pub(super) fn replay_wal(
    path: &Path,
    directory: &mut UserDirectory,
) -> Result<(), PersistenceError> {
    if !path.exists() {
        return Ok(());
    }

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    let mut line_number = 0usize;

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        line_number += 1;

        let has_trailing_newline = line.ends_with('\n');
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let entry: WalEntry = match serde_json::from_str(trimmed) {
            Ok(entry) => entry,
            Err(error) => {
                // a torn final append is dropped, anything else is corruption
                let tolerate_tail = !has_trailing_newline
                    && matches!(error.classify(), serde_json::error::Category::Eof)
                    && reader
                        .fill_buf()
                        .map(|remaining| remaining.is_empty())
                        .unwrap_or(false);
                if tolerate_tail {
                    break;
                }
                return Err(PersistenceError::InvalidData(format!(
                    "invalid wal line {line_number}: {error}"
                )));
            }
        };

        // already folded into the snapshot by a checkpoint whose truncate failed
        if entry.sequence <= directory.mutation_version() {
            continue;
        }
        apply_wal_record(directory, &entry.record).map_err(|error| {
            PersistenceError::InvalidData(format!(
                "failed to apply wal line {line_number}: {error}"
            ))
        })?;
        directory.restore_mutation_version(entry.sequence);
    }

    Ok(())
}

use std::error::Error;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::directory::{UserDirectory, UserRecord};
use crate::geo::{GeoPoint, OwnerId};
use crate::pagination::PageWindow;
use crate::proximity::{scan_candidates, ProximityQuery, ScoredCandidate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not serve the read.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "point store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {}

/// One window of ordered candidates plus the count of every qualifying
/// candidate, taken from the same read.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSlice<T> {
    pub total: usize,
    pub hits: Vec<ScoredCandidate<T>>,
}

/// Storage capability consumed by the proximity search.
///
/// Implementations evaluate the [`ProximityQuery`] predicate themselves so
/// that the range filter and the exact distance filter can be pushed down.
pub trait PointStore {
    type Item;

    fn fetch_origin(&self, owner_id: OwnerId) -> Result<Option<GeoPoint>, StoreError>;

    fn fetch_candidates(
        &self,
        query: &ProximityQuery,
        window: PageWindow,
    ) -> Result<CandidateSlice<Self::Item>, StoreError>;
}

impl PointStore for UserDirectory {
    type Item = UserRecord;

    fn fetch_origin(&self, owner_id: OwnerId) -> Result<Option<GeoPoint>, StoreError> {
        Ok(self.get_location(owner_id).copied())
    }

    fn fetch_candidates(
        &self,
        query: &ProximityQuery,
        window: PageWindow,
    ) -> Result<CandidateSlice<UserRecord>, StoreError> {
        let scored = scan_candidates(
            query,
            self.iter_located().map(|(user, point)| (point, user)),
        );
        let total = scored.len();
        let hits = window
            .slice(scored)
            .into_iter()
            .map(|hit| ScoredCandidate {
                owner_id: hit.owner_id,
                distance_km: hit.distance_km,
                item: hit.item.clone(),
            })
            .collect();

        Ok(CandidateSlice { total, hits })
    }
}

/// Directory shared between request handlers behind a read/write lock.
#[derive(Debug, Clone, Default)]
pub struct SharedDirectory {
    inner: Arc<RwLock<UserDirectory>>,
}

impl SharedDirectory {
    pub fn new(directory: UserDirectory) -> Self {
        Self {
            inner: Arc::new(RwLock::new(directory)),
        }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, UserDirectory>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("directory lock poisoned".to_string()))
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, UserDirectory>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("directory lock poisoned".to_string()))
    }
}

impl PointStore for SharedDirectory {
    type Item = UserRecord;

    fn fetch_origin(&self, owner_id: OwnerId) -> Result<Option<GeoPoint>, StoreError> {
        self.read()?.fetch_origin(owner_id)
    }

    fn fetch_candidates(
        &self,
        query: &ProximityQuery,
        window: PageWindow,
    ) -> Result<CandidateSlice<UserRecord>, StoreError> {
        self.read()?.fetch_candidates(query, window)
    }
}

#[cfg(test)]
mod tests;

//! Proximity search facade.
//!
//! A search resolves the requester's stored coordinate, derives the bounding
//! box for the requested radius, and asks the [`PointStore`] for one page of
//! candidates ordered by ascending great-circle distance.

use std::error::Error;
use std::fmt;

use crate::geo::OwnerId;
use crate::pagination::{Page, PageRequest, Paginator};
use crate::proximity::{ProximityQuery, ScoredCandidate};
use crate::store::{PointStore, StoreError};

/// A candidate together with its distance from the search origin.
pub type ScoredResult<T> = ScoredCandidate<T>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The requesting owner has no stored coordinate.
    OriginNotSet(OwnerId),
    Storage(StoreError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OriginNotSet(_) => write!(f, "user doesn't have a location"),
            Self::Storage(error) => write!(f, "{error}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OriginNotSet(_) => None,
            Self::Storage(error) => Some(error),
        }
    }
}

impl From<StoreError> for SearchError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

/// Arguments of a single search invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest {
    pub owner_id: OwnerId,
    pub page: u64,
    pub limit: usize,
    pub distance_km: f64,
}

pub struct ProximitySearch<S> {
    store: S,
    paginator: Paginator,
}

impl<S: PointStore> ProximitySearch<S> {
    pub fn new(store: S, paginator: Paginator) -> Self {
        Self { store, paginator }
    }

    /// Returns the requested page of owners strictly closer than
    /// `distance_km` to `owner_id`, nearest first.
    pub fn search(
        &self,
        request: SearchRequest,
    ) -> Result<Page<ScoredResult<S::Item>>, SearchError> {
        let origin = self
            .store
            .fetch_origin(request.owner_id)?
            .ok_or(SearchError::OriginNotSet(request.owner_id))?;

        let distance_km = if request.distance_km.is_finite() {
            request.distance_km.max(0.0)
        } else {
            0.0
        };
        let query = ProximityQuery::around(origin, distance_km);
        let window = self
            .paginator
            .window(PageRequest::new(request.page, request.limit));
        let slice = self.store.fetch_candidates(&query, window)?;

        Ok(Page {
            total: slice.total,
            page: window.page,
            size: window.size,
            results: slice.hits,
        })
    }
}

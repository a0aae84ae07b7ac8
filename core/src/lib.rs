#![forbid(unsafe_code)]
//! Core primitives for geonear.
//!
//! Great-circle geometry, the in-memory user directory, and the proximity
//! search pipeline shared by the server and benchmark crates.

pub mod directory;
pub mod geo;
pub mod pagination;
pub mod persistence;
pub mod proximity;
pub mod search;
pub mod store;

pub use directory::{DirectoryError, Profile, UserDirectory, UserRecord};
pub use geo::{
    calculate_bounding_box, haversine_distance_km, BoundingBox, GeoError, GeoPoint, OwnerId,
    EARTH_RADIUS_KM,
};
pub use pagination::{Page, PageRequest, PageWindow, Paginator, MAX_PAGE};
pub use persistence::{
    apply_wal_record, load_directory, persist_change, PersistOutcome, PersistenceError, WalRecord,
};
pub use proximity::{scan_candidates, ProximityQuery, ScoredCandidate};
pub use search::{ProximitySearch, ScoredResult, SearchError, SearchRequest};
pub use store::{CandidateSlice, PointStore, SharedDirectory, StoreError};

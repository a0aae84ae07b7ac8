use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::env_utils::parse_bool_env;

#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub(crate) bind: SocketAddr,
    pub(crate) max_page_size: usize,
    pub(crate) max_distance_km: u64,
    pub(crate) request_timeout_ms: u64,
    pub(crate) max_body_bytes: usize,
    pub(crate) max_concurrency: usize,
    pub(crate) persistence_enabled: bool,
    pub(crate) snapshot_path: PathBuf,
    pub(crate) wal_path: PathBuf,
}

impl AppConfig {
    pub(crate) fn from_env() -> Result<Self> {
        let bind = parse_socket_addr("GEONEAR_BIND", "127.0.0.1:8080")?;
        let max_page_size = parse_usize("GEONEAR_MAX_PAGE_SIZE", 100)?;
        let max_distance_km = parse_u64("GEONEAR_MAX_DISTANCE_KM", 100)?;
        let request_timeout_ms = parse_u64("GEONEAR_REQUEST_TIMEOUT_MS", 2000)?;
        let max_body_bytes = parse_usize("GEONEAR_MAX_BODY_BYTES", 1_048_576)?;
        let max_concurrency = parse_usize("GEONEAR_MAX_CONCURRENCY", 256)?;
        let persistence_enabled = parse_bool_env("GEONEAR_PERSISTENCE_ENABLED", true)?;
        let snapshot_path = parse_path("GEONEAR_SNAPSHOT_PATH", "data/geonear_snapshot.json")?;
        let wal_path = parse_path("GEONEAR_WAL_PATH", "data/geonear_wal.jsonl")?;

        if max_page_size == 0 {
            anyhow::bail!("GEONEAR_MAX_PAGE_SIZE must be > 0");
        }
        if max_distance_km == 0 {
            anyhow::bail!("GEONEAR_MAX_DISTANCE_KM must be > 0");
        }
        if request_timeout_ms == 0 {
            anyhow::bail!("GEONEAR_REQUEST_TIMEOUT_MS must be > 0");
        }
        if max_body_bytes == 0 {
            anyhow::bail!("GEONEAR_MAX_BODY_BYTES must be > 0");
        }
        if max_concurrency == 0 {
            anyhow::bail!("GEONEAR_MAX_CONCURRENCY must be > 0");
        }
        if persistence_enabled && snapshot_path == wal_path {
            anyhow::bail!("GEONEAR_SNAPSHOT_PATH and GEONEAR_WAL_PATH must differ");
        }

        Ok(Self {
            bind,
            max_page_size,
            max_distance_km,
            request_timeout_ms,
            max_body_bytes,
            max_concurrency,
            persistence_enabled,
            snapshot_path,
            wal_path,
        })
    }
}

fn parse_socket_addr(key: &str, default: &str) -> Result<SocketAddr> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .with_context(|| format!("{key} must be a valid socket address, got '{raw}'"))
}

fn parse_usize(key: &str, default: usize) -> Result<usize> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .with_context(|| format!("{key} must be a positive integer, got '{raw}'"))
}

fn parse_u64(key: &str, default: u64) -> Result<u64> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .with_context(|| format!("{key} must be a positive integer, got '{raw}'"))
}

fn parse_path(key: &str, default: &str) -> Result<PathBuf> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    let path = PathBuf::from(raw);
    if path.as_os_str().is_empty() {
        anyhow::bail!("{key} must not be empty");
    }
    Ok(path)
}

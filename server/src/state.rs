use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use geonear_core::{SharedDirectory, UserDirectory};
use tokio::sync::Mutex;

use crate::auth::AuthConfig;
use crate::config::AppConfig;

pub(crate) struct AppState {
    pub(crate) started_at: Instant,
    pub(crate) config: Arc<AppConfig>,
    pub(crate) auth_config: Arc<AuthConfig>,
    pub(crate) engine_loaded: Arc<AtomicBool>,
    pub(crate) storage_available: Arc<AtomicBool>,
    pub(crate) directory: SharedDirectory,
    /// Serialises directory writers together with their WAL append and checkpoint.
    pub(crate) write_serial: Arc<Mutex<()>>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            started_at: self.started_at,
            config: Arc::clone(&self.config),
            auth_config: Arc::clone(&self.auth_config),
            engine_loaded: Arc::clone(&self.engine_loaded),
            storage_available: Arc::clone(&self.storage_available),
            directory: self.directory.clone(),
            write_serial: Arc::clone(&self.write_serial),
        }
    }
}

impl AppState {
    #[cfg(test)]
    pub(crate) fn with_directory(config: AppConfig, directory: UserDirectory) -> Self {
        Self::with_directory_and_auth(config, directory, AuthConfig::default())
    }

    pub(crate) fn with_directory_and_auth(
        config: AppConfig,
        directory: UserDirectory,
        auth_config: AuthConfig,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            config: Arc::new(config),
            auth_config: Arc::new(auth_config),
            engine_loaded: Arc::new(AtomicBool::new(true)),
            storage_available: Arc::new(AtomicBool::new(true)),
            directory: SharedDirectory::new(directory),
            write_serial: Arc::new(Mutex::new(())),
        }
    }
}

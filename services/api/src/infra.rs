use hiperfarma_meeting::config::StorageConfig;
use hiperfarma_meeting::meeting::{EventRepository, EventSnapshot, RepositoryError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEventRepository {
    snapshot: Arc<Mutex<EventSnapshot>>,
}

impl EventRepository for InMemoryEventRepository {
    fn load(&self) -> Result<EventSnapshot, RepositoryError> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|_| RepositoryError::Unavailable("snapshot mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, snapshot: &EventSnapshot) -> Result<(), RepositoryError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| RepositoryError::Unavailable("snapshot mutex poisoned".to_string()))?;
        *guard = snapshot.clone();
        Ok(())
    }
}

/// Keeps the whole event in one JSON document, rewritten on every save.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileEventRepository {
    path: PathBuf,
}

impl JsonFileEventRepository {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl EventRepository for JsonFileEventRepository {
    fn load(&self) -> Result<EventSnapshot, RepositoryError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(EventSnapshot::default()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(EventSnapshot::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, snapshot: &EventSnapshot) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_vec_pretty(snapshot)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// Repository selected from configuration.
#[derive(Clone)]
pub(crate) enum EventStore {
    Memory(InMemoryEventRepository),
    File(JsonFileEventRepository),
}

impl EventStore {
    pub(crate) fn from_config(config: &StorageConfig) -> Self {
        match &config.data_file {
            Some(path) => Self::File(JsonFileEventRepository::new(path.clone())),
            None => Self::Memory(InMemoryEventRepository::default()),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            EventStore::Memory(_) => "in-memory".to_string(),
            EventStore::File(repository) => repository.path().display().to_string(),
        }
    }
}

impl EventRepository for EventStore {
    fn load(&self) -> Result<EventSnapshot, RepositoryError> {
        match self {
            EventStore::Memory(repository) => repository.load(),
            EventStore::File(repository) => repository.load(),
        }
    }

    fn save(&self, snapshot: &EventSnapshot) -> Result<(), RepositoryError> {
        match self {
            EventStore::Memory(repository) => repository.save(snapshot),
            EventStore::File(repository) => repository.save(snapshot),
        }
    }
}

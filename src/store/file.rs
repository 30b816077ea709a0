//! JSON-file backed state store.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use crate::failover::EndpointState;
use crate::store::{StateStore, StoreError};

/// State store persisted as one JSON object keyed by name.
///
/// Every `put` rewrites the whole file through a temp file and rename, so a
/// crash mid-write leaves the previous version intact.
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    states: DashMap<String, EndpointState>,
    /// Serializes file rewrites across names.
    write_lock: Mutex<()>,
}

impl FileStateStore {
    /// Load the store from `path`.
    ///
    /// A missing file starts empty. An unreadable JSON document is moved
    /// aside to `<path>.corrupt` and the store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let states = DashMap::new();

        match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, EndpointState>>(&bytes) {
                Ok(map) => {
                    for (name, mut state) in map {
                        state.name = name.clone();
                        states.insert(name, state);
                    }
                    tracing::info!(path = %path.display(), names = states.len(), "Loaded failover state");
                }
                Err(e) => {
                    let aside = sibling(&path, ".corrupt");
                    fs::rename(&path, &aside)?;
                    tracing::error!(
                        path = %path.display(),
                        moved_to = %aside.display(),
                        error = %e,
                        "State file unreadable, starting with empty state"
                    );
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No state file, starting with empty state");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            path,
            states,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_file(&self, bytes: &[u8]) -> std::io::Result<()> {
        let tmp = sibling(&self.path, ".tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await
    }
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[async_trait]
impl StateStore for FileStateStore {
    fn get(&self, name: &str) -> Option<EndpointState> {
        self.states.get(name).map(|r| r.value().clone())
    }

    async fn put(&self, state: EndpointState) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut map: BTreeMap<String, EndpointState> = self
            .states
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        map.insert(state.name.clone(), state.clone());

        let bytes = serde_json::to_vec_pretty(&map)?;
        self.write_file(&bytes).await?;

        tracing::debug!(name = %state.name, "State persisted");
        self.states.insert(state.name.clone(), state);
        Ok(())
    }

    fn snapshot(&self) -> Vec<EndpointState> {
        let mut all: Vec<_> = self.states.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}

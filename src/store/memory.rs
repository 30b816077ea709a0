//! Volatile state store.

use async_trait::async_trait;
use dashmap::DashMap;
use crate::failover::EndpointState;
use crate::store::{StateStore, StoreError};

/// Keeps state in memory only; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: DashMap<String, EndpointState>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    fn get(&self, name: &str) -> Option<EndpointState> {
        self.states.get(name).map(|r| r.value().clone())
    }

    async fn put(&self, state: EndpointState) -> Result<(), StoreError> {
        self.states.insert(state.name.clone(), state);
        Ok(())
    }

    fn snapshot(&self) -> Vec<EndpointState> {
        let mut all: Vec<_> = self.states.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use roster_app::{RecordStore, StoreResult, Student, StudentDraft, StudentId};
use roster_store::RestStore;
use roster_testkit::MemoryStore;

use crate::config::StoreSettings;

/// The store the UI runs against: the hosted table, or the seeded
/// in-memory one for `--demo`.
#[derive(Debug)]
pub enum Backend {
    Rest(RestStore),
    Demo(MemoryStore),
}

impl Backend {
    pub fn connect(settings: &StoreSettings) -> Result<Self> {
        let store = RestStore::new(
            &settings.url,
            &settings.api_key,
            &settings.table,
            settings.timeout,
        )?;
        tracing::info!(table = %store.table_url(), timeout = ?store.timeout(), "store configured");
        Ok(Self::Rest(store))
    }

    pub fn demo() -> Self {
        tracing::info!("using in-memory demo store");
        Self::Demo(MemoryStore::demo())
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Rest(store) => store.table_url().to_string(),
            Self::Demo(_) => "in-memory demo store".to_owned(),
        }
    }

    /// One round trip to prove the store answers. Returns the row count.
    pub fn check(&mut self) -> Result<usize> {
        let rows = self
            .list()
            .with_context(|| format!("list students from {}", self.describe()))?;
        Ok(rows.len())
    }
}

impl RecordStore for Backend {
    fn list(&mut self) -> StoreResult<Vec<Student>> {
        match self {
            Self::Rest(store) => store.list(),
            Self::Demo(store) => store.list(),
        }
    }

    fn insert(&mut self, draft: &StudentDraft) -> StoreResult<()> {
        match self {
            Self::Rest(store) => store.insert(draft),
            Self::Demo(store) => store.insert(draft),
        }
    }

    fn update(&mut self, id: &StudentId, draft: &StudentDraft) -> StoreResult<()> {
        match self {
            Self::Rest(store) => store.update(id, draft),
            Self::Demo(store) => store.update(id, draft),
        }
    }

    fn delete(&mut self, id: &StudentId) -> StoreResult<()> {
        match self {
            Self::Rest(store) => store.delete(id),
            Self::Demo(store) => store.delete(id),
        }
    }
}

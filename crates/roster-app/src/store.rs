// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{Student, StudentDraft, StudentId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("cannot reach the student store: {0}")]
    Unreachable(String),

    #[error("{0}")]
    Conflict(String),

    #[error("no student with id {0}")]
    NotFound(StudentId),

    #[error("store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unreadable store response: {0}")]
    Decode(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The four calls the app makes against the hosted `students` table. Each
/// call is one round trip; nothing retries.
pub trait RecordStore {
    /// Every row, ordered by name ascending.
    fn list(&mut self) -> StoreResult<Vec<Student>>;

    fn insert(&mut self, draft: &StudentDraft) -> StoreResult<()>;

    fn update(&mut self, id: &StudentId, draft: &StudentDraft) -> StoreResult<()>;

    fn delete(&mut self, id: &StudentId) -> StoreResult<()>;
}

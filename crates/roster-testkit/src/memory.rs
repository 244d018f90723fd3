// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use roster_app::{
    MAX_GPA, MIN_GPA, RecordStore, StoreError, StoreResult, Student, StudentDraft, StudentId,
};
use std::collections::VecDeque;
use time::{Duration, OffsetDateTime};

use crate::{REFERENCE_TIME, StudentFaker};

const DEMO_SEED: u64 = 2026;
const DEMO_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Insert,
    Update,
    Delete,
}

/// A [`RecordStore`] kept in process memory. It enforces the same rules the
/// hosted table does (unique `student_id`, GPA check, server-assigned ids
/// and timestamps) and can be told to fail the next call of a given kind.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    rows: Vec<Student>,
    next_row: u64,
    clock: OffsetDateTime,
    failures: VecDeque<(StoreOp, StoreError)>,
    calls: Vec<StoreOp>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_row: 0,
            clock: REFERENCE_TIME,
            failures: VecDeque::new(),
            calls: Vec::new(),
        }
    }

    /// Store preloaded with the given drafts, inserted in order. Drafts that
    /// the table would refuse are skipped.
    pub fn with_drafts(drafts: impl IntoIterator<Item = StudentDraft>) -> Self {
        let mut store = Self::new();
        for draft in drafts {
            if store.check(None, &draft).is_ok() {
                store.push(draft);
            }
        }
        store
    }

    pub fn seeded(seed: u64, count: usize) -> Self {
        Self::with_drafts(StudentFaker::new(seed).drafts(count))
    }

    /// The fixed population shown by `roster --demo`.
    pub fn demo() -> Self {
        Self::seeded(DEMO_SEED, DEMO_SIZE)
    }

    /// Rows in insertion order, unsorted, as the table holds them.
    pub fn rows(&self) -> &[Student] {
        &self.rows
    }

    pub fn calls(&self) -> &[StoreOp] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Queue a failure for the next call of `op`. Queued failures are used
    /// once each, oldest first.
    pub fn fail_next(&mut self, op: StoreOp, error: StoreError) {
        self.failures.push_back((op, error));
    }

    fn take_failure(&mut self, op: StoreOp) -> StoreResult<()> {
        self.calls.push(op);
        match self.failures.iter().position(|(queued, _)| *queued == op) {
            Some(index) => match self.failures.remove(index) {
                Some((_, error)) => Err(error),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }

    fn tick(&mut self) -> OffsetDateTime {
        self.clock += Duration::seconds(1);
        self.clock
    }

    fn push(&mut self, draft: StudentDraft) {
        self.next_row += 1;
        let now = self.tick();
        self.rows.push(Student {
            id: StudentId::new(format!("row-{}", self.next_row)),
            student_id: draft.student_id,
            name: draft.name,
            email: draft.email,
            major: draft.major,
            year: draft.year,
            gpa: draft.gpa,
            created_at: now,
            updated_at: now,
        });
    }

    fn check(&self, updating: Option<&StudentId>, draft: &StudentDraft) -> StoreResult<()> {
        if !(MIN_GPA..=MAX_GPA).contains(&draft.gpa) {
            return Err(StoreError::Rejected {
                status: 400,
                message: "new row for relation \"students\" violates check constraint \"students_gpa_check\"".to_owned(),
            });
        }
        let duplicate = self
            .rows
            .iter()
            .any(|row| row.student_id == draft.student_id && Some(&row.id) != updating);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "duplicate key value violates unique constraint \"students_student_id_key\" (Key (student_id)=({}) already exists.)",
                draft.student_id
            )));
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn list(&mut self) -> StoreResult<Vec<Student>> {
        self.take_failure(StoreOp::List)?;
        let mut rows = self.rows.clone();
        rows.sort_by(|left, right| {
            left.name
                .cmp(&right.name)
                .then_with(|| left.created_at.cmp(&right.created_at))
        });
        Ok(rows)
    }

    fn insert(&mut self, draft: &StudentDraft) -> StoreResult<()> {
        self.take_failure(StoreOp::Insert)?;
        self.check(None, draft)?;
        self.push(draft.clone());
        Ok(())
    }

    fn update(&mut self, id: &StudentId, draft: &StudentDraft) -> StoreResult<()> {
        self.take_failure(StoreOp::Update)?;
        if !self.rows.iter().any(|row| &row.id == id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        self.check(Some(id), draft)?;
        let now = self.tick();
        if let Some(row) = self.rows.iter_mut().find(|row| &row.id == id) {
            row.student_id = draft.student_id.clone();
            row.name = draft.name.clone();
            row.email = draft.email.clone();
            row.major = draft.major.clone();
            row.year = draft.year;
            row.gpa = draft.gpa;
            row.updated_at = now;
        }
        Ok(())
    }

    fn delete(&mut self, id: &StudentId) -> StoreResult<()> {
        self.take_failure(StoreOp::Delete)?;
        let before = self.rows.len();
        self.rows.retain(|row| &row.id != id);
        if self.rows.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

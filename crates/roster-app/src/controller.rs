// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{
    AppCommand, AppEvent, AppState, FormMode, LoadState, Modal, ModalKind, RecordStore, Stats,
    StoreError, Student, StudentDraft, StudentId,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("no student form is open")]
    NoForm,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the authoritative student collection and the store it came from.
/// Every successful mutation is followed by a full reload; nothing is
/// patched locally.
#[derive(Debug)]
pub struct Controller<S> {
    store: S,
    state: AppState,
}

impl<S: RecordStore> Controller<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: AppState::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn stats(&self) -> Stats {
        self.state.stats()
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        self.state.dispatch(command)
    }

    pub fn begin_load(&mut self) {
        self.state.load = LoadState::Loading;
    }

    /// Refetches the whole collection. A failure clears the records and
    /// leaves the message for the banner.
    pub fn load(&mut self) -> Vec<AppEvent> {
        self.begin_load();
        match self.store.list() {
            Ok(students) => {
                let count = students.len();
                tracing::debug!(count, "students loaded");
                self.state.load = LoadState::Ready(students);
                vec![AppEvent::Loaded(count)]
            }
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(%error, "student load failed");
                self.state.load = LoadState::Error(message.clone());
                vec![AppEvent::LoadFailed(message)]
            }
        }
    }

    /// User-triggered refetch; the way out of the error banner.
    pub fn reload(&mut self) -> Vec<AppEvent> {
        tracing::debug!("reload requested");
        self.load()
    }

    pub fn request_add(&mut self) -> Vec<AppEvent> {
        self.dispatch(AppCommand::RequestAdd)
    }

    pub fn request_edit(&mut self, student: Student) -> Vec<AppEvent> {
        self.dispatch(AppCommand::RequestEdit(student))
    }

    pub fn cancel_form(&mut self) -> Vec<AppEvent> {
        self.dispatch(AppCommand::CancelForm)
    }

    /// Sends the draft as an insert or an update depending on how the form
    /// was opened. On failure the modal stays open and the load state is
    /// left alone; the caller shows the error inside the form.
    pub fn submit_form(&mut self, draft: StudentDraft) -> Result<Vec<AppEvent>, SubmitError> {
        let Modal::Open(mode) = &self.state.modal else {
            return Err(SubmitError::NoForm);
        };
        let kind = ModalKind::from(&self.state.modal);

        match mode {
            FormMode::Create => {
                self.store.insert(&draft).inspect_err(|error| {
                    tracing::warn!(%error, student_id = %draft.student_id, "student insert failed");
                })?;
                tracing::info!(student_id = %draft.student_id, "student created");
            }
            FormMode::Edit(target) => {
                let id = target.id.clone();
                let draft = StudentDraft {
                    student_id: target.student_id.clone(),
                    ..draft
                };
                self.store.update(&id, &draft).inspect_err(|error| {
                    tracing::warn!(%error, %id, "student update failed");
                })?;
                tracing::info!(%id, "student updated");
            }
        }

        let mut events = self.state.set_modal(Modal::Closed);
        events.insert(0, AppEvent::Saved(kind));
        events.extend(self.load());
        Ok(events)
    }

    /// Asks for confirmation; nothing is sent until [`Self::confirm_delete`].
    pub fn request_delete(&mut self, id: StudentId) -> Vec<AppEvent> {
        self.dispatch(AppCommand::RequestDelete(id))
    }

    pub fn cancel_delete(&mut self) -> Vec<AppEvent> {
        self.dispatch(AppCommand::CancelDelete)
    }

    /// Deletes the student awaiting confirmation. A failure raises an alert
    /// and keeps the current collection without refetching.
    pub fn confirm_delete(&mut self) -> Vec<AppEvent> {
        let Some(pending) = self.state.pending_delete.take() else {
            return Vec::new();
        };

        match self.store.delete(&pending.id) {
            Ok(()) => {
                tracing::info!(id = %pending.id, "student deleted");
                let mut events = vec![AppEvent::Deleted(pending.id)];
                events.extend(self.load());
                events
            }
            Err(error) => {
                tracing::warn!(%error, id = %pending.id, "student delete failed");
                vec![self.state.raise_alert(format!("Failed to delete student: {error}"))]
            }
        }
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FormMode, Stats, Student, StudentId};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready(Vec<Student>),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Closed,
    Open(FormMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Closed,
    Create,
    Edit,
}

impl From<&Modal> for ModalKind {
    fn from(modal: &Modal) -> Self {
        match modal {
            Modal::Closed => Self::Closed,
            Modal::Open(FormMode::Create) => Self::Create,
            Modal::Open(FormMode::Edit(_)) => Self::Edit,
        }
    }
}

/// A delete the user asked for but has not confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: StudentId,
    pub name: String,
}

impl PendingDelete {
    pub fn prompt(&self) -> String {
        format!("Are you sure you want to delete {}?", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub load: LoadState,
    pub modal: Modal,
    pub pending_delete: Option<PendingDelete>,
    pub alert: Option<String>,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            load: LoadState::Loading,
            modal: Modal::Closed,
            pending_delete: None,
            alert: None,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    RequestAdd,
    RequestEdit(Student),
    CancelForm,
    RequestDelete(StudentId),
    CancelDelete,
    DismissAlert,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModalChanged(ModalKind),
    DeletePrompted(String),
    DeletePromptCleared,
    AlertRaised(String),
    AlertDismissed,
    Loaded(usize),
    LoadFailed(String),
    Saved(ModalKind),
    Deleted(StudentId),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::RequestAdd => self.set_modal(Modal::Open(FormMode::Create)),
            AppCommand::RequestEdit(student) => {
                self.set_modal(Modal::Open(FormMode::Edit(student)))
            }
            AppCommand::CancelForm => self.set_modal(Modal::Closed),
            AppCommand::RequestDelete(id) => {
                let name = self
                    .students()
                    .iter()
                    .find(|student| student.id == id)
                    .map(|student| student.name.clone());
                let Some(name) = name else {
                    return vec![self.set_status(&format!("no student with id {id}"))];
                };
                let pending = PendingDelete { id, name };
                let prompt = pending.prompt();
                self.pending_delete = Some(pending);
                vec![AppEvent::DeletePrompted(prompt)]
            }
            AppCommand::CancelDelete => {
                if self.pending_delete.take().is_some() {
                    vec![AppEvent::DeletePromptCleared]
                } else {
                    Vec::new()
                }
            }
            AppCommand::DismissAlert => {
                if self.alert.take().is_some() {
                    vec![AppEvent::AlertDismissed]
                } else {
                    Vec::new()
                }
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// The collection the views see. Empty unless the last load succeeded.
    pub fn students(&self) -> &[Student] {
        match &self.load {
            LoadState::Ready(students) => students,
            LoadState::Loading | LoadState::Error(_) => &[],
        }
    }

    pub fn stats(&self) -> Stats {
        Stats::from_students(self.students())
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading)
    }

    pub fn load_error(&self) -> Option<&str> {
        match &self.load {
            LoadState::Error(message) => Some(message.as_str()),
            LoadState::Loading | LoadState::Ready(_) => None,
        }
    }

    pub fn modal_kind(&self) -> ModalKind {
        ModalKind::from(&self.modal)
    }

    pub(crate) fn set_modal(&mut self, modal: Modal) -> Vec<AppEvent> {
        self.modal = modal;
        vec![AppEvent::ModalChanged(self.modal_kind())]
    }

    pub(crate) fn raise_alert(&mut self, message: String) -> AppEvent {
        self.alert = Some(message.clone());
        AppEvent::AlertRaised(message)
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState, LoadState, Modal, ModalKind};
    use crate::{FormMode, Student, StudentId, YearLevel};
    use time::OffsetDateTime;

    fn student(id: &str, name: &str) -> Student {
        Student {
            id: StudentId::new(id),
            student_id: format!("STU-{id}"),
            name: name.to_owned(),
            email: "someone@example.com".to_owned(),
            major: "Art".to_owned(),
            year: YearLevel::Second,
            gpa: 2.8,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn default_state_is_loading_with_closed_modal() {
        let state = AppState::default();
        assert!(state.is_loading());
        assert_eq!(state.modal, Modal::Closed);
        assert!(state.students().is_empty());
    }

    #[test]
    fn request_add_opens_create_regardless_of_load_state() {
        let mut state = AppState {
            load: LoadState::Error("offline".to_owned()),
            ..AppState::default()
        };
        let events = state.dispatch(AppCommand::RequestAdd);
        assert_eq!(state.modal, Modal::Open(FormMode::Create));
        assert_eq!(events, vec![AppEvent::ModalChanged(ModalKind::Create)]);
    }

    #[test]
    fn request_edit_then_cancel_closes() {
        let mut state = AppState::default();
        let target = student("a", "Ana");
        state.dispatch(AppCommand::RequestEdit(target.clone()));
        assert_eq!(state.modal, Modal::Open(FormMode::Edit(target)));

        let events = state.dispatch(AppCommand::CancelForm);
        assert_eq!(state.modal, Modal::Closed);
        assert_eq!(events, vec![AppEvent::ModalChanged(ModalKind::Closed)]);
    }

    #[test]
    fn request_delete_prompts_with_student_name() {
        let mut state = AppState {
            load: LoadState::Ready(vec![student("a", "Ana"), student("b", "Bob")]),
            ..AppState::default()
        };
        let events = state.dispatch(AppCommand::RequestDelete(StudentId::new("b")));
        assert_eq!(
            events,
            vec![AppEvent::DeletePrompted(
                "Are you sure you want to delete Bob?".to_owned()
            )]
        );
        assert_eq!(
            state.pending_delete.as_ref().map(|pending| pending.id.as_str()),
            Some("b")
        );

        state.dispatch(AppCommand::CancelDelete);
        assert!(state.pending_delete.is_none());
    }

    #[test]
    fn request_delete_for_unknown_id_only_sets_status() {
        let mut state = AppState {
            load: LoadState::Ready(vec![student("a", "Ana")]),
            ..AppState::default()
        };
        state.dispatch(AppCommand::RequestDelete(StudentId::new("zzz")));
        assert!(state.pending_delete.is_none());
        assert!(state.status_line.is_some());
    }

    #[test]
    fn error_state_exposes_no_students() {
        let state = AppState {
            load: LoadState::Error("boom".to_owned()),
            ..AppState::default()
        };
        assert!(state.students().is_empty());
        assert_eq!(state.load_error(), Some("boom"));
        assert_eq!(state.stats().mean_gpa, "0.00");
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::{MAX_GPA, MIN_GPA, Student, StudentDraft, YearLevel};

const MAX_TEXT_CHARS: usize = 120;
const GPA_DECIMALS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit(Student),
}

impl FormMode {
    pub const fn is_edit(&self) -> bool {
        matches!(self, Self::Edit(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    StudentId,
    Name,
    Email,
    Major,
    Year,
    Gpa,
}

impl FormField {
    pub const ALL: [Self; 6] = [
        Self::StudentId,
        Self::Name,
        Self::Email,
        Self::Major,
        Self::Year,
        Self::Gpa,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::StudentId => "Student ID",
            Self::Name => "Full Name",
            Self::Email => "Email",
            Self::Major => "Major",
            Self::Year => "Year",
            Self::Gpa => "GPA",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::StudentId => "e.g., STU001",
            Self::Name => "e.g., John Doe",
            Self::Email => "e.g., john@example.com",
            Self::Major => "e.g., Computer Science",
            Self::Year => "",
            Self::Gpa => "0.00",
        }
    }
}

/// Raw widget contents. Text stays as typed until submit so a failed save
/// leaves exactly what the user entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub major: String,
    pub year: YearLevel,
    pub gpa: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            student_id: String::new(),
            name: String::new(),
            email: String::new(),
            major: String::new(),
            year: YearLevel::First,
            gpa: "0".to_owned(),
        }
    }
}

impl FormFields {
    pub fn from_student(student: &Student) -> Self {
        Self {
            student_id: student.student_id.clone(),
            name: student.name.clone(),
            email: student.email.clone(),
            major: student.major.clone(),
            year: student.year,
            gpa: format!("{}", student.gpa),
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::StudentId => &self.student_id,
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Major => &self.major,
            FormField::Year => self.year.label(),
            FormField::Gpa => &self.gpa,
        }
    }

    /// Checks the constraints the input widgets declare (required, email
    /// shape, GPA range and step) and produces the row body.
    pub fn validate(&self) -> Result<StudentDraft> {
        let student_id = self.student_id.trim();
        if student_id.is_empty() {
            bail!("student ID is required -- enter a student ID and retry");
        }
        let name = self.name.trim();
        if name.is_empty() {
            bail!("full name is required -- enter a name and retry");
        }
        let email = self.email.trim();
        if email.is_empty() {
            bail!("email is required -- enter an email address and retry");
        }
        if !looks_like_email(email) {
            bail!("email {email:?} is not a valid address -- use the form name@example.com");
        }
        let major = self.major.trim();
        if major.is_empty() {
            bail!("major is required -- enter a major and retry");
        }
        let gpa = parse_gpa(&self.gpa)?;

        Ok(StudentDraft {
            student_id: student_id.to_owned(),
            name: name.to_owned(),
            email: email.to_owned(),
            major: major.to_owned(),
            year: self.year,
            gpa,
        })
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::StudentId => Some(&mut self.student_id),
            FormField::Name => Some(&mut self.name),
            FormField::Email => Some(&mut self.email),
            FormField::Major => Some(&mut self.major),
            FormField::Gpa => Some(&mut self.gpa),
            FormField::Year => None,
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn parse_gpa(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("GPA is required -- enter a value between 0 and 4");
    }
    if let Some((_, fraction)) = trimmed.split_once('.')
        && fraction.len() > GPA_DECIMALS
    {
        bail!("GPA {trimmed} has more than two decimals -- round to the nearest 0.01");
    }
    let Ok(value) = trimmed.parse::<f64>() else {
        bail!("GPA {trimmed:?} is not a number -- enter a value between 0 and 4");
    };
    if !(MIN_GPA..=MAX_GPA).contains(&value) {
        bail!("GPA must be between 0 and 4, got {trimmed}");
    }
    Ok(value)
}

/// Transient state of the create/edit form: the draft widgets, which one
/// has focus, and the submit lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentForm {
    editing: bool,
    fields: FormFields,
    focus: FormField,
    submitting: bool,
    error: Option<String>,
}

impl StudentForm {
    pub fn new(mode: &FormMode) -> Self {
        let (editing, fields, focus) = match mode {
            FormMode::Create => (false, FormFields::default(), FormField::StudentId),
            FormMode::Edit(student) => (true, FormFields::from_student(student), FormField::Name),
        };
        Self {
            editing,
            fields,
            focus,
            submitting: false,
            error: None,
        }
    }

    pub const fn is_edit(&self) -> bool {
        self.editing
    }

    pub const fn title(&self) -> &'static str {
        if self.editing {
            "Edit Student"
        } else {
            "Add New Student"
        }
    }

    pub const fn submit_label(&self) -> &'static str {
        if self.submitting {
            "Saving..."
        } else if self.editing {
            "Update"
        } else {
            "Add Student"
        }
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub const fn focus(&self) -> FormField {
        self.focus
    }

    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The student ID is fixed once a record exists.
    pub const fn is_field_editable(&self, field: FormField) -> bool {
        !(self.editing && matches!(field, FormField::StudentId))
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, delta: isize) {
        if self.submitting {
            return;
        }
        let fields = FormField::ALL;
        let len = fields.len() as isize;
        let mut index = fields
            .iter()
            .position(|field| *field == self.focus)
            .unwrap_or(0) as isize;
        for _ in 0..fields.len() {
            index = (index + delta).rem_euclid(len);
            if self.is_field_editable(fields[index as usize]) {
                break;
            }
        }
        self.focus = fields[index as usize];
    }

    /// Types one character into the focused widget. Returns whether the
    /// widget accepted it.
    pub fn input_char(&mut self, ch: char) -> bool {
        if self.submitting || !self.is_field_editable(self.focus) || ch.is_control() {
            return false;
        }
        if self.focus == FormField::Year {
            return ch
                .to_digit(10)
                .is_some_and(|digit| digit >= 1 && self.choose_year(digit as usize - 1));
        }
        if self.focus == FormField::Gpa && !gpa_accepts(&self.fields.gpa, ch) {
            return false;
        }
        let focus = self.focus;
        let Some(text) = self.fields.text_mut(focus) else {
            return false;
        };
        if text.chars().count() >= MAX_TEXT_CHARS {
            return false;
        }
        text.push(ch);
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.submitting || !self.is_field_editable(self.focus) {
            return false;
        }
        let focus = self.focus;
        self.fields
            .text_mut(focus)
            .and_then(|text| text.pop())
            .is_some()
    }

    /// Picks a year by its position in the fixed option list. Positions
    /// outside the list are refused.
    pub fn choose_year(&mut self, index: usize) -> bool {
        if self.submitting {
            return false;
        }
        match YearLevel::ALL.get(index) {
            Some(year) => {
                self.fields.year = *year;
                true
            }
            None => false,
        }
    }

    pub fn cycle_year(&mut self, delta: isize) {
        if self.submitting {
            return;
        }
        self.fields.year = self.fields.year.cycle(delta);
    }

    /// Enters the submitting state if every widget constraint holds and
    /// hands back the row body to send. On a constraint failure the message
    /// is shown inline and nothing should be sent.
    pub fn begin_submit(&mut self) -> Option<StudentDraft> {
        if self.submitting {
            return None;
        }
        self.error = None;
        match self.fields.validate() {
            Ok(draft) => {
                self.submitting = true;
                Some(draft)
            }
            Err(error) => {
                self.error = Some(error.to_string());
                None
            }
        }
    }

    /// Leaves the submitting state. A create that succeeded clears the
    /// draft; an edit is closed by the controller instead.
    pub fn finish_submit(&mut self, result: std::result::Result<(), String>) {
        self.submitting = false;
        match result {
            Ok(()) => {
                self.error = None;
                if !self.editing {
                    self.fields = FormFields::default();
                    self.focus = FormField::StudentId;
                }
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }
}

fn gpa_accepts(current: &str, ch: char) -> bool {
    if ch == '.' {
        return !current.contains('.');
    }
    if !ch.is_ascii_digit() {
        return false;
    }
    match current.split_once('.') {
        Some((_, fraction)) => fraction.len() < GPA_DECIMALS,
        None => current.len() < 3,
    }
}

#[cfg(test)]
mod tests {
    use super::{FormField, FormFields, FormMode, StudentForm};
    use crate::{Student, StudentId, YearLevel};
    use time::OffsetDateTime;

    fn existing() -> Student {
        Student {
            id: StudentId::new("row-1"),
            student_id: "STU001".to_owned(),
            name: "Ana Lima".to_owned(),
            email: "ana@example.com".to_owned(),
            major: "Physics".to_owned(),
            year: YearLevel::Third,
            gpa: 3.9,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn type_text(form: &mut StudentForm, text: &str) {
        for ch in text.chars() {
            form.input_char(ch);
        }
    }

    fn filled_create_form() -> StudentForm {
        let mut form = StudentForm::new(&FormMode::Create);
        type_text(&mut form, "STU009");
        form.focus_next();
        type_text(&mut form, "Dana Ortiz");
        form.focus_next();
        type_text(&mut form, "dana@example.com");
        form.focus_next();
        type_text(&mut form, "Chemistry");
        form.focus_next();
        form.input_char('2');
        form.focus_next();
        form.backspace();
        type_text(&mut form, "3.45");
        form
    }

    #[test]
    fn create_form_starts_from_defaults() {
        let form = StudentForm::new(&FormMode::Create);
        assert_eq!(form.fields(), &FormFields::default());
        assert_eq!(form.fields().year, YearLevel::First);
        assert_eq!(form.fields().gpa, "0");
        assert_eq!(form.title(), "Add New Student");
        assert_eq!(form.submit_label(), "Add Student");
        assert_eq!(form.focus(), FormField::StudentId);
    }

    #[test]
    fn edit_form_is_seeded_from_target() {
        let form = StudentForm::new(&FormMode::Edit(existing()));
        assert_eq!(form.fields().student_id, "STU001");
        assert_eq!(form.fields().name, "Ana Lima");
        assert_eq!(form.fields().year, YearLevel::Third);
        assert_eq!(form.fields().gpa, "3.9");
        assert_eq!(form.title(), "Edit Student");
        assert_eq!(form.submit_label(), "Update");
    }

    #[test]
    fn edit_form_locks_student_id() {
        let mut form = StudentForm::new(&FormMode::Edit(existing()));
        assert!(!form.is_field_editable(FormField::StudentId));
        for _ in 0..FormField::ALL.len() * 2 {
            form.focus_next();
            assert_ne!(form.focus(), FormField::StudentId);
        }
        for _ in 0..FormField::ALL.len() * 2 {
            form.focus_prev();
            assert_ne!(form.focus(), FormField::StudentId);
        }
    }

    #[test]
    fn filled_form_produces_trimmed_draft() {
        let mut form = filled_create_form();
        let draft = form.begin_submit().expect("valid form should submit");
        assert_eq!(draft.student_id, "STU009");
        assert_eq!(draft.year, YearLevel::Second);
        assert!((draft.gpa - 3.45).abs() < f64::EPSILON);
        assert!(form.is_submitting());
        assert_eq!(form.submit_label(), "Saving...");
    }

    #[test]
    fn submitting_form_ignores_input() {
        let mut form = filled_create_form();
        form.begin_submit().expect("valid form should submit");
        assert!(!form.input_char('x'));
        assert!(!form.backspace());
        assert!(form.begin_submit().is_none());
    }

    #[test]
    fn missing_required_field_blocks_submit() {
        let mut form = StudentForm::new(&FormMode::Create);
        assert!(form.begin_submit().is_none());
        assert!(!form.is_submitting());
        assert!(form.error().is_some_and(|error| error.contains("student ID is required")));
    }

    #[test]
    fn malformed_email_blocks_submit() {
        let mut fields = filled_create_form().fields().clone();
        for bad in ["dana", "dana@", "@example.com", "da na@example.com", "a@b@c"] {
            fields.email = bad.to_owned();
            assert!(fields.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn gpa_widget_limits_characters_and_decimals() {
        let mut form = StudentForm::new(&FormMode::Create);
        for _ in 0..4 {
            form.focus_next();
        }
        assert_eq!(form.focus(), FormField::Year);
        form.focus_next();
        assert_eq!(form.focus(), FormField::Gpa);
        form.backspace();
        assert!(!form.input_char('-'));
        assert!(!form.input_char('e'));
        assert!(form.input_char('3'));
        assert!(form.input_char('.'));
        assert!(!form.input_char('.'));
        assert!(form.input_char('1'));
        assert!(form.input_char('4'));
        assert!(!form.input_char('9'));
        assert_eq!(form.fields().gpa, "3.14");
    }

    #[test]
    fn gpa_outside_range_is_rejected() {
        let mut fields = filled_create_form().fields().clone();
        fields.gpa = "4.01".to_owned();
        assert!(fields.validate().is_err());
        fields.gpa = "4".to_owned();
        assert!(fields.validate().is_ok());
        fields.gpa = "0".to_owned();
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn year_is_only_choosable_from_fixed_set() {
        let mut form = StudentForm::new(&FormMode::Create);
        assert!(!form.choose_year(4));
        assert!(!form.choose_year(usize::MAX));
        assert_eq!(form.fields().year, YearLevel::First);

        for _ in 0..4 {
            form.focus_next();
        }
        assert_eq!(form.focus(), FormField::Year);
        assert!(!form.input_char('0'));
        assert!(!form.input_char('5'));
        assert!(!form.input_char('9'));
        assert!(form.input_char('4'));
        assert_eq!(form.fields().year, YearLevel::Fourth);

        let mut seen = Vec::new();
        for _ in 0..12 {
            form.cycle_year(1);
            seen.push(form.fields().year);
        }
        assert!(seen.iter().all(|year| YearLevel::ALL.contains(year)));
    }

    #[test]
    fn failed_submit_keeps_draft_and_shows_error() {
        let mut form = filled_create_form();
        let before = form.fields().clone();
        form.begin_submit().expect("valid form should submit");
        form.finish_submit(Err("duplicate key".to_owned()));
        assert_eq!(form.fields(), &before);
        assert_eq!(form.error(), Some("duplicate key"));
        assert!(!form.is_submitting());
    }

    #[test]
    fn successful_create_resets_draft() {
        let mut form = filled_create_form();
        form.begin_submit().expect("valid form should submit");
        form.finish_submit(Ok(()));
        assert_eq!(form.fields(), &FormFields::default());
        assert!(form.error().is_none());
    }

    #[test]
    fn successful_edit_keeps_draft() {
        let mut form = StudentForm::new(&FormMode::Edit(existing()));
        let before = form.fields().clone();
        form.begin_submit().expect("seeded form should submit");
        form.finish_submit(Ok(()));
        assert_eq!(form.fields(), &before);
    }
}

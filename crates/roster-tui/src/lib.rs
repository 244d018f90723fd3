// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use roster_app::{
    AppCommand, AppEvent, AppState, Controller, FormField, LoadState, Modal, ModalKind,
    RecordStore, ScoreTier, Stats, Student, StudentDraft, StudentForm,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const APP_TITLE: &str = "Student Management";
const LOADING_TEXT: &str = "Loading students...";
const EMPTY_TEXT: &str = "No students yet\n\nGet started by adding your first student.";
const COLUMN_LABELS: [&str; 6] = ["Student ID", "Name", "Email", "Major", "Year", "GPA"];
const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

/// A store call queued by a key press. It runs on the next loop turn, after
/// a frame showing the loading or saving state has been drawn.
#[derive(Debug, Clone, PartialEq)]
enum PendingWork {
    Load,
    Submit(StudentDraft),
    Delete,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    form: Option<StudentForm>,
    selected_row: usize,
    pending: Option<PendingWork>,
    help_visible: bool,
    status_token: u64,
}

type UiTerminal = Terminal<CrosstermBackend<io::Stdout>>;

pub fn run_app<S: RecordStore>(controller: &mut Controller<S>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut terminal = match enter_terminal() {
        Ok(terminal) => terminal,
        Err(error) => return session_outcome(Err(error), restore_terminal()),
    };
    tracing::info!("ui started");

    let result = event_loop(&mut terminal, controller);
    let restored = restore_terminal();
    tracing::info!("ui stopped");
    session_outcome(result, restored)
}

fn enter_terminal() -> Result<UiTerminal> {
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")
}

/// Both restore steps always run; the first failure is reported.
fn restore_terminal() -> Result<()> {
    let raw = disable_raw_mode().context("disable raw mode");
    let screen =
        execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen");
    raw.and(screen)
}

/// A loop error outranks a restore error.
fn session_outcome(result: Result<()>, restored: Result<()>) -> Result<()> {
    result.and(restored)
}

fn event_loop<S: RecordStore>(
    terminal: &mut UiTerminal,
    controller: &mut Controller<S>,
) -> Result<()> {
    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    queue_load(controller, &mut view_data);

    loop {
        process_internal_events(controller, &view_data, &internal_rx);

        terminal
            .draw(|frame| render(frame, controller.state(), &view_data))
            .context("draw frame")?;

        if view_data.pending.is_some() {
            run_pending_work(controller, &mut view_data, &internal_tx);
            continue;
        }

        if let Some(key) = next_key(POLL_INTERVAL)?
            && handle_key_event(controller, &mut view_data, &internal_tx, key)
        {
            return Ok(());
        }
    }
}

fn next_key(timeout: Duration) -> Result<Option<KeyEvent>> {
    if !event::poll(timeout).context("poll event")? {
        return Ok(None);
    }
    match event::read().context("read event")? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}

fn process_internal_events<S: RecordStore>(
    controller: &mut Controller<S>,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                controller.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status<S: RecordStore>(
    controller: &mut Controller<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    controller.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn queue_load<S: RecordStore>(controller: &mut Controller<S>, view_data: &mut ViewData) {
    controller.begin_load();
    view_data.pending = Some(PendingWork::Load);
}

fn run_pending_work<S: RecordStore>(
    controller: &mut Controller<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(work) = view_data.pending.take() else {
        return;
    };

    match work {
        PendingWork::Load => {
            controller.load();
        }
        PendingWork::Submit(draft) => {
            let kind = controller.state().modal_kind();
            match controller.submit_form(draft) {
                Ok(_) => {
                    if let Some(form) = view_data.form.as_mut() {
                        form.finish_submit(Ok(()));
                    }
                    sync_form_ui_state(controller.state(), view_data);
                    let message = if kind == ModalKind::Edit {
                        "student updated"
                    } else {
                        "student added"
                    };
                    emit_status(controller, view_data, internal_tx, message);
                }
                Err(error) => {
                    if let Some(form) = view_data.form.as_mut() {
                        form.finish_submit(Err(error.to_string()));
                    }
                }
            }
        }
        PendingWork::Delete => {
            let events = controller.confirm_delete();
            if events
                .iter()
                .any(|event| matches!(event, AppEvent::Deleted(_)))
            {
                emit_status(controller, view_data, internal_tx, "student deleted");
            }
        }
    }

    clamp_selection(controller.state(), view_data);
}

fn handle_key_event<S: RecordStore>(
    controller: &mut Controller<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.pending.is_some() {
        return false;
    }

    if controller.state().alert.is_some() {
        controller.dispatch(AppCommand::DismissAlert);
        return false;
    }

    if controller.state().pending_delete.is_some() {
        handle_confirm_key(controller, view_data, internal_tx, key);
        return false;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.form.is_some() {
        handle_form_key(controller, view_data, internal_tx, key);
        return false;
    }

    handle_list_key(controller, view_data, internal_tx, key)
}

fn handle_confirm_key<S: RecordStore>(
    controller: &mut Controller<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('y' | 'Y') => {
            view_data.pending = Some(PendingWork::Delete);
        }
        KeyCode::Char('n' | 'N') | KeyCode::Esc => {
            controller.cancel_delete();
            emit_status(controller, view_data, internal_tx, "delete canceled");
        }
        _ => {}
    }
}

fn handle_form_key<S: RecordStore>(
    controller: &mut Controller<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if key.code == KeyCode::Esc {
        controller.cancel_form();
        sync_form_ui_state(controller.state(), view_data);
        emit_status(controller, view_data, internal_tx, "form canceled");
        return;
    }

    let Some(form) = view_data.form.as_mut() else {
        return;
    };

    let submit = key.code == KeyCode::Enter
        || (key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL));
    if submit {
        if let Some(draft) = form.begin_submit() {
            view_data.pending = Some(PendingWork::Submit(draft));
        }
        return;
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Left if form.focus() == FormField::Year => form.cycle_year(-1),
        KeyCode::Right if form.focus() == FormField::Year => form.cycle_year(1),
        KeyCode::Backspace => {
            form.backspace();
        }
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            form.input_char(ch);
        }
        _ => {}
    }
}

fn handle_list_key<S: RecordStore>(
    controller: &mut Controller<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => move_selection(controller.state(), view_data, 1),
        KeyCode::Char('k') | KeyCode::Up => move_selection(controller.state(), view_data, -1),
        KeyCode::Char('g') | KeyCode::Home => view_data.selected_row = 0,
        KeyCode::Char('G') | KeyCode::End => {
            view_data.selected_row = controller.state().students().len().saturating_sub(1);
        }
        KeyCode::Char('a') => {
            controller.request_add();
            sync_form_ui_state(controller.state(), view_data);
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            match selected_student(controller.state(), view_data).cloned() {
                Some(student) => {
                    controller.request_edit(student);
                    sync_form_ui_state(controller.state(), view_data);
                }
                None => emit_status(controller, view_data, internal_tx, "no student selected"),
            }
        }
        KeyCode::Char('d') => match selected_student(controller.state(), view_data) {
            Some(student) => {
                let id = student.id.clone();
                controller.request_delete(id);
            }
            None => emit_status(controller, view_data, internal_tx, "no student selected"),
        },
        KeyCode::Char('r') => queue_load(controller, view_data),
        KeyCode::Char('?') => view_data.help_visible = true,
        _ => {}
    }
    false
}

/// Keeps the form widget in step with the controller's modal: opened when
/// the modal opens, dropped when it closes.
fn sync_form_ui_state(state: &AppState, view_data: &mut ViewData) {
    let Modal::Open(mode) = &state.modal else {
        view_data.form = None;
        return;
    };
    let current = view_data
        .form
        .as_ref()
        .is_some_and(|form| form.is_edit() == mode.is_edit());
    if !current {
        view_data.form = Some(StudentForm::new(mode));
    }
}

fn selected_student<'a>(state: &'a AppState, view_data: &ViewData) -> Option<&'a Student> {
    state.students().get(view_data.selected_row)
}

fn move_selection(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let len = state.students().len();
    if len == 0 {
        view_data.selected_row = 0;
        return;
    }
    let next = view_data.selected_row as isize + delta;
    view_data.selected_row = next.clamp(0, len as isize - 1) as usize;
}

fn clamp_selection(state: &AppState, view_data: &mut ViewData) {
    let len = state.students().len();
    view_data.selected_row = view_data.selected_row.min(len.saturating_sub(1));
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let banner_height = if state.load_error().is_some() { 3 } else { 0 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(render_stats_text(&state.stats())).block(
        Block::default()
            .title(APP_TITLE)
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::White)),
    );
    frame.render_widget(header, layout[0]);

    if let Some(error) = state.load_error() {
        let banner = Paragraph::new(error.to_owned())
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("error").borders(Borders::ALL));
        frame.render_widget(banner, layout[1]);
    }

    render_students(frame, layout[2], state, view_data);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if let Some(form) = &view_data.form {
        let area = centered_rect(60, 60, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_form_text(form))
            .wrap(Wrap { trim: false })
            .block(Block::default().title(form.title()).borders(Borders::ALL));
        frame.render_widget(overlay, area);
    }

    if let Some(pending) = &state.pending_delete {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(format!("{}\n\ny delete | n cancel", pending.prompt()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("confirm")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            );
        frame.render_widget(confirm, area);
    }

    if let Some(alert) = &state.alert {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let alert = Paragraph::new(format!("{alert}\n\npress any key"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("alert")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(alert, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_students(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let block = Block::default()
        .title(format!("students ({})", state.students().len()))
        .borders(Borders::ALL);

    if let Some(placeholder) = list_placeholder_text(state) {
        let body = Paragraph::new(placeholder)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(body, area);
        return;
    }

    let header = Row::new(COLUMN_LABELS.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = state
        .students()
        .iter()
        .enumerate()
        .map(|(row_index, student)| {
            let gpa_style = Style::default().fg(tier_color(student.tier()));
            let cells = student_row_cells(student)
                .into_iter()
                .enumerate()
                .map(|(column, text)| {
                    if column == COLUMN_LABELS.len() - 1 {
                        Cell::from(text).style(gpa_style)
                    } else {
                        Cell::from(text)
                    }
                })
                .collect::<Vec<_>>();
            let row = Row::new(cells);
            if row_index == view_data.selected_row {
                row.style(Style::default().bg(Color::DarkGray))
            } else {
                row
            }
        });

    let widths = [
        Constraint::Length(12),
        Constraint::Min(14),
        Constraint::Min(18),
        Constraint::Min(12),
        Constraint::Length(7),
        Constraint::Length(5),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

/// What the list area shows instead of a table, if anything.
fn list_placeholder_text(state: &AppState) -> Option<&'static str> {
    match &state.load {
        LoadState::Loading => Some(LOADING_TEXT),
        LoadState::Ready(students) if students.is_empty() => Some(EMPTY_TEXT),
        LoadState::Ready(_) => None,
        LoadState::Error(_) => Some(EMPTY_TEXT),
    }
}

fn student_row_cells(student: &Student) -> [String; 6] {
    [
        student.student_id.clone(),
        student.name.clone(),
        student.email.clone(),
        student.major.clone(),
        format!("Year {}", student.year.number()),
        format!("{:.2}", student.gpa),
    ]
}

fn tier_color(tier: ScoreTier) -> Color {
    match tier {
        ScoreTier::Honors => Color::Green,
        ScoreTier::Good => Color::Blue,
        ScoreTier::Fair => Color::Yellow,
        ScoreTier::Low => Color::Red,
    }
}

fn render_stats_text(stats: &Stats) -> String {
    format!(
        "Total Students: {} | Average GPA: {} | Honors Students: {}",
        stats.total, stats.mean_gpa, stats.honors_count
    )
}

fn render_form_text(form: &StudentForm) -> String {
    let mut lines = Vec::with_capacity(FormField::ALL.len() + 4);
    for field in FormField::ALL {
        let marker = if field == form.focus() { ">" } else { " " };
        let value = form.fields().value(field);
        let shown = match field {
            FormField::Year => format!("< {value} >"),
            _ if value.is_empty() => format!("({})", field.placeholder()),
            _ => value.to_owned(),
        };
        let lock = if form.is_field_editable(field) {
            ""
        } else {
            "  [locked]"
        };
        lines.push(format!("{marker} {:<10}  {shown}{lock}", field.label()));
    }
    lines.push(String::new());
    if let Some(error) = form.error() {
        lines.push(format!("error: {error}"));
        lines.push(String::new());
    }
    lines.push(format!("[ {} ]   esc cancel", form.submit_label()));
    lines.join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let hints = match &view_data.pending {
        Some(PendingWork::Load) => "loading...",
        Some(PendingWork::Submit(_)) => "saving...",
        Some(PendingWork::Delete) => "deleting...",
        None if state.alert.is_some() => "any key dismiss",
        None if state.pending_delete.is_some() => "y delete | n/esc cancel",
        None if view_data.form.is_some() => {
            "tab/shift+tab field | 1-4 or left/right year | enter submit | esc cancel"
        }
        None => "j/k move | a add | e edit | d delete | r reload | ? help | q quit",
    };
    match &state.status_line {
        Some(status) => format!("{status} | {hints}"),
        None => hints.to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit\n\
list: j/k or up/down move | g/G first/last | a add | e or enter edit | d delete | r reload | q quit\n\
confirm: y delete | n or esc cancel\n\
form: tab/shift+tab field | 1-4 or left/right year | ctrl+s or enter submit | esc cancel\n\
alert: any key dismiss\n\
help: ? or esc close"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

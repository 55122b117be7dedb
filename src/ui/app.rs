use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::db::Gateway;
use crate::error::GatewayError;
use crate::models::Student;

use super::forms::{ConfirmDelete, Notice, SearchForm, StudentField, StudentForm};
use super::helpers::{centered_rect, cursor_column, surface_error};
use super::screens::StudentTable;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown.
const PAGE_STEP: isize = 10;
const ABOUT_TEXT: &str = "Student Management System. Keeps a table of students, \
their course and mobile number in a SQLite file or a MySQL database.";

/// Which dialog, if any, is on top of the table.
enum Mode {
    Normal,
    Inserting(StudentForm),
    /// The edited record is captured when the dialog opens so a later reload
    /// cannot retarget it.
    Editing {
        target: Student,
        form: StudentForm,
    },
    ConfirmDelete(ConfirmDelete),
    Searching(SearchForm),
    About,
    Notice(Notice),
}

/// Completion signal a dialog hands back after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Inserted,
    Updated(i64),
    Deleted(i64),
}

/// Result of feeding one key to a dialog: the mode to show next and, when
/// the store changed, what happened.
struct Transition {
    mode: Mode,
    change: Option<Change>,
}

impl Transition {
    fn stay(mode: Mode) -> Self {
        Self { mode, change: None }
    }

    fn close() -> Self {
        Self::stay(Mode::Normal)
    }

    fn completed(change: Change) -> Self {
        Self {
            mode: Mode::Normal,
            change: Some(change),
        }
    }
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Presentation controller: owns the gateway, the current snapshot and the
/// active dialog.
pub struct App {
    gateway: Gateway,
    table: StudentTable,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the controller and load the first snapshot. A failed load leaves
    /// an empty table and a blocking notice instead of aborting.
    pub fn new(gateway: Gateway) -> Self {
        let mut app = Self {
            gateway,
            table: StudentTable::new(Vec::new()),
            mode: Mode::Normal,
            status: None,
        };
        if let Err(err) = app.reload(None) {
            app.mode = Mode::Notice(app.report_failure("load students", &err));
        }
        app
    }

    /// Feed one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let transition = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Inserting(form) => self.handle_insert(code, form),
            Mode::Editing { target, form } => self.handle_edit(code, target, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::Searching(form) => self.handle_search(code, form),
            Mode::About | Mode::Notice(_) => Transition::close(),
        };

        self.mode = transition.mode;
        if let Some(change) = transition.change {
            self.apply_change(change);
        }
        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Transition {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.table.clear_highlight() {
                    self.clear_status();
                } else {
                    *exit = true;
                }
            }
            KeyCode::Up => self.table.move_selection(-1),
            KeyCode::Down => self.table.move_selection(1),
            KeyCode::PageUp => self.table.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.table.move_selection(PAGE_STEP),
            KeyCode::Home => self.table.select_first(),
            KeyCode::End => self.table.select_last(),
            KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Transition::stay(Mode::Inserting(StudentForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => {
                if let Some(student) = self.table.current().cloned() {
                    self.clear_status();
                    let form = StudentForm::from_student(&student);
                    return Transition::stay(Mode::Editing {
                        target: student,
                        form,
                    });
                }
                self.set_status("No student selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                if let Some(student) = self.table.current().cloned() {
                    self.clear_status();
                    return Transition::stay(Mode::ConfirmDelete(ConfirmDelete { student }));
                }
                self.set_status("No student selected to delete.", StatusKind::Error);
            }
            KeyCode::Char('f') | KeyCode::Char('F') | KeyCode::Char('/') => {
                self.clear_status();
                return Transition::stay(Mode::Searching(SearchForm::default()));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => match self.reload(None) {
                Ok(()) => self.set_status("Table refreshed.", StatusKind::Info),
                Err(err) => return Transition::stay(Mode::Notice(self.report_failure("refresh", &err))),
            },
            KeyCode::Char('?') => return Transition::stay(Mode::About),
            _ => {}
        }
        Transition::close()
    }

    fn handle_insert(&mut self, code: KeyCode, mut form: StudentForm) -> Transition {
        match code {
            KeyCode::Esc => {
                self.set_status("Add student cancelled.", StatusKind::Info);
                return Transition::close();
            }
            KeyCode::Enter => {
                match self
                    .gateway
                    .insert(&form.name, form.course.label(), &form.mobile)
                {
                    Ok(()) => return Transition::completed(Change::Inserted),
                    Err(err) => self.show_form_error(&mut form.error, "insert student", &err),
                }
            }
            _ => edit_form(&mut form, code),
        }
        Transition::stay(Mode::Inserting(form))
    }

    fn handle_edit(&mut self, code: KeyCode, target: Student, mut form: StudentForm) -> Transition {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Transition::close();
            }
            KeyCode::Enter => {
                match self.gateway.update(
                    target.id,
                    &form.name,
                    form.course.label(),
                    &form.mobile,
                ) {
                    Ok(()) => return Transition::completed(Change::Updated(target.id)),
                    Err(err) => self.show_form_error(&mut form.error, "update student", &err),
                }
            }
            _ => edit_form(&mut form, code),
        }
        Transition::stay(Mode::Editing { target, form })
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Transition {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Delete cancelled.", StatusKind::Info);
                Transition::close()
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.gateway.delete(confirm.student.id) {
                    Ok(()) => Transition::completed(Change::Deleted(confirm.student.id)),
                    Err(err) => Transition::stay(Mode::Notice(
                        self.report_failure("delete student", &err),
                    )),
                }
            }
            _ => Transition::stay(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Highlight the rows of the current snapshot that the store reports as
    /// exact name matches. The table itself is not replaced.
    fn handle_search(&mut self, code: KeyCode, mut form: SearchForm) -> Transition {
        match code {
            KeyCode::Esc => {
                self.clear_status();
                return Transition::close();
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.gateway.find_by_name(&form.query) {
                Ok(matches) => {
                    let missing = self.table.highlight(&matches);
                    let shown = matches.len() - missing;
                    let mut text = match shown {
                        0 => format!("No student named \"{}\" in the table.", form.query),
                        1 => format!("1 student named \"{}\".", form.query),
                        n => format!("{n} students named \"{}\".", form.query),
                    };
                    if missing > 0 {
                        text.push_str(&format!(
                            " {missing} more in the store; press R to refresh."
                        ));
                    }
                    let kind = if matches.is_empty() {
                        StatusKind::Error
                    } else {
                        StatusKind::Info
                    };
                    self.set_status(text, kind);
                    return Transition::close();
                }
                Err(err) => self.show_form_error(&mut form.error, "search students", &err),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Transition::stay(Mode::Searching(form))
    }

    /// React to a completed dialog: reload the snapshot and tell the user.
    fn apply_change(&mut self, change: Change) {
        let before = self.table.ids();
        let focus = match change {
            Change::Updated(id) => Some(id),
            Change::Inserted | Change::Deleted(_) => None,
        };

        if let Err(err) = self.reload(focus) {
            self.mode = Mode::Notice(self.report_failure("reload students", &err));
            return;
        }

        match change {
            Change::Inserted => {
                if let Some(idx) = self.table.rows.iter().position(|s| !before.contains(&s.id)) {
                    self.table.selected = Some(idx);
                }
                info!(rows = self.table.rows.len(), "student inserted");
                self.set_status("Student added.", StatusKind::Info);
            }
            Change::Updated(id) => {
                info!(id, "student updated");
                self.set_status("Student updated.", StatusKind::Info);
            }
            Change::Deleted(id) => {
                info!(id, "student deleted");
                self.clear_status();
                self.mode = Mode::Notice(Notice {
                    title: "Success".into(),
                    message: "Deletion was successful.".into(),
                    is_error: false,
                });
            }
        }
    }

    /// Replace the snapshot with a fresh `list_all`.
    fn reload(&mut self, focus_id: Option<i64>) -> Result<(), GatewayError> {
        let rows = self.gateway.list_all()?;
        self.table.replace(rows, focus_id);
        Ok(())
    }

    /// Keep the dialog open with the failure shown inline and in the footer.
    fn show_form_error(&mut self, slot: &mut Option<String>, action: &str, err: &GatewayError) {
        let message = surface_error(err);
        warn!(action, kind = err.kind(), "dialog action failed");
        *slot = Some(message.clone());
        self.set_status(message, StatusKind::Error);
    }

    fn report_failure(&mut self, action: &str, err: &GatewayError) -> Notice {
        let message = surface_error(err);
        warn!(action, kind = err.kind(), "action failed");
        self.set_status(format!("Could not {action}."), StatusKind::Error);
        Notice {
            title: "Error".into(),
            message,
            is_error: true,
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_table(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Inserting(form) => self.draw_student_form(frame, area, "Insert Student Data", form),
            Mode::Editing { form, .. } => {
                self.draw_student_form(frame, area, "Update Student Data", form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching(form) => self.draw_search(frame, area, form),
            Mode::About => self.draw_message(frame, area, "About", ABOUT_TEXT, Color::Reset),
            Mode::Notice(notice) => {
                let color = if notice.is_error { Color::Red } else { Color::Green };
                self.draw_message(frame, area, &notice.title, &notice.message, color)
            }
            Mode::Normal => {}
        }
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(["Id", "Name", "Course", "Mobile"])
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.table.rows.iter().map(|student| {
            let row = Row::new([
                Cell::from(student.id.to_string()),
                Cell::from(student.name.clone()),
                Cell::from(student.course.clone()),
                Cell::from(student.mobile.clone()),
            ]);
            if self.table.is_highlighted(student.id) {
                row.style(Style::default().fg(Color::Black).bg(Color::Yellow))
            } else {
                row
            }
        });

        let widths = [
            Constraint::Length(8),
            Constraint::Percentage(40),
            Constraint::Length(20),
            Constraint::Min(12),
        ];
        let title = format!("Students ({})", self.table.rows.len());
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title(title).borders(Borders::ALL))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(self.table.selected);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let text = match &self.mode {
            Mode::Inserting(_) | Mode::Editing { .. } => {
                "Tab/Shift+Tab switch field • ←/→ change course • Enter save • Esc cancel"
            }
            Mode::ConfirmDelete(_) => "Y confirm • N/Esc cancel",
            Mode::Searching(_) => "Enter search • Esc cancel",
            Mode::About | Mode::Notice(_) => "Press any key to close",
            Mode::Normal if self.table.current().is_some() => {
                "↑/↓ select • A add • E edit record • D delete record • F search • R refresh • ? about • Q quit"
            }
            Mode::Normal => "↑/↓ select • A add • F search • R refresh • ? about • Q quit",
        };
        Line::from(Span::styled(text, Style::default().fg(Color::Gray)))
    }

    fn draw_student_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &StudentForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Name", StudentField::Name),
            form.build_line("Course", StudentField::Course),
            form.build_line("Mobile", StudentField::Mobile),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row) = match form.active {
            StudentField::Name => ("Name: ".len(), 0),
            StudentField::Course => return,
            StudentField::Mobile => ("Mobile: ".len(), 2),
        };
        let cursor_x = cursor_column(inner, prefix + form.value_len(form.active));
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Delete Student Data")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from("Are you sure?"),
            Line::from(format!(
                "#{} {} ({})",
                confirm.student.id, confirm.student.name, confirm.student.course
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect, form: &SearchForm) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Search Students")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![Line::from(format!("Name: {}", form.query)), Line::from("")];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Exact, case-sensitive match.",
                Style::default().fg(Color::Gray),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = cursor_column(inner, "Name: ".len() + form.query.chars().count());
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_message(&self, frame: &mut Frame, area: Rect, title: &str, message: &str, color: Color) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(message.to_string()),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key to close.",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

/// Keys shared by the insert and edit dialogs that only touch form state.
fn edit_form(form: &mut StudentForm, code: KeyCode) {
    match code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.previous_field(),
        KeyCode::Left => {
            form.cycle_course(-1);
        }
        KeyCode::Right => {
            form.cycle_course(1);
        }
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(ch) => {
            if form.push_char(ch) {
                form.error = None;
            }
        }
        _ => {}
    }
}

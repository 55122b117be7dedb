use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Course, Student};

/// Input state shared by the insert and edit dialogs.
#[derive(Default, Clone)]
pub(crate) struct StudentForm {
    pub(crate) name: String,
    pub(crate) course: Course,
    pub(crate) mobile: String,
    pub(crate) active: StudentField,
    pub(crate) error: Option<String>,
}

/// Fields available within the student form.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum StudentField {
    Name,
    Course,
    Mobile,
}

impl Default for StudentField {
    fn default() -> Self {
        StudentField::Name
    }
}

impl StudentForm {
    /// Populate the form from the record being edited. A course outside the
    /// offered set falls back to the first entry, like a combo box would, and
    /// the form says so before anything is saved.
    pub(crate) fn from_student(student: &Student) -> Self {
        let (course, error) = match student.course.parse::<Course>() {
            Ok(course) => (course, None),
            Err(_) => {
                let fallback = Course::default();
                let warning = format!(
                    "Stored course \"{}\" is not offered; saving will set it to {fallback}.",
                    student.course
                );
                (fallback, Some(warning))
            }
        };
        Self {
            name: student.name.clone(),
            course,
            mobile: student.mobile.clone(),
            active: StudentField::Name,
            error,
        }
    }

    /// Cycle focus forwards across the three fields.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            StudentField::Name => StudentField::Course,
            StudentField::Course => StudentField::Mobile,
            StudentField::Mobile => StudentField::Name,
        };
    }

    /// Cycle focus backwards across the three fields.
    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            StudentField::Name => StudentField::Mobile,
            StudentField::Course => StudentField::Name,
            StudentField::Mobile => StudentField::Course,
        };
    }

    /// Append a character to the active text field. The course field only
    /// changes through [`StudentForm::cycle_course`].
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            StudentField::Name => self.name.push(ch),
            StudentField::Mobile => self.mobile.push(ch),
            StudentField::Course => return false,
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            StudentField::Name => {
                self.name.pop();
            }
            StudentField::Mobile => {
                self.mobile.pop();
            }
            StudentField::Course => {}
        }
    }

    /// Step through the offered courses when the course field has focus.
    pub(crate) fn cycle_course(&mut self, offset: isize) -> bool {
        if self.active != StudentField::Course {
            return false;
        }
        self.course = self.course.cycle(offset);
        true
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: StudentField) -> Line<'static> {
        let is_active = self.active == field;
        let (display, empty) = match field {
            StudentField::Name => placeholder(&self.name, "<required>"),
            StudentField::Course => (format!("< {} >", self.course), false),
            StudentField::Mobile => placeholder(&self.mobile, "<mobile>"),
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if empty {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested text field.
    pub(crate) fn value_len(&self, field: StudentField) -> usize {
        match field {
            StudentField::Name => self.name.chars().count(),
            StudentField::Course => 0,
            StudentField::Mobile => self.mobile.chars().count(),
        }
    }
}

fn placeholder(value: &str, hint: &str) -> (String, bool) {
    if value.is_empty() {
        (hint.to_string(), true)
    } else {
        (value.to_string(), false)
    }
}

/// The record a delete confirmation targets, captured when the dialog opens.
#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) student: Student,
}

/// Single-field search dialog.
#[derive(Default, Clone)]
pub(crate) struct SearchForm {
    pub(crate) query: String,
    pub(crate) error: Option<String>,
}

impl SearchForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.query.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.query.pop();
    }
}

/// Blocking message popup dismissed with any key.
#[derive(Clone)]
pub(crate) struct Notice {
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) is_error: bool,
}

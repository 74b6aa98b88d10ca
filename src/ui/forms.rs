use std::path::PathBuf;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{numbered_title, Record};

/// Single-line form used for adding and renaming companies.
#[derive(Default, Clone)]
pub(crate) struct NameForm {
    pub(crate) name: String,
    pub(crate) error: Option<String>,
}

impl NameForm {
    pub(crate) fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.name.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.name.pop();
    }

    pub(crate) fn build_line(&self, field_name: &str) -> Line<'static> {
        build_single_line(field_name, &self.name, true, "<required>")
    }
}

/// What a path prompt will do once confirmed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum PathAction {
    LoadText,
    LoadSql,
    SaveCompany,
    SaveAllAs,
    ExportSql,
}

impl PathAction {
    pub(crate) fn title(self) -> &'static str {
        match self {
            PathAction::LoadText => "Load Text File",
            PathAction::LoadSql => "Load SQLite File",
            PathAction::SaveCompany => "Save Current Company",
            PathAction::SaveAllAs => "Save All Companies As",
            PathAction::ExportSql => "Export to SQLite",
        }
    }
}

/// Path prompt standing in for a file dialog.
#[derive(Clone)]
pub(crate) struct PathForm {
    pub(crate) action: PathAction,
    pub(crate) path: String,
    pub(crate) error: Option<String>,
}

impl PathForm {
    pub(crate) fn new(action: PathAction, suggested: PathBuf) -> Self {
        Self {
            action,
            path: suggested.to_string_lossy().into_owned(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.path.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.path.pop();
    }

    /// Clear the suggestion in one keystroke.
    pub(crate) fn clear(&mut self) {
        self.path.clear();
    }

    pub(crate) fn parse_inputs(&self) -> Result<PathBuf> {
        let raw = self.path.trim();
        if raw.is_empty() {
            return Err(anyhow!("A file path is required."));
        }
        Ok(PathBuf::from(raw))
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        build_single_line("Path", &self.path, true, "<required>")
    }
}

/// Fields of the record editor, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum RecordField {
    Title,
    Type,
    Question,
    Answer,
}

impl RecordField {
    pub(crate) fn is_multiline(self) -> bool {
        matches!(self, RecordField::Question | RecordField::Answer)
    }
}

/// Editing state for one question/answer record.
#[derive(Clone)]
pub(crate) struct RecordForm {
    pub(crate) title: String,
    pub(crate) question_type: String,
    pub(crate) question: String,
    pub(crate) answer: String,
    pub(crate) active: RecordField,
    pub(crate) error: Option<String>,
}

impl RecordForm {
    pub(crate) fn from_record(record: &Record) -> Self {
        Self {
            title: record.title.clone(),
            question_type: record.question_type.clone(),
            question: record.question_text.clone(),
            answer: record.answer_text.clone(),
            active: RecordField::Answer,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            RecordField::Title => RecordField::Type,
            RecordField::Type => RecordField::Question,
            RecordField::Question => RecordField::Answer,
            RecordField::Answer => RecordField::Title,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            RecordField::Title => RecordField::Answer,
            RecordField::Type => RecordField::Title,
            RecordField::Question => RecordField::Type,
            RecordField::Answer => RecordField::Question,
        };
    }

    fn active_value(&mut self) -> &mut String {
        match self.active {
            RecordField::Title => &mut self.title,
            RecordField::Type => &mut self.question_type,
            RecordField::Question => &mut self.question,
            RecordField::Answer => &mut self.answer,
        }
    }

    pub(crate) fn value(&self, field: RecordField) -> &str {
        match field {
            RecordField::Title => &self.title,
            RecordField::Type => &self.question_type,
            RecordField::Question => &self.question,
            RecordField::Answer => &self.answer,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.active_value().push(ch);
        true
    }

    /// Enter adds a line break in the long fields and moves on otherwise.
    pub(crate) fn enter(&mut self) {
        if self.active.is_multiline() {
            self.active_value().push('\n');
        } else {
            self.next_field();
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.active_value().pop();
    }

    /// Build the record to store. Long fields are trimmed at their edges the
    /// same way loaded files are.
    pub(crate) fn parse_inputs(&self, position: usize) -> Record {
        let title = self.title.trim();
        let title = if title.is_empty() {
            numbered_title(position)
        } else {
            title.to_string()
        };
        Record {
            title,
            question_type: self.question_type.trim().to_string(),
            question_text: self.question.trim().to_string(),
            answer_text: self.answer.trim().to_string(),
        }
    }

    pub(crate) fn build_line(&self, field_name: &str, field: RecordField) -> Line<'static> {
        build_single_line(
            field_name,
            self.value(field),
            self.active == field,
            "<optional>",
        )
    }
}

fn build_single_line(
    field_name: &str,
    value: &str,
    is_active: bool,
    placeholder: &str,
) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

#[derive(Clone)]
pub(crate) struct ConfirmCompanyRemove {
    pub(crate) name: String,
    pub(crate) record_count: usize,
}

#[derive(Clone)]
pub(crate) struct ConfirmRecordRemove {
    pub(crate) company: String,
    pub(crate) index: usize,
    pub(crate) title: String,
}

/// Choice offered when quitting with unsaved changes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum QuitChoice {
    Save,
    Discard,
    Cancel,
}

pub(crate) struct ConfirmQuit {
    pub(crate) selection: QuitChoice,
}

impl ConfirmQuit {
    pub(crate) fn new() -> Self {
        Self {
            selection: QuitChoice::Save,
        }
    }

    /// Move the selection forward (Save → Discard → Cancel).
    pub(crate) fn next(&mut self) {
        self.selection = match self.selection {
            QuitChoice::Save => QuitChoice::Discard,
            QuitChoice::Discard => QuitChoice::Cancel,
            QuitChoice::Cancel => QuitChoice::Save,
        };
    }

    pub(crate) fn previous(&mut self) {
        self.selection = match self.selection {
            QuitChoice::Save => QuitChoice::Cancel,
            QuitChoice::Discard => QuitChoice::Save,
            QuitChoice::Cancel => QuitChoice::Discard,
        };
    }

    pub(crate) fn labels(&self) -> [&'static str; 3] {
        ["Save & Quit", "Discard & Quit", "Cancel"]
    }

    pub(crate) fn selected_index(&self) -> usize {
        match self.selection {
            QuitChoice::Save => 0,
            QuitChoice::Discard => 1,
            QuitChoice::Cancel => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_breaks_lines_only_in_long_fields() {
        let mut form = RecordForm::from_record(&Record::numbered(1));
        form.active = RecordField::Title;
        form.enter();
        assert_eq!(form.active, RecordField::Type);
        assert_eq!(form.title, "문항 1");

        form.active = RecordField::Question;
        for ch in "첫 줄".chars() {
            form.push_char(ch);
        }
        form.enter();
        form.enter();
        form.push_char('b');
        assert_eq!(form.question, "첫 줄\n\nb");
    }

    #[test]
    fn blank_title_falls_back_to_position() {
        let mut form = RecordForm::from_record(&Record::titled(""));
        form.answer = "  answer \n".into();
        let record = form.parse_inputs(4);
        assert_eq!(record.title, "문항 4");
        assert_eq!(record.answer_text, "answer");
    }

    #[test]
    fn path_form_requires_a_path() {
        let mut form = PathForm::new(PathAction::LoadText, PathBuf::from("/tmp/a.txt"));
        assert_eq!(form.parse_inputs().unwrap(), PathBuf::from("/tmp/a.txt"));
        form.clear();
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn quit_choice_cycles() {
        let mut confirm = ConfirmQuit::new();
        confirm.previous();
        assert_eq!(confirm.selection, QuitChoice::Cancel);
        confirm.next();
        confirm.next();
        assert_eq!(confirm.selected_index(), 1);
    }
}

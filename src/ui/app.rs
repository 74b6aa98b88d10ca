use std::mem;
use std::path::{Path, PathBuf};

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::merge::MergeOutcome;
use crate::models::Record;
use crate::workspace::{RenameOutcome, SaveTarget, Workspace};

use super::forms::{
    ConfirmCompanyRemove, ConfirmQuit, ConfirmRecordRemove, NameForm, PathAction, PathForm,
    QuitChoice, RecordField, RecordForm,
};
use super::helpers::{
    centered_rect, describe_core_error, display_width, surface_error, wrapped_height,
};
use super::screens::{SearchScreen, SearchState};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Width of the company list on the left.
const COMPANY_PANE_WIDTH: u16 = 28;
/// Lines moved per PageUp/PageDown in the record view.
const SCROLL_STEP: u16 = 5;

/// High-level navigation states.
enum Screen {
    Companies,
    Search(SearchScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    AddingCompany(NameForm),
    RenamingCompany {
        old: String,
        form: NameForm,
    },
    ConfirmCompanyRemove(ConfirmCompanyRemove),
    EditingRecord {
        company: String,
        index: usize,
        form: RecordForm,
    },
    ConfirmRecordRemove(ConfirmRecordRemove),
    PromptingPath {
        form: PathForm,
        quit_after: bool,
    },
    ConfirmQuit(ConfirmQuit),
    Searching(SearchState),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    workspace: Workspace,
    selected_record: usize,
    scroll: u16,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(workspace: Workspace) -> Self {
        let mut app = Self {
            workspace,
            selected_record: 0,
            scroll: 0,
            screen: Screen::Companies,
            mode: Mode::Normal,
            status: None,
        };
        if app.workspace.current_company().is_none() {
            if let Some(first) = app.company_names().into_iter().next() {
                app.workspace.select_company(&first);
            }
        }
        app
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingCompany(form) => self.handle_add_company(code, form)?,
            Mode::RenamingCompany { old, form } => self.handle_rename_company(code, old, form)?,
            Mode::ConfirmCompanyRemove(confirm) => {
                self.handle_confirm_company_remove(code, confirm)?
            }
            Mode::EditingRecord {
                company,
                index,
                form,
            } => self.handle_edit_record(code, company, index, form)?,
            Mode::ConfirmRecordRemove(confirm) => {
                self.handle_confirm_record_remove(code, confirm)?
            }
            Mode::PromptingPath { form, quit_after } => {
                self.handle_path_prompt(code, form, quit_after, &mut exit)?
            }
            Mode::ConfirmQuit(confirm) => self.handle_confirm_quit(code, confirm, &mut exit)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    /// Ctrl+S saves the record being edited, or everything otherwise.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::EditingRecord {
                company,
                index,
                mut form,
            } => {
                if self.commit_record(&company, index, &mut form) {
                    Mode::Normal
                } else {
                    Mode::EditingRecord {
                        company,
                        index,
                        form,
                    }
                }
            }
            Mode::Normal => self.save_all(false)?,
            other => other,
        };
        Ok(())
    }

    /// Ctrl+C asks before dropping unsaved work; a second Ctrl+C forces the
    /// exit. Returns whether the app should close.
    pub(crate) fn handle_ctrl_c(&mut self) -> Result<bool> {
        if matches!(self.mode, Mode::ConfirmQuit(_)) {
            return Ok(true);
        }
        let mut exit = false;
        self.mode = self.request_quit(&mut exit);
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if let Screen::Search(_) = self.screen {
            return self.handle_search_screen_key(code, exit);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(self.request_quit(exit)),
            KeyCode::Up => self.move_company(-1),
            KeyCode::Down => self.move_company(1),
            KeyCode::Home => self.move_company(isize::MIN / 2),
            KeyCode::End => self.move_company(isize::MAX / 2),
            KeyCode::Left | KeyCode::BackTab => self.move_record(-1),
            KeyCode::Right | KeyCode::Tab => self.move_record(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(SCROLL_STEP),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(SCROLL_STEP),
            KeyCode::Char('+') => return Ok(Mode::AddingCompany(NameForm::default())),
            KeyCode::Char('-') => {
                if let Some(confirm) = self.company_remove_confirmation() {
                    return Ok(Mode::ConfirmCompanyRemove(confirm));
                }
                self.set_status("No company selected.", StatusKind::Error);
            }
            KeyCode::Char('r') => {
                if let Some(old) = self.current_company() {
                    let form = NameForm::with_name(&old);
                    return Ok(Mode::RenamingCompany { old, form });
                }
                self.set_status("No company selected.", StatusKind::Error);
            }
            KeyCode::Char('a') => self.add_record(),
            KeyCode::Char('x') => return Ok(self.begin_record_remove()),
            KeyCode::Char('e') | KeyCode::Enter => return Ok(self.begin_record_edit()),
            KeyCode::Char('o') => {
                let suggested = self.workspace.default_bundle_path();
                return Ok(self.prompt_path(PathAction::LoadText, suggested));
            }
            KeyCode::Char('l') => {
                let suggested = self.workspace.default_sql_path();
                return Ok(self.prompt_path(PathAction::LoadSql, suggested));
            }
            KeyCode::Char('w') => {
                if self.workspace.current_company().is_none() {
                    self.set_status("No company selected.", StatusKind::Error);
                } else {
                    let suggested = self.workspace.default_company_path();
                    return Ok(self.prompt_path(PathAction::SaveCompany, suggested));
                }
            }
            KeyCode::Char('s') => return self.save_all(false),
            KeyCode::Char('S') => {
                let suggested = self.workspace.default_bundle_path();
                return Ok(self.prompt_path(PathAction::SaveAllAs, suggested));
            }
            KeyCode::Char('d') => {
                let suggested = self.workspace.default_sql_path();
                return Ok(self.prompt_path(PathAction::ExportSql, suggested));
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                return Ok(Mode::Searching(SearchState {
                    query: String::new(),
                }))
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_search_screen_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let Screen::Search(results) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        match code {
            KeyCode::Char('q') => return Ok(self.request_quit(exit)),
            KeyCode::Esc => {
                self.screen = Screen::Companies;
                self.clear_status();
            }
            KeyCode::Up => results.move_selection(-1),
            KeyCode::Down => results.move_selection(1),
            KeyCode::PageUp => results.move_selection(-10),
            KeyCode::PageDown => results.move_selection(10),
            KeyCode::Home => results.select_first(),
            KeyCode::End => results.select_last(),
            KeyCode::Enter => {
                if let Some(hit) = results.current_hit().cloned() {
                    self.screen = Screen::Companies;
                    self.workspace.select_company(&hit.company);
                    self.selected_record = hit.record_index;
                    self.scroll = 0;
                    self.set_status(
                        format!("Opened '{}' in {}.", hit.title, hit.company),
                        StatusKind::Info,
                    );
                }
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                return Ok(Mode::Searching(SearchState {
                    query: String::new(),
                }))
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_company(&mut self, code: KeyCode, mut form: NameForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add company cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.workspace.add_company(&form.name) {
                Ok(name) => {
                    self.selected_record = 0;
                    self.scroll = 0;
                    self.set_status(format!("Added company '{name}'."), StatusKind::Info);
                    return Ok(Mode::Normal);
                }
                Err(err) => form.error = Some(self.report_core_error(&err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::AddingCompany(form))
    }

    fn handle_rename_company(
        &mut self,
        code: KeyCode,
        old: String,
        mut form: NameForm,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Rename cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.workspace.rename_company(&old, &form.name) {
                Ok(RenameOutcome::Renamed) => {
                    self.set_status(
                        format!("Renamed '{old}' to '{}'.", form.name.trim()),
                        StatusKind::Info,
                    );
                    return Ok(Mode::Normal);
                }
                Ok(RenameOutcome::Unchanged) => {
                    self.clear_status();
                    return Ok(Mode::Normal);
                }
                Err(err) => form.error = Some(self.report_core_error(&err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::RenamingCompany { old, form })
    }

    fn handle_confirm_company_remove(
        &mut self,
        code: KeyCode,
        confirm: ConfirmCompanyRemove,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.workspace.remove_company(&confirm.name) {
                    Ok(_) => {
                        self.selected_record = 0;
                        self.scroll = 0;
                        self.set_status(
                            format!("Removed company '{}'.", confirm.name),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => {
                        self.report_core_error(&err);
                    }
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmCompanyRemove(confirm)),
        }
    }

    fn handle_edit_record(
        &mut self,
        code: KeyCode,
        company: String,
        index: usize,
        mut form: RecordForm,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.previous_field(),
            KeyCode::Enter => form.enter(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::EditingRecord {
            company,
            index,
            form,
        })
    }

    fn handle_confirm_record_remove(
        &mut self,
        code: KeyCode,
        confirm: ConfirmRecordRemove,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.remove_record(&confirm.company, confirm.index);
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmRecordRemove(confirm)),
        }
    }

    fn handle_path_prompt(
        &mut self,
        code: KeyCode,
        mut form: PathForm,
        quit_after: bool,
        exit: &mut bool,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status(format!("{} cancelled.", form.action.title()), StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Delete => form.clear(),
            KeyCode::Enter => {
                let path = match form.parse_inputs() {
                    Ok(path) => path,
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                        return Ok(Mode::PromptingPath { form, quit_after });
                    }
                };
                match self.run_path_action(form.action, &path) {
                    Ok(()) => {
                        if quit_after {
                            *exit = true;
                        }
                        return Ok(Mode::Normal);
                    }
                    Err(err) => form.error = Some(self.report_core_error(&err)),
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::PromptingPath { form, quit_after })
    }

    fn handle_confirm_quit(
        &mut self,
        code: KeyCode,
        mut confirm: ConfirmQuit,
        exit: &mut bool,
    ) -> Result<Mode> {
        match code {
            KeyCode::Left | KeyCode::BackTab => confirm.previous(),
            KeyCode::Right | KeyCode::Tab => confirm.next(),
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Enter => {
                return match confirm.selection {
                    QuitChoice::Save => self.save_all(true).map(|mode| {
                        if matches!(mode, Mode::Normal) && !self.workspace.has_unsaved_changes() {
                            *exit = true;
                        }
                        mode
                    }),
                    QuitChoice::Discard => {
                        info!("discarding unsaved changes on quit");
                        *exit = true;
                        Ok(Mode::Normal)
                    }
                    QuitChoice::Cancel => Ok(Mode::Normal),
                };
            }
            _ => {}
        }
        Ok(Mode::ConfirmQuit(confirm))
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.clear_status();
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                let report = self.workspace.search(&state.query);
                debug!(query = %state.query, hits = report.hits().len(), "search finished");
                let results = SearchScreen::new(report);
                let kind = if results.hits().is_empty() {
                    StatusKind::Warning
                } else {
                    StatusKind::Info
                };
                self.set_status(results.summary(), kind);
                self.screen = Screen::Search(results);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                }
            }
            _ => {}
        }
        Ok(Mode::Searching(state))
    }

    fn request_quit(&mut self, exit: &mut bool) -> Mode {
        if self.workspace.has_unsaved_changes() {
            Mode::ConfirmQuit(ConfirmQuit::new())
        } else {
            *exit = true;
            Mode::Normal
        }
    }

    /// Save to the remembered path, or ask for one when there is none.
    fn save_all(&mut self, quit_after: bool) -> Result<Mode> {
        match self.workspace.save_all() {
            Ok(SaveTarget::Saved(path)) => {
                self.set_status(format!("Saved to {}.", path.display()), StatusKind::Info);
                Ok(Mode::Normal)
            }
            Ok(SaveTarget::NeedsPath) => {
                let suggested = self.workspace.default_bundle_path();
                let form = PathForm::new(PathAction::SaveAllAs, suggested);
                Ok(Mode::PromptingPath { form, quit_after })
            }
            Err(err) => {
                self.report_core_error(&err);
                Ok(Mode::Normal)
            }
        }
    }

    fn run_path_action(&mut self, action: PathAction, path: &Path) -> Result<(), CoreError> {
        match action {
            PathAction::LoadText => {
                let outcome = self.workspace.load_text_file(path)?;
                self.after_load(&outcome, path);
            }
            PathAction::LoadSql => {
                let outcome = self.workspace.load_sql_file(path)?;
                self.after_load(&outcome, path);
            }
            PathAction::SaveCompany => {
                self.workspace.save_company_to_file(path)?;
                self.set_status(format!("Saved to {}.", path.display()), StatusKind::Info);
            }
            PathAction::SaveAllAs => {
                self.workspace.save_all_as(path)?;
                self.set_status(format!("Saved to {}.", path.display()), StatusKind::Info);
            }
            PathAction::ExportSql => {
                let rows = self.workspace.export_sql(path)?;
                self.set_status(
                    format!("Exported {rows} records to {}.", path.display()),
                    StatusKind::Info,
                );
            }
        }
        Ok(())
    }

    fn after_load(&mut self, outcome: &MergeOutcome, path: &Path) {
        self.selected_record = 0;
        self.scroll = 0;
        self.screen = Screen::Companies;
        self.set_status(
            format!(
                "Loaded {} companies from {} ({} questions in total).",
                outcome.merged_count,
                path.display(),
                self.workspace.store().record_count()
            ),
            StatusKind::Info,
        );
    }

    fn prompt_path(&self, action: PathAction, suggested: PathBuf) -> Mode {
        Mode::PromptingPath {
            form: PathForm::new(action, suggested),
            quit_after: false,
        }
    }

    fn add_record(&mut self) {
        let Some(company) = self.current_company() else {
            self.set_status("No company selected.", StatusKind::Error);
            return;
        };
        match self.workspace.add_record(&company) {
            Ok(index) => {
                self.selected_record = index;
                self.scroll = 0;
                self.set_status(format!("Added 문항 {}.", index + 1), StatusKind::Info);
            }
            Err(err) => {
                self.report_core_error(&err);
            }
        }
    }

    /// Blank records go without asking.
    fn begin_record_remove(&mut self) -> Mode {
        let Some(company) = self.current_company() else {
            self.set_status("No company selected.", StatusKind::Error);
            return Mode::Normal;
        };
        let index = self.selected_record;
        let Some(record) = self.workspace.current_records().get(index) else {
            self.set_status("No record selected.", StatusKind::Error);
            return Mode::Normal;
        };

        let blank = record.is_blank();
        let title = record.display_title(index + 1);

        if blank {
            self.remove_record(&company, index);
            return Mode::Normal;
        }
        Mode::ConfirmRecordRemove(ConfirmRecordRemove {
            company,
            index,
            title,
        })
    }

    /// A company without records gets its first one on edit.
    fn begin_record_edit(&mut self) -> Mode {
        let Some(company) = self.current_company() else {
            self.set_status("No company selected.", StatusKind::Error);
            return Mode::Normal;
        };
        if self.workspace.current_records().is_empty() {
            self.add_record();
        }
        let index = self.selected_record;
        match self.workspace.current_records().get(index) {
            Some(record) => Mode::EditingRecord {
                company,
                index,
                form: RecordForm::from_record(record),
            },
            None => Mode::Normal,
        }
    }

    fn remove_record(&mut self, company: &str, index: usize) {
        match self.workspace.remove_record(company, index) {
            Ok(removed) => {
                self.clamp_record_selection();
                self.scroll = 0;
                self.set_status(
                    format!("Removed '{}'.", removed.display_title(index + 1)),
                    StatusKind::Info,
                );
            }
            Err(err) => {
                self.report_core_error(&err);
            }
        }
    }

    /// Store the form. Returns false when the editor should stay open.
    fn commit_record(&mut self, company: &str, index: usize, form: &mut RecordForm) -> bool {
        let record = form.parse_inputs(index + 1);
        match self.workspace.update_record(company, index, record) {
            Ok(()) => {
                self.set_status("Record saved.", StatusKind::Info);
                true
            }
            Err(err) => {
                form.error = Some(self.report_core_error(&err));
                false
            }
        }
    }

    fn company_remove_confirmation(&self) -> Option<ConfirmCompanyRemove> {
        let name = self.current_company()?;
        Some(ConfirmCompanyRemove {
            record_count: self.workspace.current_records().len(),
            name,
        })
    }

    fn company_names(&self) -> Vec<String> {
        self.workspace.store().names_sorted()
    }

    fn current_company(&self) -> Option<String> {
        self.workspace.current_company().map(str::to_string)
    }

    fn current_record(&self) -> Option<&Record> {
        self.workspace.current_records().get(self.selected_record)
    }

    fn move_company(&mut self, offset: isize) {
        let names = self.company_names();
        if names.is_empty() {
            return;
        }
        let current = self
            .workspace
            .current_company()
            .and_then(|name| names.iter().position(|n| n == name))
            .unwrap_or(0);
        let target = (current as isize).saturating_add(offset);
        let target = target.clamp(0, names.len() as isize - 1) as usize;
        if target != current || self.workspace.current_company().is_none() {
            self.workspace.select_company(&names[target]);
            self.selected_record = 0;
            self.scroll = 0;
        }
    }

    fn move_record(&mut self, offset: isize) {
        let len = self.workspace.current_records().len();
        if len == 0 {
            return;
        }
        let target = (self.selected_record as isize + offset).rem_euclid(len as isize);
        self.selected_record = target as usize;
        self.scroll = 0;
    }

    fn clamp_record_selection(&mut self) {
        let len = self.workspace.current_records().len();
        self.selected_record = self.selected_record.min(len.saturating_sub(1));
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

    /// Show a core failure in the footer and hand back its message for the
    /// form that triggered it.
    fn report_core_error(&mut self, err: &CoreError) -> String {
        let (message, kind) = describe_core_error(err);
        self.set_status(message.clone(), kind);
        message
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

        match &self.screen {
            Screen::Companies => self.draw_companies(frame, content_area),
            Screen::Search(results) => self.draw_search_results(frame, content_area, results),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingCompany(form) => self.draw_name_form(frame, area, "Add Company", form),
            Mode::RenamingCompany { form, .. } => {
                self.draw_name_form(frame, area, "Rename Company", form)
            }
            Mode::ConfirmCompanyRemove(confirm) => {
                self.draw_confirm_company(frame, area, confirm)
            }
            Mode::EditingRecord { index, form, .. } => {
                self.draw_record_form(frame, area, *index, form)
            }
            Mode::ConfirmRecordRemove(confirm) => self.draw_confirm_record(frame, area, confirm),
            Mode::PromptingPath { form, .. } => self.draw_path_form(frame, area, form),
            Mode::ConfirmQuit(confirm) => self.draw_confirm_quit(frame, area, confirm),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_companies(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(COMPANY_PANE_WIDTH.min(area.width)),
                Constraint::Min(0),
            ])
            .split(area);

        self.draw_company_list(frame, chunks[0]);
        self.draw_record_view(frame, chunks[1]);
    }

    fn draw_company_list(&self, frame: &mut Frame, area: Rect) {
        let names = self.company_names();
        let block = Block::default()
            .title(format!(
                "Companies ({}) · {} Q",
                names.len(),
                self.workspace.store().record_count()
            ))
            .borders(Borders::ALL);

        if names.is_empty() {
            let message = Paragraph::new("No companies yet.\nPress '+' to add one\nor 'o' to load a file.")
                .block(block)
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let selected = self
            .workspace
            .current_company()
            .and_then(|current| names.iter().position(|name| name == current));
        let items: Vec<ListItem> = names
            .iter()
            .map(|name| {
                let count = self
                    .workspace
                    .store()
                    .get(name)
                    .map(Vec::len)
                    .unwrap_or_default();
                ListItem::new(Line::from(vec![
                    Span::raw(name.clone()),
                    Span::styled(format!(" ({count})"), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(selected);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_record_view(&self, frame: &mut Frame, area: Rect) {
        let Some(company) = self.workspace.current_company() else {
            let message = Paragraph::new("Select a company to see its questions.")
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(message, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let records = self.workspace.current_records();
        let titles: Vec<Line> = records
            .iter()
            .enumerate()
            .map(|(idx, record)| Line::from(record.display_title(idx + 1)))
            .collect();
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .title(company.to_string())
                    .borders(Borders::ALL),
            )
            .select(self.selected_record)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, chunks[0]);

        let Some(record) = self.current_record() else {
            let message = Paragraph::new("No questions yet. Press 'a' to add one or Enter to start writing.")
                .block(Block::default().borders(Borders::ALL))
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true });
            frame.render_widget(message, chunks[1]);
            return;
        };

        let heading = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(vec![
                Span::styled("유형: ", heading),
                Span::raw(record.question_type.clone()),
            ]),
            Line::from(""),
            Line::from(Span::styled("질문", heading)),
        ];
        lines.extend(record.question_text.split('\n').map(|l| Line::from(l.to_string())));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("답변", heading)));
        lines.extend(record.answer_text.split('\n').map(|l| Line::from(l.to_string())));

        let block = Block::default()
            .title(record.display_title(self.selected_record + 1))
            .borders(Borders::ALL);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, chunks[1]);
    }

    fn draw_search_results(&self, frame: &mut Frame, area: Rect, results: &SearchScreen) {
        let block = Block::default().title("Search").borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);
        if inner.height == 0 {
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(results.summary()).wrap(Wrap { trim: true }),
            chunks[0],
        );

        let label = Style::default().fg(Color::DarkGray);
        let items: Vec<ListItem> = results
            .hits()
            .iter()
            .map(|hit| {
                let fields = hit
                    .fields
                    .iter()
                    .map(|field| field.label())
                    .collect::<Vec<_>>()
                    .join(", ");
                ListItem::new(Line::from(vec![
                    Span::styled("회사: ", label),
                    Span::raw(hit.company.clone()),
                    Span::styled("  •  문항: ", label),
                    Span::raw(hit.title.clone()),
                    Span::styled("  •  일치: ", label),
                    Span::raw(fields),
                ]))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if !results.hits().is_empty() {
            state.select(Some(results.selected));
        }
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else if self.workspace.has_unsaved_changes() {
            Line::from(Span::styled(
                "Unsaved changes",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&'static str, &'static str)] = match (&self.screen, &self.mode) {
            (_, Mode::EditingRecord { .. }) => &[
                ("[Tab]", " Next Field   "),
                ("[Enter]", " New Line   "),
                ("[Ctrl+S]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::Searching(_)) => &[("[Enter]", " Search   "), ("[Esc]", " Cancel")],
            (_, Mode::PromptingPath { .. }) => &[
                ("[Enter]", " Confirm   "),
                ("[Del]", " Clear   "),
                ("[Esc]", " Cancel"),
            ],
            (Screen::Search(_), _) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Open   "),
                ("[f]", " New Search   "),
                ("[Esc]", " Back"),
            ],
            (Screen::Companies, _) => &[
                ("[↑↓]", " Company   "),
                ("[Tab]", " Question   "),
                ("[+/-/r]", " Add/Remove/Rename   "),
                ("[a/x/e]", " Add/Remove/Edit Q   "),
                ("[o/l]", " Load Text/SQLite   "),
                ("[w/s/S]", " Save Company/All/As   "),
                ("[d]", " Export SQLite   "),
                ("[f]", " Search   "),
                ("[q]", " Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (key, label) in keys {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + display_width("Search: ") + display_width(&state.query);
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_name_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &NameForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line("Name"), Line::from("")];
        lines.push(hint_or_error(
            form.error.as_deref(),
            "Enter to save • Esc to cancel",
        ));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let cursor_x = inner.x + display_width("Name: ") + display_width(&form.name);
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_path_form(&self, frame: &mut Frame, area: Rect, form: &PathForm) {
        let popup_area = centered_rect(80, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(form.action.title())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line(), Line::from("")];
        lines.push(hint_or_error(
            form.error.as_deref(),
            "Enter to confirm • Del to clear • Esc to cancel",
        ));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);

        if inner.width > 0 {
            let offset = display_width("Path: ") + display_width(&form.path);
            let cursor_x = inner.x + offset.min(inner.width.saturating_sub(1));
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_record_form(&self, frame: &mut Frame, area: Rect, index: usize, form: &RecordForm) {
        let popup_area = centered_rect(90, 90, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Edit 문항 {}", index + 1))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Percentage(30),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(inner);

        let header = Paragraph::new(vec![
            form.build_line("Title", RecordField::Title),
            form.build_line("Type", RecordField::Type),
        ]);
        frame.render_widget(header, chunks[0]);

        self.draw_long_field(frame, chunks[1], "질문", form, RecordField::Question);
        self.draw_long_field(frame, chunks[2], "답변", form, RecordField::Answer);

        frame.render_widget(
            Paragraph::new(hint_or_error(
                form.error.as_deref(),
                "Ctrl+S to save • Tab to switch • Enter for a new line • Esc to cancel",
            )),
            chunks[3],
        );

        let cursor = match form.active {
            RecordField::Title => Some((
                chunks[0].x + display_width("Title: ") + display_width(&form.title),
                chunks[0].y,
            )),
            RecordField::Type => Some((
                chunks[0].x + display_width("Type: ") + display_width(&form.question_type),
                chunks[0].y + 1,
            )),
            RecordField::Question | RecordField::Answer => None,
        };
        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }
    }

    /// Render a multi-line field. The active one keeps its end in view and
    /// shows a block caret in place of the terminal cursor.
    fn draw_long_field(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        form: &RecordForm,
        field: RecordField,
    ) {
        let active = form.active == field;
        let border_style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);

        let value = form.value(field);
        let mut lines: Vec<Line> = value
            .split('\n')
            .map(|line| Line::from(line.to_string()))
            .collect();
        let mut scroll = 0;
        if active {
            if let Some(last) = lines.last_mut() {
                last.push_span(Span::styled("█", Style::default().fg(Color::Yellow)));
            }
            let needed = wrapped_height(&format!("{value} "), inner.width);
            scroll = needed.saturating_sub(inner.height);
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_confirm_company(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmCompanyRemove) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Remove Company")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Remove '{}'?", confirm.name)),
            Line::from(format!(
                "All {} of its questions will be removed too.",
                confirm.record_count
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

    fn draw_confirm_record(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmRecordRemove) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Remove Question")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Remove '{}' from {}?",
                confirm.title, confirm.company
            )),
            Line::from("Its question and answer text will be lost."),
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

    fn draw_confirm_quit(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmQuit) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Exit Application")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut option_spans = Vec::new();
        for (idx, label) in confirm.labels().iter().enumerate() {
            if idx > 0 {
                option_spans.push(Span::raw("   "));
            }
            let style = if confirm.selected_index() == idx {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            option_spans.push(Span::styled(*label, style));
        }

        let lines = vec![
            Line::from("You have unsaved changes. Save them before quitting?"),
            Line::from(""),
            Line::from(option_spans),
            Line::from(""),
            Line::from(Span::styled(
                "Use ←/→ to choose • Enter to confirm • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

fn hint_or_error(error: Option<&str>, hint: &'static str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn app_with_company(dir: &TempDir, name: &str) -> App {
        let mut workspace = Workspace::new(dir.path());
        workspace.add_company(name).unwrap();
        App::new(workspace)
    }

    #[test]
    fn add_company_through_form() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(Workspace::new(dir.path()));

        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "삼성전자");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.workspace().current_company(), Some("삼성전자"));
    }

    #[test]
    fn duplicate_company_keeps_form_open() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_company(&dir, "A");

        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "A");
        app.handle_key(KeyCode::Enter).unwrap();

        match &app.mode {
            Mode::AddingCompany(form) => assert!(form.error.is_some()),
            _ => panic!("form should stay open"),
        }
    }

    #[test]
    fn edit_record_saves_on_ctrl_s() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_company(&dir, "A");

        app.handle_key(KeyCode::Enter).unwrap();
        type_text(&mut app, "첫 줄");
        app.handle_key(KeyCode::Enter).unwrap();
        type_text(&mut app, "둘째 줄");
        app.handle_ctrl_s().unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        let records = app.workspace().current_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "문항 1");
        assert_eq!(records[0].answer_text, "첫 줄\n둘째 줄");
    }

    #[test]
    fn blank_record_removed_without_confirmation() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_company(&dir, "A");

        app.handle_key(KeyCode::Char('a')).unwrap();
        app.handle_key(KeyCode::Char('a')).unwrap();
        assert_eq!(app.selected_record, 1);

        app.handle_key(KeyCode::Char('x')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.workspace().current_records().len(), 1);
        assert_eq!(app.selected_record, 0);
    }

    #[test]
    fn quit_asks_when_dirty_and_discard_exits() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_company(&dir, "A");

        assert!(!app.handle_key(KeyCode::Char('q')).unwrap());
        assert!(matches!(app.mode, Mode::ConfirmQuit(_)));

        app.handle_key(KeyCode::Right).unwrap();
        assert!(app.handle_key(KeyCode::Enter).unwrap());
    }

    #[test]
    fn save_without_path_prompts_then_quits() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_company(&dir, "A");

        app.handle_key(KeyCode::Char('q')).unwrap();
        assert!(!app.handle_key(KeyCode::Enter).unwrap());
        assert!(matches!(
            app.mode,
            Mode::PromptingPath {
                quit_after: true,
                ..
            }
        ));

        assert!(app.handle_key(KeyCode::Enter).unwrap());
        assert!(!app.workspace().has_unsaved_changes());
        assert!(app.workspace().default_bundle_path().is_file());
    }

    #[test]
    fn clean_workspace_quits_immediately() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(Workspace::new(dir.path()));
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn search_hit_opens_record() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_company(&dir, "A");
        app.handle_key(KeyCode::Char('a')).unwrap();
        app.handle_key(KeyCode::Char('a')).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.selected_record, 0);

        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, "문항 2");
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.screen, Screen::Search(_)));

        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.screen, Screen::Companies));
        assert_eq!(app.selected_record, 1);
    }
}

//! The single owner of the application's `CompanyStore`.
//!
//! Every mutation goes through `Workspace`, one call at a time: the UI never
//! holds references into the store across calls. Loads parse or import into
//! a partial store first and merge only after that fully succeeded, so a
//! failed load leaves the store exactly as it was.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::codec::{export_rows, format_text, import_rows, parse_text_checked};
use crate::db::{fetch_questions, open_export_target, open_import_source, replace_questions};
use crate::error::{CoreError, Result, ValidationError};
use crate::files::{read_text, write_text};
use crate::merge::{merge_into, MergeOutcome};
use crate::models::{CompanyStore, Record};
use crate::search::{search, SearchReport};

/// Upper bound on records per company.
pub const MAX_QUESTIONS: usize = 20;

const DEFAULT_BUNDLE_NAME: &str = "자소서_통합본.txt";
const DEFAULT_SQL_NAME: &str = "jaesoseo_db.sqlite";
const SQL_EXTENSIONS: &[&str] = &["sqlite", "sqlite3", "db"];

/// Outcome of a rename request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    Unchanged,
}

/// Outcome of "save all".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Saved(PathBuf),
    /// There is no usable previous path; ask the user for one and call
    /// [`Workspace::save_all_as`].
    NeedsPath,
}

#[derive(Debug, Default)]
pub struct Workspace {
    store: CompanyStore,
    current: Option<String>,
    last_save_path: Option<PathBuf>,
    data_dir: PathBuf,
    dirty: bool,
}

impl Workspace {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn store(&self) -> &CompanyStore {
        &self.store
    }

    pub fn current_company(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Records of the selected company.
    pub fn current_records(&self) -> &[Record] {
        self.current
            .as_deref()
            .and_then(|name| self.store.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn last_save_path(&self) -> Option<&Path> {
        self.last_save_path.as_deref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Select a company. Unknown names clear the selection.
    pub fn select_company(&mut self, name: &str) -> bool {
        if self.store.contains(name) {
            self.current = Some(name.to_string());
            true
        } else {
            self.current = None;
            false
        }
    }

    pub fn add_company(&mut self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.store.contains(name) {
            return Err(ValidationError::Duplicate(name.to_string()).into());
        }

        self.store.insert(name, Vec::new());
        self.current = Some(name.to_string());
        self.dirty = true;
        info!(company = name, "added company");
        Ok(name.to_string())
    }

    pub fn rename_company(&mut self, old: &str, new: &str) -> Result<RenameOutcome> {
        let new = new.trim();
        if new.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !self.store.contains(old) {
            return Err(ValidationError::UnknownCompany(old.to_string()).into());
        }
        if new == old {
            return Ok(RenameOutcome::Unchanged);
        }
        if !self.store.rename(old, new) {
            return Err(ValidationError::Duplicate(new.to_string()).into());
        }

        if self.current.as_deref() == Some(old) {
            self.current = Some(new.to_string());
        }
        self.dirty = true;
        info!(from = old, to = new, "renamed company");
        Ok(RenameOutcome::Renamed)
    }

    /// Remove a company and all of its records. The selection moves to the
    /// first remaining company in display order.
    pub fn remove_company(&mut self, name: &str) -> Result<Vec<Record>> {
        let removed = self
            .store
            .remove(name)
            .ok_or_else(|| ValidationError::UnknownCompany(name.to_string()))?;

        if self.current.as_deref() == Some(name) || self.current.is_none() {
            self.current = self.store.names_sorted().into_iter().next();
        }
        self.dirty = true;
        info!(company = name, records = removed.len(), "removed company");
        Ok(removed)
    }

    /// Append an empty record titled after its position. Returns its index.
    pub fn add_record(&mut self, company: &str) -> Result<usize> {
        let records = self.records_mut(company)?;
        if records.len() >= MAX_QUESTIONS {
            return Err(ValidationError::TooManyRecords(MAX_QUESTIONS).into());
        }
        records.push(Record::numbered(records.len() + 1));
        let index = records.len() - 1;
        self.dirty = true;
        Ok(index)
    }

    /// Replace one record with edited content.
    pub fn update_record(&mut self, company: &str, index: usize, record: Record) -> Result<()> {
        let slot = self
            .records_mut(company)?
            .get_mut(index)
            .ok_or(ValidationError::UnknownRecord(index + 1))?;
        if *slot != record {
            *slot = record;
            self.dirty = true;
        }
        Ok(())
    }

    /// Remove one record and renumber the positional titles after it.
    pub fn remove_record(&mut self, company: &str, index: usize) -> Result<Record> {
        let records = self.records_mut(company)?;
        if index >= records.len() {
            return Err(ValidationError::UnknownRecord(index + 1).into());
        }
        let removed = records.remove(index);
        for (position, record) in records.iter_mut().enumerate() {
            record.renumber(position + 1);
        }
        self.dirty = true;
        Ok(removed)
    }

    /// Load a text file and merge it into the store.
    pub fn load_text_file(&mut self, path: &Path) -> Result<MergeOutcome> {
        let content = read_text(path)?;
        let parsed = parse_text_checked(&content).inspect_err(|_| {
            warn!(path = %path.display(), "no company data found in text file");
        })?;

        let was_empty = self.store.is_empty();
        let outcome = self.absorb(parsed);
        self.last_save_path = Some(path.to_path_buf());
        self.dirty = !was_empty;
        info!(
            path = %path.display(),
            companies = outcome.merged_count,
            "loaded text file"
        );
        Ok(outcome)
    }

    /// Import a SQLite export and merge it into the store.
    pub fn load_sql_file(&mut self, path: &Path) -> Result<MergeOutcome> {
        let conn = open_import_source(path)?;
        let rows = fetch_questions(&conn)?;
        if rows.is_empty() {
            warn!(path = %path.display(), "questions table is empty");
            return Err(CoreError::EmptyResult);
        }

        let outcome = self.absorb(import_rows(rows));
        self.dirty = true;
        info!(
            path = %path.display(),
            companies = outcome.merged_count,
            "imported SQLite file"
        );
        Ok(outcome)
    }

    /// Load either format, picked by file extension.
    pub fn load_path(&mut self, path: &Path) -> Result<MergeOutcome> {
        if is_sql_path(path) {
            self.load_sql_file(path)
        } else {
            self.load_text_file(path)
        }
    }

    /// Write only the selected company to `path`.
    pub fn save_company_to_file(&mut self, path: &Path) -> Result<()> {
        let company = self
            .current
            .as_deref()
            .ok_or(ValidationError::NoCompanySelected)?;
        write_text(path, &format_text(&self.store, Some(company)))?;
        info!(company, path = %path.display(), "saved company");
        Ok(())
    }

    /// Write every company to `path` and remember it for [`Workspace::save_all`].
    pub fn save_all_as(&mut self, path: &Path) -> Result<()> {
        self.ensure_not_empty()?;
        write_text(path, &format_text(&self.store, None))?;
        self.last_save_path = Some(path.to_path_buf());
        self.dirty = false;
        info!(path = %path.display(), companies = self.store.len(), "saved all companies");
        Ok(())
    }

    /// Overwrite the last saved or loaded file. A write failure forgets that
    /// path so the next attempt asks for a new one.
    pub fn save_all(&mut self) -> Result<SaveTarget> {
        self.ensure_not_empty()?;
        let path = match self.last_save_path.clone() {
            Some(path) if path.exists() => path,
            _ => return Ok(SaveTarget::NeedsPath),
        };

        if let Err(err) = self.save_all_as(&path) {
            self.last_save_path = None;
            return Err(err);
        }
        Ok(SaveTarget::Saved(path))
    }

    /// Replace the `questions` table at `path` with the whole store.
    /// Returns the number of rows written.
    pub fn export_sql(&mut self, path: &Path) -> Result<usize> {
        self.ensure_not_empty()?;
        let rows = export_rows(&self.store);
        let mut conn = open_export_target(path)?;
        replace_questions(&mut conn, &rows)?;
        info!(path = %path.display(), rows = rows.len(), "exported SQLite file");
        Ok(rows.len())
    }

    pub fn search(&self, query: &str) -> SearchReport {
        search(&self.store, query)
    }

    /// Suggested path for saving the selected company alone.
    pub fn default_company_path(&self) -> PathBuf {
        let name = match &self.current {
            Some(company) => format!("{}_문항.txt", file_stem_for(company)),
            None => DEFAULT_BUNDLE_NAME.to_string(),
        };
        self.data_dir.join(name)
    }

    /// Suggested path for saving every company.
    pub fn default_bundle_path(&self) -> PathBuf {
        if let Some(path) = &self.last_save_path {
            return path.clone();
        }
        let name = match &self.current {
            Some(company) => format!("{}_통합본.txt", file_stem_for(company)),
            None => DEFAULT_BUNDLE_NAME.to_string(),
        };
        self.data_dir.join(name)
    }

    pub fn default_sql_path(&self) -> PathBuf {
        self.data_dir.join(DEFAULT_SQL_NAME)
    }

    fn absorb(&mut self, partial: CompanyStore) -> MergeOutcome {
        let outcome = merge_into(&mut self.store, partial);
        if let Some(first) = &outcome.first_key {
            self.current = Some(first.clone());
        }
        outcome
    }

    fn records_mut(&mut self, company: &str) -> Result<&mut Vec<Record>> {
        self.store
            .get_mut(company)
            .ok_or_else(|| ValidationError::UnknownCompany(company.to_string()).into())
    }

    fn ensure_not_empty(&self) -> Result<()> {
        if self.store.is_empty() {
            Err(ValidationError::NothingToSave.into())
        } else {
            Ok(())
        }
    }
}

/// Company names are free text; path separators and characters Windows
/// rejects in file names become `_`.
fn file_stem_for(company: &str) -> String {
    company
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect()
}

/// Whether a path names a SQLite file rather than a text export.
pub fn is_sql_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SQL_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::new(dir.path());
        (dir, ws)
    }

    #[test]
    fn add_company_validates_names() {
        let (_dir, mut ws) = workspace();

        assert_eq!(ws.add_company("  Acme ").unwrap(), "Acme");
        assert_eq!(ws.current_company(), Some("Acme"));
        assert!(matches!(
            ws.add_company("   "),
            Err(CoreError::Validation(ValidationError::EmptyName))
        ));
        assert!(matches!(
            ws.add_company("Acme"),
            Err(CoreError::Validation(ValidationError::Duplicate(_)))
        ));
        assert_eq!(ws.store().len(), 1);
    }

    #[test]
    fn rename_keeps_records_and_selection() {
        let (_dir, mut ws) = workspace();
        ws.add_company("Acme").unwrap();
        ws.add_record("Acme").unwrap();
        ws.add_company("Globex").unwrap();
        ws.select_company("Acme");

        assert_eq!(ws.rename_company("Acme", "Acme").unwrap(), RenameOutcome::Unchanged);
        assert!(ws.rename_company("Acme", "Globex").is_err());
        assert_eq!(ws.rename_company("Acme", "Initech").unwrap(), RenameOutcome::Renamed);
        assert_eq!(ws.current_company(), Some("Initech"));
        assert_eq!(ws.current_records().len(), 1);
    }

    #[test]
    fn removing_company_selects_first_alphabetically() {
        let (_dir, mut ws) = workspace();
        ws.add_company("Zeta").unwrap();
        ws.add_company("Beta").unwrap();
        ws.add_company("Alpha").unwrap();
        ws.select_company("Beta");

        ws.remove_company("Beta").unwrap();

        assert_eq!(ws.current_company(), Some("Alpha"));
        assert!(!ws.store().contains("Beta"));
    }

    #[test]
    fn records_are_capped_and_renumbered() {
        let (_dir, mut ws) = workspace();
        ws.add_company("Acme").unwrap();
        for _ in 0..MAX_QUESTIONS {
            ws.add_record("Acme").unwrap();
        }
        assert!(matches!(
            ws.add_record("Acme"),
            Err(CoreError::Validation(ValidationError::TooManyRecords(MAX_QUESTIONS)))
        ));

        let mut custom = Record::titled("지원동기");
        custom.answer_text = "draft".into();
        ws.update_record("Acme", 2, custom).unwrap();
        ws.remove_record("Acme", 0).unwrap();

        let titles: Vec<_> = ws.current_records().iter().take(3).map(|r| r.title.clone()).collect();
        assert_eq!(titles, vec!["문항 1", "지원동기", "문항 3"]);
    }

    #[test]
    fn failed_text_load_leaves_store_untouched() {
        let (dir, mut ws) = workspace();
        ws.add_company("Keep").unwrap();
        let path = dir.path().join("notes.txt");
        write_text(&path, "nothing structured here").unwrap();

        assert!(matches!(ws.load_text_file(&path), Err(CoreError::EmptyParse)));
        assert!(matches!(
            ws.load_text_file(&dir.path().join("missing.txt")),
            Err(CoreError::Io { .. })
        ));
        assert_eq!(ws.store().names().collect::<Vec<_>>(), vec!["Keep"]);
        assert_eq!(ws.last_save_path(), None);
    }

    #[test]
    fn save_all_needs_a_path_until_one_is_known() {
        let (dir, mut ws) = workspace();
        assert!(matches!(
            ws.save_all(),
            Err(CoreError::Validation(ValidationError::NothingToSave))
        ));

        ws.add_company("Acme").unwrap();
        assert_eq!(ws.save_all().unwrap(), SaveTarget::NeedsPath);

        let path = dir.path().join("all.txt");
        ws.save_all_as(&path).unwrap();
        assert!(!ws.has_unsaved_changes());

        ws.add_record("Acme").unwrap();
        assert_eq!(ws.save_all().unwrap(), SaveTarget::Saved(path.clone()));
        assert!(read_text(&path).unwrap().contains("<<제목>>: 문항 1"));
    }

    #[test]
    fn save_company_requires_selection() {
        let (dir, mut ws) = workspace();
        let path = dir.path().join("one.txt");
        assert!(matches!(
            ws.save_company_to_file(&path),
            Err(CoreError::Validation(ValidationError::NoCompanySelected))
        ));

        ws.add_company("A").unwrap();
        ws.add_company("B").unwrap();
        ws.select_company("A");
        ws.save_company_to_file(&path).unwrap();
        assert_eq!(read_text(&path).unwrap(), "[회사명]: A\n=== 회사 끝 ===");
    }

    #[test]
    fn default_paths_follow_selection() {
        let (dir, mut ws) = workspace();
        assert_eq!(ws.default_bundle_path(), dir.path().join("자소서_통합본.txt"));
        ws.add_company("Acme").unwrap();
        assert_eq!(ws.default_company_path(), dir.path().join("Acme_문항.txt"));
        assert_eq!(ws.default_bundle_path(), dir.path().join("Acme_통합본.txt"));
        assert_eq!(ws.default_sql_path(), dir.path().join("jaesoseo_db.sqlite"));
    }

    #[test]
    fn default_paths_stay_in_data_dir_for_odd_names() {
        let (dir, mut ws) = workspace();
        ws.add_company("A/B: 인턴?").unwrap();

        let company_path = ws.default_company_path();
        assert_eq!(company_path, dir.path().join("A_B_ 인턴__문항.txt"));
        assert_eq!(company_path.parent(), Some(dir.path()));
        assert_eq!(ws.default_bundle_path().parent(), Some(dir.path()));

        ws.save_company_to_file(&company_path).unwrap();
        assert!(!dir.path().join("A").exists());
    }

    #[test]
    fn sql_paths_are_detected_by_extension() {
        assert!(is_sql_path(Path::new("x.sqlite")));
        assert!(is_sql_path(Path::new("x.DB")));
        assert!(!is_sql_path(Path::new("x.txt")));
        assert!(!is_sql_path(Path::new("sqlite")));
    }
}

//! Domain models for the essay manager. A `Record` is one question/answer
//! unit and a `CompanyStore` groups records under the company they were
//! written for. These types stay plain data holders; parsing, persistence and
//! presentation live in their own modules.

/// Title given to a record that never declared one in a text file or that
/// came back from SQLite with a `NULL` title.
pub const UNTITLED: &str = "제목 없음";

/// Prefix of the positional default title (`문항 1`, `문항 2`, ...).
pub const NUMBERED_TITLE_PREFIX: &str = "문항 ";

#[derive(Debug, Clone, PartialEq, Eq)]
/// One question/answer unit. Records have no identity beyond their position
/// inside the owning company's list.
pub struct Record {
    /// Label shown on the record tab.
    pub title: String,
    /// Free-form category such as "지원동기" or "성장과정". May be empty.
    pub question_type: String,
    /// The prompt as given by the company. May span several lines.
    pub question_text: String,
    /// The drafted answer. May span several lines.
    pub answer_text: String,
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Record {
    /// Empty record carrying the parser's default title.
    pub fn new() -> Self {
        Self::titled(UNTITLED)
    }

    /// Empty record with the given title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            question_type: String::new(),
            question_text: String::new(),
            answer_text: String::new(),
        }
    }

    /// Empty record titled after its 1-based position (`문항 N`).
    pub fn numbered(position: usize) -> Self {
        Self::titled(numbered_title(position))
    }

    /// True when nothing but the title has been written yet.
    pub fn is_blank(&self) -> bool {
        self.question_type.is_empty()
            && self.question_text.is_empty()
            && self.answer_text.is_empty()
    }

    /// Rewrite a positional default title to match a new position. Titles the
    /// user chose are left alone. Returns whether the title changed.
    pub fn renumber(&mut self, position: usize) -> bool {
        if !is_numbered_title(&self.title) {
            return false;
        }
        let title = numbered_title(position);
        if title == self.title {
            return false;
        }
        self.title = title;
        true
    }

    /// Title to show in lists. Blank titles fall back to the positional
    /// default so tabs never render empty.
    pub fn display_title(&self, position: usize) -> String {
        if self.title.trim().is_empty() {
            numbered_title(position)
        } else {
            self.title.clone()
        }
    }
}

/// Build the positional default title for a 1-based position.
pub fn numbered_title(position: usize) -> String {
    format!("{NUMBERED_TITLE_PREFIX}{position}")
}

/// Whether a title is exactly `문항 <digits>`.
fn is_numbered_title(title: &str) -> bool {
    title
        .strip_prefix(NUMBERED_TITLE_PREFIX)
        .map(|digits| !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit()))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Mapping from company name to its ordered records.
///
/// Iteration follows insertion order, which is also the order the text
/// format writes companies in. Replacing an existing key keeps its position.
/// The UI sorts names alphabetically on its own via [`CompanyStore::names_sorted`].
pub struct CompanyStore {
    entries: Vec<(String, Vec<Record>)>,
}

/// Result of one parse or SQLite import, before it is merged into the
/// application's store.
pub type PartialStore = CompanyStore;

impl CompanyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of companies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Vec<Record>> {
        self.position(name).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<Record>> {
        let idx = self.position(name)?;
        Some(&mut self.entries[idx].1)
    }

    /// Store `records` under `name`. An existing entry is replaced wholesale
    /// and its previous records are returned.
    pub fn insert(&mut self, name: impl Into<String>, records: Vec<Record>) -> Option<Vec<Record>> {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, records)),
            None => {
                self.entries.push((name, records));
                None
            }
        }
    }

    /// Return the record list for `name`, creating an empty one if needed.
    pub fn entry(&mut self, name: &str) -> &mut Vec<Record> {
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                self.entries.push((name.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Remove a company together with all of its records.
    pub fn remove(&mut self, name: &str) -> Option<Vec<Record>> {
        let idx = self.position(name)?;
        Some(self.entries.remove(idx).1)
    }

    /// Rename a company in place. Returns `false` when `old` is unknown or
    /// `new` already names another company.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if old != new && self.contains(new) {
            return false;
        }
        match self.position(old) {
            Some(idx) => {
                self.entries[idx].0 = new.to_string();
                true
            }
            None => false,
        }
    }

    /// Companies with their records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.entries
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    /// Company names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Company names sorted for display.
    pub fn names_sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names().map(str::to_string).collect();
        names.sort();
        names
    }

    /// Total number of records across every company.
    pub fn record_count(&self) -> usize {
        self.entries.iter().map(|(_, records)| records.len()).sum()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }
}

impl IntoIterator for CompanyStore {
    type Item = (String, Vec<Record>);
    type IntoIter = std::vec::IntoIter<(String, Vec<Record>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, Vec<Record>)> for CompanyStore {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Record>)>>(iter: I) -> Self {
        let mut store = CompanyStore::new();
        for (name, records) in iter {
            store.insert(name, records);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place_and_keeps_order() {
        let mut store = CompanyStore::new();
        store.insert("B", vec![Record::numbered(1)]);
        store.insert("A", Vec::new());

        let previous = store.insert("B", vec![Record::titled("new")]);

        assert_eq!(previous.map(|r| r.len()), Some(1));
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(store.get("B").unwrap()[0].title, "new");
        assert_eq!(store.names_sorted(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(store.record_count(), 1);
    }

    #[test]
    fn rename_refuses_collisions() {
        let mut store = CompanyStore::new();
        store.insert("Acme", vec![Record::new()]);
        store.insert("Globex", Vec::new());

        assert!(!store.rename("Acme", "Globex"));
        assert!(store.rename("Acme", "Initech"));
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["Initech", "Globex"]);
        assert_eq!(store.get("Initech").unwrap().len(), 1);
    }

    #[test]
    fn renumber_only_touches_default_titles() {
        let mut numbered = Record::numbered(3);
        let mut custom = Record::titled("지원동기");
        let mut lookalike = Record::titled("문항 3번");

        assert!(numbered.renumber(2));
        assert_eq!(numbered.title, "문항 2");
        assert!(!custom.renumber(2));
        assert!(!lookalike.renumber(2));
        assert_eq!(lookalike.title, "문항 3번");
    }

    #[test]
    fn blank_ignores_title() {
        let mut record = Record::titled("제목");
        assert!(record.is_blank());
        record.answer_text.push('x');
        assert!(!record.is_blank());
    }
}

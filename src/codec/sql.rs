//! Flat row shape of the `questions` table. Each row carries its company
//! name, so a store turns into rows and back without a separate company
//! table.

use crate::models::{CompanyStore, Record, UNTITLED};

/// One row of the `questions` table, minus the auto-increment id. Optional
/// columns stay optional here because databases written by other tools may
/// hold `NULL`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRow {
    pub company_name: String,
    pub question_title: Option<String>,
    pub question_type: Option<String>,
    pub question_content: Option<String>,
    pub answer_content: Option<String>,
}

impl QuestionRow {
    fn from_record(company: &str, record: &Record) -> Self {
        Self {
            company_name: company.to_string(),
            question_title: Some(record.title.clone()),
            question_type: Some(record.question_type.clone()),
            question_content: Some(record.question_text.clone()),
            answer_content: Some(record.answer_text.clone()),
        }
    }

    fn into_record(self) -> Record {
        Record {
            title: self.question_title.unwrap_or_else(|| UNTITLED.to_string()),
            question_type: self.question_type.unwrap_or_default(),
            question_text: self.question_content.unwrap_or_default(),
            answer_text: self.answer_content.unwrap_or_default(),
        }
    }
}

/// One row per record, companies in store order, records in list order.
pub fn export_rows(store: &CompanyStore) -> Vec<QuestionRow> {
    store
        .iter()
        .flat_map(|(company, records)| {
            records
                .iter()
                .map(move |record| QuestionRow::from_record(company, record))
        })
        .collect()
}

/// Group rows by company. Companies appear in the order they are first seen
/// and rows keep their relative order as record order.
pub fn import_rows<I>(rows: I) -> CompanyStore
where
    I: IntoIterator<Item = QuestionRow>,
{
    let mut store = CompanyStore::new();
    for row in rows {
        let company = row.company_name.clone();
        store.entry(&company).push(row.into_record());
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company: &str, title: Option<&str>) -> QuestionRow {
        QuestionRow {
            company_name: company.to_string(),
            question_title: title.map(str::to_string),
            question_type: None,
            question_content: Some("q".into()),
            answer_content: None,
        }
    }

    #[test]
    fn export_denormalizes_company_name() {
        let mut store = CompanyStore::new();
        store.insert("B", vec![Record::numbered(1), Record::numbered(2)]);
        store.insert("A", vec![Record::titled("x")]);
        store.insert("Empty", Vec::new());

        let rows = export_rows(&store);
        let companies: Vec<_> = rows.iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(companies, vec!["B", "B", "A"]);
        assert_eq!(rows[1].question_title.as_deref(), Some("문항 2"));
    }

    #[test]
    fn import_groups_interleaved_rows_in_order() {
        let store = import_rows(vec![
            row("A", Some("a1")),
            row("B", Some("b1")),
            row("A", Some("a2")),
        ]);

        assert_eq!(store.names().collect::<Vec<_>>(), vec!["A", "B"]);
        let titles: Vec<_> = store.get("A").unwrap().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "a2"]);
    }

    #[test]
    fn import_fills_nulls_with_defaults() {
        let store = import_rows(vec![row("A", None)]);
        let record = &store.get("A").unwrap()[0];
        assert_eq!(record.title, UNTITLED);
        assert_eq!(record.question_type, "");
        assert_eq!(record.question_text, "q");
        assert_eq!(record.answer_text, "");
    }

    #[test]
    fn rows_round_trip_records() {
        let mut store = CompanyStore::new();
        store.insert(
            "Acme",
            vec![Record {
                title: "지원동기".into(),
                question_type: "자기소개".into(),
                question_text: "왜?\n\n정말로".into(),
                answer_text: "".into(),
            }],
        );
        store.insert("Globex", vec![Record::numbered(1)]);

        assert_eq!(import_rows(export_rows(&store)), store);
    }
}

//! Case-insensitive search across every stored record.

use std::fmt;

use crate::models::CompanyStore;

/// Record field a query matched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Type,
    Question,
    Answer,
}

impl SearchField {
    pub fn label(self) -> &'static str {
        match self {
            SearchField::Title => "제목",
            SearchField::Type => "유형",
            SearchField::Question => "질문",
            SearchField::Answer => "답변",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A record that matched in at least one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub company: String,
    /// Zero-based position in the company's record list.
    pub record_index: usize,
    pub title: String,
    pub fields: Vec<SearchField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchReport {
    EmptyQuery,
    Hits { query: String, hits: Vec<SearchHit> },
}

impl SearchReport {
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            SearchReport::EmptyQuery => &[],
            SearchReport::Hits { hits, .. } => hits,
        }
    }

    /// Plain-text report shown in the search view and printed by the CLI.
    pub fn render(&self) -> String {
        match self {
            SearchReport::EmptyQuery => "검색어를 입력해주세요.".to_string(),
            SearchReport::Hits { query, hits } if hits.is_empty() => {
                format!("'{query}'에 해당하는 항목을 찾을 수 없습니다.")
            }
            SearchReport::Hits { hits, .. } => {
                let mut out = format!("총 {}개의 항목을 찾았습니다.\n\n", hits.len());
                for hit in hits {
                    let fields: Vec<&str> = hit.fields.iter().map(|f| f.label()).collect();
                    out.push_str(&format!(
                        "회사: {}\n   - 문항: {}\n   - 검색 일치: {}에서 발견\n\n",
                        hit.company,
                        hit.title,
                        fields.join(", ")
                    ));
                }
                out.trim_end().to_string()
            }
        }
    }
}

/// Search titles, types, questions and answers for `query`.
pub fn search(store: &CompanyStore, query: &str) -> SearchReport {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SearchReport::EmptyQuery;
    }

    let mut hits = Vec::new();
    for (company, records) in store.iter() {
        for (index, record) in records.iter().enumerate() {
            let title = record.display_title(index + 1);
            let fields: Vec<SearchField> = [
                (SearchField::Title, title.as_str()),
                (SearchField::Type, record.question_type.as_str()),
                (SearchField::Question, record.question_text.as_str()),
                (SearchField::Answer, record.answer_text.as_str()),
            ]
            .into_iter()
            .filter(|(_, content)| content.to_lowercase().contains(&needle))
            .map(|(field, _)| field)
            .collect();

            if !fields.is_empty() {
                hits.push(SearchHit {
                    company: company.to_string(),
                    record_index: index,
                    title,
                    fields,
                });
            }
        }
    }

    SearchReport::Hits {
        query: needle,
        hits,
    }
}

//! The tagged text format used for saving and loading essay drafts.
//!
//! ```text
//! [회사명]: Acme
//! --- 문항 시작 ---
//! <<제목>>: 지원동기
//! <<유형>>: 자기소개
//! <<질문>>
//! 왜 지원했나요?
//! <<답변>>
//! 성장하고 싶어서입니다.
//! --- 문항 끝 ---
//! === 회사 끝 ===
//! ```
//!
//! Parsing is lenient: tags outside the context they belong to are dropped
//! and never reported. Only "no company at all" is an error, and only through
//! [`parse_text_checked`].

use tracing::trace;

use crate::error::{CoreError, Result};
use crate::models::{CompanyStore, Record};

pub const COMPANY_TAG: &str = "[회사명]:";
pub const RECORD_START: &str = "--- 문항 시작 ---";
pub const TITLE_TAG: &str = "<<제목>>:";
pub const TYPE_TAG: &str = "<<유형>>:";
pub const QUESTION_TAG: &str = "<<질문>>";
pub const ANSWER_TAG: &str = "<<답변>>";
pub const RECORD_END: &str = "--- 문항 끝 ---";
pub const COMPANY_END: &str = "=== 회사 끝 ===";

/// Which accumulator content lines go to while a record is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Question,
    Answer,
}

/// Parser position. A record may be opened before any company header has
/// been seen; it can then never be closed and is dropped at the next header.
#[derive(Debug)]
enum State {
    NoCompany,
    InCompany {
        company: String,
    },
    InRecord {
        company: Option<String>,
        record: Record,
        section: Section,
    },
}

/// One classified input line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Company(&'a str),
    RecordStart,
    Title(&'a str),
    Type(&'a str),
    Question,
    Answer,
    RecordEnd,
    Content(&'a str),
}

impl<'a> Line<'a> {
    fn classify(line: &'a str) -> Self {
        if line.is_empty() {
            Line::Blank
        } else if line.starts_with(COMPANY_TAG) {
            Line::Company(tag_value(line))
        } else if line == RECORD_START {
            Line::RecordStart
        } else if line.starts_with(TITLE_TAG) {
            Line::Title(tag_value(line))
        } else if line.starts_with(TYPE_TAG) {
            Line::Type(tag_value(line))
        } else if line == QUESTION_TAG {
            Line::Question
        } else if line == ANSWER_TAG {
            Line::Answer
        } else if line == RECORD_END {
            Line::RecordEnd
        } else {
            Line::Content(line)
        }
    }
}

/// Everything after the first `:` of a tag line, trimmed.
fn tag_value(line: &str) -> &str {
    line.split_once(':')
        .map(|(_, value)| value.trim())
        .unwrap_or_default()
}

struct Parser {
    store: CompanyStore,
    state: State,
}

impl Parser {
    fn new() -> Self {
        Self {
            store: CompanyStore::new(),
            state: State::NoCompany,
        }
    }

    fn feed(&mut self, raw: &str) {
        let line = Line::classify(raw);
        let state = std::mem::replace(&mut self.state, State::NoCompany);
        self.state = match (state, line) {
            (
                State::InRecord {
                    company,
                    mut record,
                    section,
                },
                Line::Blank,
            ) => {
                push_content(&mut record, section, "");
                State::InRecord {
                    company,
                    record,
                    section,
                }
            }
            (_, Line::Company(name)) => self.open_company(name),
            (state, Line::RecordStart) => State::InRecord {
                company: current_company(state),
                record: Record::new(),
                section: Section::Question,
            },
            (
                State::InRecord {
                    company,
                    mut record,
                    section,
                },
                line,
            ) => match line {
                Line::Title(value) => {
                    record.title = value.to_string();
                    State::InRecord {
                        company,
                        record,
                        section,
                    }
                }
                Line::Type(value) => {
                    record.question_type = value.to_string();
                    State::InRecord {
                        company,
                        record,
                        section,
                    }
                }
                Line::Question => State::InRecord {
                    company,
                    record,
                    section: Section::Question,
                },
                Line::Answer => State::InRecord {
                    company,
                    record,
                    section: Section::Answer,
                },
                Line::RecordEnd => match company {
                    Some(company) => {
                        self.store.entry(&company).push(record);
                        State::InCompany { company }
                    }
                    None => {
                        trace!("ignoring record end outside of a company");
                        State::InRecord {
                            company: None,
                            record,
                            section,
                        }
                    }
                },
                Line::Content(text) => {
                    push_content(&mut record, section, text);
                    State::InRecord {
                        company,
                        record,
                        section,
                    }
                }
                Line::Blank | Line::Company(_) | Line::RecordStart => State::InRecord {
                    company,
                    record,
                    section,
                },
            },
            (state, line) => {
                if line != Line::Blank {
                    trace!(?line, "dropping line outside of a question block");
                }
                state
            }
        };
    }

    fn open_company(&mut self, name: &str) -> State {
        if name.is_empty() {
            trace!("ignoring company header without a name");
            return State::NoCompany;
        }
        self.store.entry(name);
        State::InCompany {
            company: name.to_string(),
        }
    }

    fn finish(self) -> CompanyStore {
        if let State::InRecord { record, .. } = &self.state {
            trace!(title = %record.title, "dropping unterminated question block");
        }
        self.store
            .into_iter()
            .map(|(name, records)| {
                let records = records
                    .into_iter()
                    .map(|mut record| {
                        record.question_text = record.question_text.trim().to_string();
                        record.answer_text = record.answer_text.trim().to_string();
                        record
                    })
                    .collect();
                (name, records)
            })
            .collect()
    }
}

fn current_company(state: State) -> Option<String> {
    match state {
        State::NoCompany => None,
        State::InCompany { company } => Some(company),
        State::InRecord { company, .. } => company,
    }
}

fn push_content(record: &mut Record, section: Section, text: &str) {
    let target = match section {
        Section::Question => &mut record.question_text,
        Section::Answer => &mut record.answer_text,
    };
    target.push_str(text);
    target.push('\n');
}

/// Parse the tagged text format into a partial store.
///
/// Never fails: malformed or out-of-context lines are dropped. Re-declaring
/// a company within the same text appends to its existing list.
pub fn parse_text(content: &str) -> CompanyStore {
    let mut parser = Parser::new();
    for line in content.trim().split('\n') {
        parser.feed(line.trim());
    }
    parser.finish()
}

/// [`parse_text`], reporting [`CoreError::EmptyParse`] when no company was
/// found.
pub fn parse_text_checked(content: &str) -> Result<CompanyStore> {
    let parsed = parse_text(content);
    if parsed.is_empty() {
        Err(CoreError::EmptyParse)
    } else {
        Ok(parsed)
    }
}

/// Render the store (or only `company` when it names a stored company) in
/// the tagged text format. Companies appear in store order.
pub fn format_text(store: &CompanyStore, company: Option<&str>) -> String {
    let mut out = String::new();
    match company.and_then(|name| store.get(name).map(|records| (name, records))) {
        Some((name, records)) => write_company(&mut out, name, records),
        None => {
            for (name, records) in store.iter() {
                write_company(&mut out, name, records);
            }
        }
    }
    out.trim().to_string()
}

fn write_company(out: &mut String, name: &str, records: &[Record]) {
    out.push_str(&format!("{COMPANY_TAG} {name}\n"));
    for record in records {
        out.push_str(RECORD_START);
        out.push('\n');
        out.push_str(&format!("{TITLE_TAG} {}\n", record.title));
        out.push_str(&format!("{TYPE_TAG} {}\n", record.question_type));
        out.push_str(QUESTION_TAG);
        out.push('\n');
        out.push_str(&record.question_text);
        out.push('\n');
        out.push_str(ANSWER_TAG);
        out.push('\n');
        out.push_str(&record.answer_text);
        out.push('\n');
        out.push_str(RECORD_END);
        out.push('\n');
    }
    out.push_str(COMPANY_END);
    out.push_str("\n\n");
}

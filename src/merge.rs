use tracing::debug;

use crate::models::{CompanyStore, PartialStore};

/// What a merge contributed, for user feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Distinct companies taken from the incoming store.
    pub merged_count: usize,
    /// First incoming company, used to move the selection after a load.
    pub first_key: Option<String>,
}

/// Merge a freshly loaded partial store into `base`.
///
/// Each incoming company replaces the whole record list of the same-named
/// company in `base`; there is no per-record merge. Companies absent from
/// `incoming` are untouched and keep their position. New companies are
/// appended in incoming order.
pub fn merge_into(base: &mut CompanyStore, incoming: PartialStore) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    for (name, records) in incoming {
        if outcome.first_key.is_none() {
            outcome.first_key = Some(name.clone());
        }
        let replaced = base.insert(name.clone(), records);
        debug!(company = %name, replaced = replaced.is_some(), "merged company");
        outcome.merged_count += 1;
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn store(entries: &[(&str, &[&str])]) -> CompanyStore {
        entries
            .iter()
            .map(|(name, titles)| {
                (
                    name.to_string(),
                    titles.iter().map(|t| Record::titled(*t)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn merging_nothing_is_a_no_op() {
        let mut base = store(&[("A", &["a1"]), ("B", &[])]);
        let before = base.clone();

        let outcome = merge_into(&mut base, CompanyStore::new());

        assert_eq!(base, before);
        assert_eq!(outcome, MergeOutcome::default());
    }

    #[test]
    fn colliding_company_is_overwritten_wholesale() {
        let mut base = store(&[("A", &["a1", "a2", "a3"]), ("B", &["b1"])]);

        let outcome = merge_into(&mut base, store(&[("A", &["new"])]));

        assert_eq!(base.get("A").unwrap(), &vec![Record::titled("new")]);
        assert_eq!(base.get("B").unwrap(), &vec![Record::titled("b1")]);
        assert_eq!(base.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(outcome.merged_count, 1);
        assert_eq!(outcome.first_key.as_deref(), Some("A"));
    }

    #[test]
    fn new_companies_are_appended_and_counted() {
        let mut base = store(&[("A", &[])]);

        let outcome = merge_into(&mut base, store(&[("C", &["c"]), ("B", &[]), ("A", &["x"])]));

        assert_eq!(base.names().collect::<Vec<_>>(), vec!["A", "C", "B"]);
        assert_eq!(outcome.merged_count, 3);
        assert_eq!(outcome.first_key.as_deref(), Some("C"));
    }
}

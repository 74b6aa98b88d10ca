use crate::search::{SearchHit, SearchReport};

/// Results of a search across every company, with a movable selection so a
/// hit can be opened.
pub(crate) struct SearchScreen {
    pub(crate) report: SearchReport,
    pub(crate) selected: usize,
}

impl SearchScreen {
    pub(crate) fn new(report: SearchReport) -> Self {
        Self {
            report,
            selected: 0,
        }
    }

    pub(crate) fn hits(&self) -> &[SearchHit] {
        self.report.hits()
    }

    pub(crate) fn current_hit(&self) -> Option<&SearchHit> {
        self.hits().get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = self.hits().len();
        if len == 0 {
            return;
        }
        let new = (self.selected as isize + offset).clamp(0, len as isize - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.hits().len().saturating_sub(1);
    }

    /// Summary line above the hit list.
    pub(crate) fn summary(&self) -> String {
        match &self.report {
            SearchReport::Hits { hits, .. } if !hits.is_empty() => {
                format!("총 {}개의 항목을 찾았습니다.", hits.len())
            }
            report => report.render(),
        }
    }
}

/// Active query being typed in the search bar.
pub(crate) struct SearchState {
    pub(crate) query: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanyStore, Record};
    use crate::search::search;

    #[test]
    fn selection_stays_in_bounds() {
        let mut store = CompanyStore::new();
        store.insert("A", vec![Record::numbered(1), Record::numbered(2)]);
        let mut screen = SearchScreen::new(search(&store, "문항"));

        screen.move_selection(5);
        assert_eq!(screen.selected, 1);
        screen.move_selection(-5);
        assert_eq!(screen.selected, 0);
        screen.select_last();
        assert_eq!(screen.current_hit().unwrap().record_index, 1);
        assert_eq!(screen.summary(), "총 2개의 항목을 찾았습니다.");
    }

    #[test]
    fn empty_results_never_select() {
        let mut screen = SearchScreen::new(search(&CompanyStore::new(), "x"));
        screen.move_selection(1);
        screen.select_last();
        assert!(screen.current_hit().is_none());
        assert_eq!(screen.summary(), "'x'에 해당하는 항목을 찾을 수 없습니다.");
    }
}

//! State behind the contacts list screen.
//!
//! The view never performs I/O. The caller asks [`ContactListView::needs_fetch`],
//! calls [`ContactListView::begin_fetch`] to get the query to run, and hands the
//! outcome back through [`ContactListView::finish_fetch`]. While a request is
//! in flight the previous page stays on screen.

use shared_types::{Contact, ContactsResponse, PaginationMeta, DEFAULT_LIMIT, DEFAULT_PAGE};
use std::collections::HashSet;
use std::time::Instant;

use super::debounce::Debouncer;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub page: i64,
    pub search: String,
}

impl QueryKey {
    pub fn search(&self) -> Option<&str> {
        if self.search.is_empty() {
            None
        } else {
            Some(&self.search)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListStats {
    pub total: i64,
    /// Distinct non-empty companies among the contacts currently displayed.
    pub unique_companies: usize,
}

#[derive(Debug)]
pub struct ContactListView {
    search_input: String,
    debouncer: Debouncer<String>,
    search: String,
    page: i64,
    limit: i64,
    response: Option<ContactsResponse>,
    loaded: Option<QueryKey>,
    in_flight: Option<QueryKey>,
    stale: bool,
    error: Option<String>,
}

impl Default for ContactListView {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl ContactListView {
    pub fn new(limit: i64) -> Self {
        Self {
            search_input: String::new(),
            debouncer: Debouncer::default(),
            search: String::new(),
            page: DEFAULT_PAGE,
            limit,
            response: None,
            loaded: None,
            in_flight: None,
            stale: true,
            error: None,
        }
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn set_search_input(&mut self, input: impl Into<String>, now: Instant) {
        self.search_input = input.into();
        self.debouncer.push(self.search_input.clone(), now);
    }

    /// Applies a settled search term. Returns true when the applied search
    /// changed, in which case the page is back at 1.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(search) if search != self.search => {
                tracing::debug!("Search settled on {:?}", search);
                self.search = search;
                self.page = DEFAULT_PAGE;
                true
            }
            _ => false,
        }
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn query_key(&self) -> QueryKey {
        QueryKey {
            page: self.page,
            search: self.search.clone(),
        }
    }

    pub fn needs_fetch(&self) -> bool {
        let key = self.query_key();
        if self.in_flight.as_ref() == Some(&key) {
            return false;
        }
        self.stale || self.loaded.as_ref() != Some(&key)
    }

    pub fn begin_fetch(&mut self) -> QueryKey {
        let key = self.query_key();
        self.in_flight = Some(key.clone());
        self.stale = false;
        key
    }

    /// Stores the outcome of a fetch. Responses are applied in arrival
    /// order, so a slow answer for an older key can replace a newer one.
    pub fn finish_fetch(&mut self, key: QueryKey, result: Result<ContactsResponse, String>) {
        if self.in_flight.as_ref() == Some(&key) {
            self.in_flight = None;
        }

        match result {
            Ok(response) => {
                self.response = Some(response);
                self.loaded = Some(key);
                self.error = None;
            }
            Err(message) => {
                tracing::warn!("Unable to load contacts: {}", message);
                self.error = Some(message);
            }
        }
    }

    /// Marks the current data stale so the next `needs_fetch` is true.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Loading with nothing yet to show.
    pub fn is_loading_first(&self) -> bool {
        self.is_loading() && self.response.is_none()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn contacts(&self) -> &[Contact] {
        self.response
            .as_ref()
            .map(|r| r.data.as_slice())
            .unwrap_or(&[])
    }

    pub fn meta(&self) -> Option<&PaginationMeta> {
        self.response.as_ref().map(|r| &r.meta)
    }

    pub fn can_previous(&self) -> bool {
        self.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.meta().map_or(false, |m| self.page < m.total_pages)
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn next_page(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn stats(&self) -> ListStats {
        let unique_companies = self
            .contacts()
            .iter()
            .filter_map(|c| c.company.as_deref())
            .filter(|c| !c.is_empty())
            .collect::<HashSet<_>>()
            .len();

        ListStats {
            total: self.meta().map_or(0, |m| m.total),
            unique_companies,
        }
    }

    /// Pagination is only shown when there is more than one page.
    pub fn pagination_summary(&self) -> Option<String> {
        let meta = self.meta()?;
        if meta.total_pages <= 1 {
            return None;
        }

        let from = (meta.page - 1) * meta.limit + 1;
        let to = (meta.page * meta.limit).min(meta.total);
        Some(format!(
            "Showing {} to {} of {} results",
            from, to, meta.total
        ))
    }

    /// Title and hint for an empty list, or `None` when there is something
    /// to show.
    pub fn empty_state(&self) -> Option<(String, String)> {
        if self.is_loading() || self.error.is_some() || self.response.is_none() {
            return None;
        }
        if !self.contacts().is_empty() {
            return None;
        }

        if self.search_input.is_empty() {
            Some((
                "No contacts yet".to_string(),
                "Get started by creating your first contact with :a.".to_string(),
            ))
        } else {
            Some((
                "No contacts found".to_string(),
                format!(
                    "We couldn't find any contacts matching \"{}\". Try different keywords.",
                    self.search_input
                ),
            ))
        }
    }
}

//! Keeps page/search state and the navigation stack in step, and decides
//! which fetch results are still wanted.
//!
//! Every dispatch gets a [`Ticket`]. A result is applied only when its ticket
//! is the newest one issued, or when it answers the same request as the
//! newest one (a cached or shared response for identical parameters).

use std::fmt;

use shelf_types::{SearchQuery, clamp_page};

use crate::location::{Location, NavigationHistory};

/// Monotonic dispatch sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What to fetch for the current location.
///
/// Search results are paginated locally, so the page is not part of a
/// search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Page(u32),
    Search(SearchQuery),
}

impl FetchRequest {
    fn for_location(location: &Location) -> Self {
        if location.query().is_empty() {
            FetchRequest::Page(location.page())
        } else {
            FetchRequest::Search(location.query().clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub ticket: Ticket,
    pub request: FetchRequest,
}

#[derive(Debug)]
pub struct QueryCoordinator {
    nav: NavigationHistory,
    /// Total pages of the listing currently shown, once a response has told us.
    known_total: Option<u32>,
    next_ticket: u64,
    latest: Option<Dispatch>,
    /// Set after a clamp re-dispatch so a second overflow cannot loop.
    clamped: bool,
}

impl QueryCoordinator {
    #[must_use]
    pub fn new(initial: Location) -> Self {
        Self {
            nav: NavigationHistory::new(initial),
            known_total: None,
            next_ticket: 0,
            latest: None,
            clamped: false,
        }
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        self.nav.current()
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.location().page()
    }

    #[must_use]
    pub fn query(&self) -> &SearchQuery {
        self.location().query()
    }

    #[must_use]
    pub fn known_total(&self) -> Option<u32> {
        self.known_total
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Dispatch> {
        self.latest.as_ref()
    }

    #[must_use]
    pub fn navigation(&self) -> &NavigationHistory {
        &self.nav
    }

    fn issue(&mut self) -> Dispatch {
        self.next_ticket += 1;
        let dispatch = Dispatch {
            ticket: Ticket(self.next_ticket),
            request: FetchRequest::for_location(self.location()),
        };
        tracing::debug!(
            ticket = %dispatch.ticket,
            location = %self.location(),
            "dispatch"
        );
        self.latest = Some(dispatch.clone());
        dispatch
    }

    /// Adopt `location` as the current entry (startup or back/forward) and
    /// fetch for it. The page is clamped against the known total when the
    /// query is unchanged; a clamped page rewrites the entry.
    pub fn sync_from_location(&mut self, location: Location) -> Dispatch {
        if location.query() != self.query() {
            self.known_total = None;
        }
        let page = clamp_page(location.page(), self.known_total);
        let adopted = if page == location.page() {
            location
        } else {
            tracing::debug!(
                requested = location.page(),
                clamped = page,
                "clamping location page"
            );
            location.with_page(page)
        };
        self.nav.replace(adopted);
        self.clamped = false;
        self.issue()
    }

    /// User-initiated page change. Pages outside `[1, total]` and the
    /// current page are ignored.
    pub fn change_page(&mut self, page: u32) -> Option<Dispatch> {
        if page < 1 || page == self.page() {
            return None;
        }
        if self.known_total.is_some_and(|total| page > total) {
            tracing::debug!(page, total = ?self.known_total, "page change out of range ignored");
            return None;
        }
        let next = self.location().with_page(page);
        self.nav.push(next);
        self.clamped = false;
        Some(self.issue())
    }

    /// Submit a search (or an empty query to clear). Resets to page 1.
    pub fn search(&mut self, query: SearchQuery) -> Dispatch {
        if &query != self.query() {
            self.known_total = None;
        }
        let next = self.location().with_query(query);
        self.nav.push(next);
        self.clamped = false;
        self.issue()
    }

    pub fn back(&mut self) -> Option<Dispatch> {
        let location = self.nav.back()?.clone();
        Some(self.sync_from_location(location))
    }

    pub fn forward(&mut self) -> Option<Dispatch> {
        let location = self.nav.forward()?.clone();
        Some(self.sync_from_location(location))
    }

    /// Re-issue the latest request under a fresh ticket.
    pub fn retry(&mut self) -> Option<Dispatch> {
        self.latest.as_ref()?;
        Some(self.issue())
    }

    /// Whether a result for `ticket`/`request` should be applied.
    #[must_use]
    pub fn accepts(&self, ticket: Ticket, request: &FetchRequest) -> bool {
        match &self.latest {
            Some(latest) => latest.ticket == ticket || latest.request == *request,
            None => false,
        }
    }

    /// Record the total page count reported by an applied result. When the
    /// current page lies beyond it, the page is clamped, the current entry is
    /// replaced, and one follow-up dispatch is returned.
    pub fn observe_total(&mut self, total_pages: u32) -> Option<Dispatch> {
        let total = total_pages.max(1);
        self.known_total = Some(total);
        if self.page() <= total || self.clamped {
            return None;
        }
        tracing::debug!(page = self.page(), total, "page beyond total; re-dispatching");
        let clamped = self.location().with_page(total);
        self.nav.replace(clamped);
        self.clamped = true;
        Some(self.issue())
    }
}

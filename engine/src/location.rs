//! `?page=N&q=text` locations and the back/forward stack over them.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use shelf_types::SearchQuery;
use url::form_urlencoded;

/// Page and query as carried in the location bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    page: u32,
    query: SearchQuery,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            page: 1,
            query: SearchQuery::empty(),
        }
    }
}

impl Location {
    /// Page 0 is treated as page 1.
    #[must_use]
    pub fn new(page: u32, query: SearchQuery) -> Self {
        Self {
            page: page.max(1),
            query,
        }
    }

    /// Parse a query string. A leading `?` is optional. Missing, non-numeric
    /// or zero `page` becomes 1; the first occurrence of a key wins.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let raw = raw.strip_prefix('/').unwrap_or(raw);
        let raw = raw.strip_prefix('?').unwrap_or(raw);

        let mut page = None;
        let mut query = None;
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "page" if page.is_none() => page = Some(value.trim().parse::<u32>().unwrap_or(1)),
                "q" if query.is_none() => query = Some(SearchQuery::new(value.into_owned())),
                _ => {}
            }
        }

        Self::new(page.unwrap_or(1), query.unwrap_or_default())
    }

    /// Encoded parameters without the leading `?`. Defaults are omitted.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if self.page > 1 {
            serializer.append_pair("page", &self.page.to_string());
        }
        if !self.query.is_empty() {
            serializer.append_pair("q", self.query.as_str());
        }
        serializer.finish()
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self::new(page, self.query.clone())
    }

    /// New query, back on page 1.
    #[must_use]
    pub fn with_query(&self, query: SearchQuery) -> Self {
        Self::new(1, query)
    }
}

impl FromStr for Location {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query = self.to_query_string();
        if query.is_empty() {
            f.write_str("/")
        } else {
            write!(f, "/?{query}")
        }
    }
}

/// Back/forward stack. Never empty.
#[derive(Debug, Clone)]
pub struct NavigationHistory {
    entries: Vec<Location>,
    cursor: usize,
}

impl NavigationHistory {
    #[must_use]
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    #[must_use]
    pub fn current(&self) -> &Location {
        &self.entries[self.cursor]
    }

    /// Push a new entry, discarding anything forward of the cursor.
    /// Pushing the current location again is a no-op.
    pub fn push(&mut self, location: Location) -> bool {
        if *self.current() == location {
            return false;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(location);
        self.cursor = self.entries.len() - 1;
        true
    }

    pub fn replace(&mut self, location: Location) {
        self.entries[self.cursor] = location;
    }

    pub fn back(&mut self) -> Option<&Location> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&Location> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        assert_eq!(Location::parse(""), Location::default());
        assert_eq!(Location::parse("?"), Location::default());
        assert_eq!(Location::parse("?page=abc").page(), 1);
        assert_eq!(Location::parse("?page=0").page(), 1);
        assert_eq!(Location::parse("?page=-3").page(), 1);
    }

    #[test]
    fn parse_reads_page_and_trimmed_query() {
        let location = Location::parse("?page=3&q=+half-life+");
        assert_eq!(location.page(), 3);
        assert_eq!(location.query().as_str(), "half-life");

        let location = Location::parse("page=2&q=portal%202");
        assert_eq!(location.page(), 2);
        assert_eq!(location.query().as_str(), "portal 2");
    }

    #[test]
    fn first_occurrence_wins() {
        let location = Location::parse("?page=4&page=9&q=a&q=b");
        assert_eq!(location.page(), 4);
        assert_eq!(location.query().as_str(), "a");
    }

    #[test]
    fn serialization_omits_defaults() {
        assert_eq!(Location::default().to_query_string(), "");
        assert_eq!(Location::default().to_string(), "/");
        let location = Location::new(1, SearchQuery::new("portal"));
        assert_eq!(location.to_query_string(), "q=portal");
        let location = Location::new(5, SearchQuery::new("half life"));
        assert_eq!(location.to_string(), "/?page=5&q=half+life");
        assert_eq!(Location::parse(&location.to_string()), location);
    }

    #[test]
    fn with_query_resets_page() {
        let location = Location::new(7, SearchQuery::empty());
        let searched = location.with_query(SearchQuery::new("rpg"));
        assert_eq!(searched.page(), 1);
        assert_eq!(searched.query().as_str(), "rpg");
    }

    #[test]
    fn push_truncates_forward_entries() {
        let mut nav = NavigationHistory::new(Location::default());
        assert!(nav.push(Location::new(2, SearchQuery::empty())));
        assert!(nav.push(Location::new(3, SearchQuery::empty())));
        assert_eq!(nav.back().map(Location::page), Some(2));
        assert!(nav.can_go_forward());

        nav.push(Location::new(9, SearchQuery::empty()));
        assert!(!nav.can_go_forward());
        assert_eq!(nav.len(), 3);
        assert_eq!(nav.back().map(Location::page), Some(2));
        assert_eq!(nav.back().map(Location::page), Some(1));
        assert!(nav.back().is_none());
        assert_eq!(nav.forward().map(Location::page), Some(2));
    }

    #[test]
    fn push_of_current_is_ignored() {
        let mut nav = NavigationHistory::new(Location::default());
        assert!(!nav.push(Location::default()));
        assert_eq!(nav.len(), 1);
    }

    #[test]
    fn replace_keeps_cursor() {
        let mut nav = NavigationHistory::new(Location::default());
        nav.push(Location::new(40, SearchQuery::empty()));
        nav.replace(Location::new(10, SearchQuery::empty()));
        assert_eq!(nav.current().page(), 10);
        assert_eq!(nav.len(), 2);
    }
}

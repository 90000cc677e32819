//! Route selection. [`Route`] is the closed set of views; [`Router`] keeps the
//! active route and a navigable [`History`] fragment in step with each other.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The views the site can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Home,
    Content,
    Resources,
    Search,
}

impl Default for Route {
    fn default() -> Self {
        Route::Home
    }
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Home, Route::Content, Route::Resources, Route::Search];

    /// Resolves a navigation fragment to a route. A leading `#` is ignored;
    /// empty and unrecognized fragments resolve to [`Route::Home`].
    pub fn from_fragment(fragment: &str) -> Route {
        match fragment.trim_start_matches('#') {
            "content" => Route::Content,
            "resources" => Route::Resources,
            "search" => Route::Search,
            _ => Route::Home,
        }
    }

    /// The fragment naming this route, without the leading `#`.
    pub fn fragment(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Content => "content",
            Route::Resources => "resources",
            Route::Search => "search",
        }
    }

    /// The navigation label for this route.
    pub fn label(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Content => "Content",
            Route::Resources => "Resources",
            Route::Search => "Search",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.fragment())
    }
}

/// The platform's navigable history: something that holds a current fragment
/// and can have new entries pushed onto it. Back/forward navigation happens
/// outside the router; the router is told about it through
/// [`Router::on_history_change`].
pub trait History {
    /// The current fragment, without the leading `#`.
    fn fragment(&self) -> String;

    /// Pushes a new entry with the given fragment.
    fn push(&mut self, fragment: &str);
}

/// An in-memory [`History`] with back and forward navigation.
#[derive(Clone, Debug, Default)]
pub struct MemoryHistory {
    entries: Vec<String>,
    position: usize,
}

impl MemoryHistory {
    /// Starts a history whose only entry is `fragment` (which may be empty, as
    /// for a page loaded without a fragment).
    pub fn new(fragment: &str) -> MemoryHistory {
        MemoryHistory {
            entries: vec![fragment.trim_start_matches('#').to_owned()],
            position: 0,
        }
    }

    /// Steps back one entry. Returns `false` at the first entry.
    pub fn back(&mut self) -> bool {
        match self.position {
            0 => false,
            _ => {
                self.position -= 1;
                true
            }
        }
    }

    /// Steps forward one entry. Returns `false` at the last entry.
    pub fn forward(&mut self) -> bool {
        match self.position + 1 < self.entries.len() {
            false => false,
            true => {
                self.position += 1;
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl History for MemoryHistory {
    fn fragment(&self) -> String {
        self.entries
            .get(self.position)
            .cloned()
            .unwrap_or_default()
    }

    /// Pushing drops any forward entries, like a browser does.
    fn push(&mut self, fragment: &str) {
        self.entries.truncate(self.position + 1);
        self.entries.push(fragment.trim_start_matches('#').to_owned());
        self.position = self.entries.len() - 1;
    }
}

/// Keeps the active [`Route`] and the history fragment in sync. A route
/// change pushes a history entry only when the fragment actually differs, so
/// adopting a fragment never echoes back into the history.
pub struct Router<H> {
    history: H,
    route: Route,
}

impl<H: History> Router<H> {
    /// Creates a router whose initial route is read from the history's
    /// current fragment.
    pub fn new(history: H) -> Router<H> {
        let route = Route::from_fragment(&history.fragment());
        Router { history, route }
    }

    pub fn current_route(&self) -> Route {
        self.route
    }

    /// Selects `route` in response to a navigation control.
    pub fn navigate(&mut self, route: Route) {
        self.route = route;
        if self.history.fragment() != route.fragment() {
            self.history.push(route.fragment());
        }
    }

    /// Adopts the history's fragment after an external navigation (e.g.,
    /// back or forward) and returns the resulting route.
    pub fn on_history_change(&mut self) -> Route {
        self.route = Route::from_fragment(&self.history.fragment());
        self.route
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_fragment() {
        assert_eq!(Route::Content, Route::from_fragment("content"));
        assert_eq!(Route::Search, Route::from_fragment("#search"));
        assert_eq!(Route::Home, Route::from_fragment(""));
        assert_eq!(Route::Home, Route::from_fragment("about"));
        assert_eq!(Route::Home, Route::from_fragment("Content"));
    }

    #[test]
    fn test_fragment_round_trip() {
        for route in Route::ALL.iter() {
            assert_eq!(*route, Route::from_fragment(route.fragment()));
        }
    }

    #[test]
    fn test_initial_route_defaults_to_home() {
        assert_eq!(Route::Home, Router::new(MemoryHistory::new("")).current_route());
        assert_eq!(
            Route::Home,
            Router::new(MemoryHistory::new("#nowhere")).current_route()
        );
        assert_eq!(
            Route::Resources,
            Router::new(MemoryHistory::new("#resources")).current_route()
        );
    }

    #[test]
    fn test_navigate_updates_fragment() {
        let mut router = Router::new(MemoryHistory::new(""));
        router.navigate(Route::Content);
        assert_eq!(Route::Content, router.current_route());
        assert_eq!("content", router.history().fragment());
        assert_eq!(2, router.history().len());
    }

    #[test]
    fn test_navigate_to_same_fragment_does_not_push() {
        let mut router = Router::new(MemoryHistory::new("content"));
        router.navigate(Route::Content);
        assert_eq!(1, router.history().len());
    }

    #[test]
    fn test_back_navigation_does_not_push() {
        let mut router = Router::new(MemoryHistory::new(""));
        router.navigate(Route::Resources);
        router.navigate(Route::Content);
        assert_eq!(3, router.history().len());

        assert!(router.history_mut().back());
        assert_eq!(Route::Resources, router.on_history_change());
        assert_eq!("resources", router.history().fragment());
        assert_eq!(3, router.history().len());

        assert!(router.history_mut().back());
        assert_eq!(Route::Home, router.on_history_change());
        assert!(!router.history_mut().back());
    }

    #[test]
    fn test_push_drops_forward_entries() {
        let mut history = MemoryHistory::new("home");
        history.push("content");
        history.push("search");
        assert!(history.back());
        history.push("resources");
        assert_eq!(3, history.len());
        assert!(!history.forward());
        assert_eq!("resources", history.fragment());
    }
}

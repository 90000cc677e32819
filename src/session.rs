//! The interactive session: an explicit [`SessionState`] plus the router and
//! subscription service it drives. Events are applied one at a time, each to
//! completion, and subscribers are notified with the new state after every
//! event.

use crate::content::ContentStore;
use crate::paginate::clamp_page;
use crate::router::{History, Route, Router};
use crate::subscribe::{EmailAddress, Outcome, SubscriptionService};
use serde::{Deserialize, Serialize};

/// The two email-capture forms on the site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignupForm {
    /// The "Join" form in the footer of every page.
    Footer,

    /// The "Subscribe" call-to-action at the bottom of the home page.
    Cta,
}

impl SignupForm {
    /// The confirmation shown once the form has been submitted.
    pub fn confirmation(&self) -> &'static str {
        match self {
            SignupForm::Footer => "Thanks! You'll receive a confirmation email.",
            SignupForm::Cta => "Welcome aboard! Check your inbox.",
        }
    }
}

/// Everything the UI can change. Created with defaults on load and never
/// persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub route: Route,
    pub query: String,
    pub content_page: usize,
    pub resources_page: usize,
    pub menu_open: bool,
    pub footer_email: String,
    pub cta_email: String,

    /// A message for the user, such as a subscription confirmation.
    pub notice: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            route: Route::Home,
            query: String::new(),
            content_page: 1,
            resources_page: 1,
            menu_open: false,
            footer_email: String::new(),
            cta_email: String::new(),
            notice: None,
        }
    }
}

impl SessionState {
    pub fn email(&self, form: SignupForm) -> &str {
        match form {
            SignupForm::Footer => &self.footer_email,
            SignupForm::Cta => &self.cta_email,
        }
    }

    fn email_mut(&mut self, form: SignupForm) -> &mut String {
        match form {
            SignupForm::Footer => &mut self.footer_email,
            SignupForm::Cta => &mut self.cta_email,
        }
    }
}

/// A discrete user or platform event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A navigation control was selected.
    Navigate(Route),

    /// The history fragment changed outside the app (back/forward).
    HistoryChanged,

    /// The search box contents changed.
    QueryChanged(String),

    /// A page number was selected in one of the paginated listings.
    PageSelected(Route, usize),

    ToggleMenu,

    /// An email input changed.
    EmailChanged(SignupForm, String),

    /// An email form was submitted.
    Submit(SignupForm),
}

/// Sizes of the paginated listings.
#[derive(Clone, Copy, Debug)]
pub struct PageSizes {
    pub content: usize,
    pub resources: usize,
}

impl Default for PageSizes {
    fn default() -> Self {
        PageSizes {
            content: 6,
            resources: 4,
        }
    }
}

type Listener = Box<dyn FnMut(&SessionState)>;

/// Owns the session state and applies [`Event`]s to it.
pub struct Session<'a, H, S> {
    content: &'a ContentStore,
    router: Router<H>,
    subscriptions: S,
    page_sizes: PageSizes,
    site_root: String,
    state: SessionState,
    listeners: Vec<Listener>,
}

impl<'a, H: History, S: SubscriptionService> Session<'a, H, S> {
    /// Starts a session. The initial route comes from the history's current
    /// fragment; everything else starts at its default.
    pub fn new(
        content: &'a ContentStore,
        history: H,
        subscriptions: S,
        page_sizes: PageSizes,
        site_root: &str,
    ) -> Session<'a, H, S> {
        let router = Router::new(history);
        let state = SessionState {
            route: router.current_route(),
            ..SessionState::default()
        };
        Session {
            content,
            router,
            subscriptions,
            page_sizes,
            site_root: site_root.to_owned(),
            state,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn content(&self) -> &'a ContentStore {
        self.content
    }

    pub fn page_sizes(&self) -> PageSizes {
        self.page_sizes
    }

    pub fn router(&self) -> &Router<H> {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router<H> {
        &mut self.router
    }

    pub fn subscriptions(&self) -> &S {
        &self.subscriptions
    }

    /// Registers a listener called with the new state after every applied
    /// event.
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionState) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The URL of the page currently shown, sent along with subscriptions.
    pub fn page_url(&self) -> String {
        format!(
            "{}#{}",
            self.site_root.trim_end_matches('#'),
            self.state.route.fragment()
        )
    }

    /// Applies a single event and notifies listeners. A notice is shown once:
    /// moving to another route or editing an email input dismisses it.
    pub fn apply(&mut self, event: Event) {
        tracing::debug!(?event, "applying event");
        match event {
            Event::Navigate(route) => {
                self.router.navigate(route);
                self.state.route = self.router.current_route();
                self.state.menu_open = false;
                self.state.notice = None;
            }
            Event::HistoryChanged => {
                self.state.route = self.router.on_history_change();
                self.state.notice = None;
            }
            Event::QueryChanged(query) => self.state.query = query,
            Event::PageSelected(route, page) => self.select_page(route, page),
            Event::ToggleMenu => self.state.menu_open = !self.state.menu_open,
            Event::EmailChanged(form, email) => {
                *self.state.email_mut(form) = email;
                self.state.notice = None;
            }
            Event::Submit(form) => self.submit(form),
        }
        for listener in self.listeners.iter_mut() {
            listener(&self.state);
        }
    }

    fn select_page(&mut self, route: Route, page: usize) {
        match route {
            Route::Content => {
                self.state.content_page = clamp_page(
                    page,
                    self.content.newsletters().len(),
                    self.page_sizes.content,
                )
            }
            Route::Resources => {
                self.state.resources_page = clamp_page(
                    page,
                    self.content.resources().len(),
                    self.page_sizes.resources,
                )
            }
            _ => tracing::debug!(%route, "ignoring page selection for unpaginated route"),
        }
    }

    fn submit(&mut self, form: SignupForm) {
        match self.state.email(form).parse::<EmailAddress>() {
            Ok(email) => {
                let page_url = self.page_url();
                match self.subscriptions.submit(&email, &page_url) {
                    Outcome::Submitted => {
                        self.state.email_mut(form).clear();
                        self.state.notice = Some(form.confirmation().to_owned());
                    }
                }
            }
            Err(err) => self.state.notice = Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::router::MemoryHistory;
    use crate::subscribe::{FormDispatcher, RecordingTransport, DEFAULT_ENDPOINT};
    use std::cell::RefCell;
    use std::rc::Rc;
    use url::Url;

    type TestSession<'a> =
        Session<'a, MemoryHistory, FormDispatcher<RecordingTransport>>;

    fn session<'a>(content: &'a ContentStore, fragment: &str) -> TestSession<'a> {
        Session::new(
            content,
            MemoryHistory::new(fragment),
            FormDispatcher::new(
                Url::parse(DEFAULT_ENDPOINT).unwrap(),
                RecordingTransport::default(),
            ),
            PageSizes::default(),
            "https://responsibleaibeyond.org/",
        )
    }

    #[test]
    fn test_initial_state() {
        let content = ContentStore::builtin();
        let s = session(&content, "#search");
        assert_eq!(Route::Search, s.state().route);
        assert_eq!(1, s.state().content_page);
        assert!(!s.state().menu_open);

        let s = session(&content, "#elsewhere");
        assert_eq!(Route::Home, s.state().route);
    }

    #[test]
    fn test_navigation_and_back() {
        let content = ContentStore::builtin();
        let mut s = session(&content, "");
        s.apply(Event::ToggleMenu);
        s.apply(Event::Navigate(Route::Resources));
        s.apply(Event::Navigate(Route::Content));
        assert_eq!(Route::Content, s.state().route);
        assert!(!s.state().menu_open);
        assert_eq!("content", s.router().history().fragment());

        s.router_mut().history_mut().back();
        s.apply(Event::HistoryChanged);
        assert_eq!(Route::Resources, s.state().route);
        assert_eq!(3, s.router().history().len());
    }

    #[test]
    fn test_page_selection_is_clamped() {
        let content = ContentStore::builtin();
        let mut s = session(&content, "");
        s.apply(Event::PageSelected(Route::Resources, 3));
        assert_eq!(2, s.state().resources_page);
        s.apply(Event::PageSelected(Route::Resources, 0));
        assert_eq!(1, s.state().resources_page);
        s.apply(Event::PageSelected(Route::Content, 2));
        assert_eq!(1, s.state().content_page);
    }

    #[test]
    fn test_submit_valid_email() {
        let content = ContentStore::builtin();
        let mut s = session(&content, "#content");
        s.apply(Event::EmailChanged(SignupForm::Footer, "you@example.com".to_owned()));
        s.apply(Event::Submit(SignupForm::Footer));
        assert_eq!(
            Some(SignupForm::Footer.confirmation()),
            s.state().notice.as_deref()
        );
        assert!(s.state().footer_email.is_empty());

        let sent = &s.subscriptions().transport().sent;
        assert_eq!(1, sent.len());
        assert_eq!(Some("you@example.com"), sent[0].field("email"));
        assert_eq!(
            Some("https://responsibleaibeyond.org/#content"),
            sent[0].field("referrer")
        );
    }

    #[test]
    fn test_submit_invalid_email_dispatches_nothing() {
        let content = ContentStore::builtin();
        let mut s = session(&content, "");
        s.apply(Event::EmailChanged(SignupForm::Cta, "not-an-email".to_owned()));
        s.apply(Event::Submit(SignupForm::Cta));
        assert!(s.subscriptions().transport().sent.is_empty());
        assert_eq!("not-an-email", s.state().cta_email);
        assert!(s.state().notice.is_some());
    }

    #[test]
    fn test_notice_is_dismissed() {
        let content = ContentStore::builtin();
        let mut s = session(&content, "");
        s.apply(Event::EmailChanged(SignupForm::Footer, "bad".to_owned()));
        s.apply(Event::Submit(SignupForm::Footer));
        assert!(s.state().notice.is_some());
        s.apply(Event::EmailChanged(SignupForm::Footer, "ok@example.com".to_owned()));
        assert_eq!(None, s.state().notice);

        s.apply(Event::Submit(SignupForm::Footer));
        assert_eq!(
            Some(SignupForm::Footer.confirmation()),
            s.state().notice.as_deref()
        );
        s.apply(Event::QueryChanged("dpi".to_owned()));
        assert!(s.state().notice.is_some());
        s.apply(Event::Navigate(Route::Content));
        assert_eq!(None, s.state().notice);

        s.apply(Event::EmailChanged(SignupForm::Cta, "nope".to_owned()));
        s.apply(Event::Submit(SignupForm::Cta));
        assert!(s.state().notice.is_some());
        s.router_mut().history_mut().back();
        s.apply(Event::HistoryChanged);
        assert_eq!(None, s.state().notice);
    }

    #[test]
    fn test_listeners_see_each_state() {
        let content = ContentStore::builtin();
        let mut s = session(&content, "");
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        s.subscribe(move |state| sink.borrow_mut().push(state.query.clone()));
        s.apply(Event::QueryChanged("d".to_owned()));
        s.apply(Event::QueryChanged("dp".to_owned()));
        s.apply(Event::QueryChanged("dpi".to_owned()));
        assert_eq!(vec!["d", "dp", "dpi"], *seen.borrow());
    }

    #[test]
    fn test_state_serializes() {
        let state = SessionState {
            route: Route::Search,
            query: "dpi".to_owned(),
            ..SessionState::default()
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains(r#""route":"search""#));
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}

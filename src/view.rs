//! The view function: a pure mapping from session state and content to the
//! [`View`] that gets shown. The same [`View`] feeds the HTML templates (via
//! [`crate::value::to_value`]) and the plain-text rendering used by the
//! command line.

use crate::content::{ContentStore, Home, Newsletter, Resource};
use crate::markdown;
use crate::paginate::{Pagination, Paginator};
use crate::router::Route;
use crate::search::{self, SearchableRecord, SourceType};
use crate::session::{PageSizes, SessionState};
use serde::Serialize;
use std::fmt;

/// Shown in place of search results when nothing matches.
pub const NO_RESULTS: &str = "No results yet. Try a different keyword.";

/// Site-wide details shown on every page.
#[derive(Clone, Debug, Serialize)]
pub struct SiteInfo {
    pub title: String,
    pub tagline: String,
    pub site_root: String,
    pub subscribe_url: String,
    pub year: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub fragment: &'static str,
    pub active: bool,
}

/// A newsletter with its summary rendered to HTML.
#[derive(Clone, Debug, Serialize)]
pub struct Issue<'a> {
    #[serde(flatten)]
    pub newsletter: &'a Newsletter,
    pub summary_html: String,
}

/// A search match with its summary rendered to HTML.
#[derive(Clone, Debug, Serialize)]
pub struct Hit {
    #[serde(flatten)]
    pub record: SearchableRecord,
    pub summary_html: String,
}

/// The body of the active view.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Body<'a> {
    Home {
        home: &'a Home,
    },
    Content {
        issues: Vec<Issue<'a>>,
        pagination: Pagination,
    },
    Resources {
        resources: &'a [Resource],
        pagination: Pagination,
    },
    Search {
        query: String,
        hits: Vec<Hit>,
        no_results: Option<&'static str>,
    },
}

/// Everything needed to display one screen of the site.
#[derive(Clone, Debug, Serialize)]
pub struct View<'a> {
    pub site: &'a SiteInfo,
    pub route: Route,
    pub nav: Vec<NavItem>,
    pub menu_open: bool,
    pub notice: Option<String>,
    pub body: Body<'a>,
}

/// Renders `state` against `content`. Rendering the same inputs twice yields
/// the same view.
pub fn render<'a>(
    state: &SessionState,
    content: &'a ContentStore,
    page_sizes: PageSizes,
    site: &'a SiteInfo,
) -> View<'a> {
    let body = match state.route {
        Route::Home => Body::Home {
            home: content.home(),
        },
        Route::Content => {
            let mut paginator = Paginator::new(content.newsletters(), page_sizes.content);
            paginator.select(state.content_page);
            Body::Content {
                issues: paginator
                    .current()
                    .iter()
                    .map(|newsletter| Issue {
                        newsletter,
                        summary_html: markdown::to_html(&newsletter.summary),
                    })
                    .collect(),
                pagination: paginator.pagination(),
            }
        }
        Route::Resources => {
            let mut paginator = Paginator::new(content.resources(), page_sizes.resources);
            paginator.select(state.resources_page);
            Body::Resources {
                resources: paginator.current(),
                pagination: paginator.pagination(),
            }
        }
        Route::Search => {
            let hits: Vec<Hit> = search::filter(&search::project(content), &state.query)
                .into_iter()
                .map(|record| Hit {
                    summary_html: markdown::to_html(&record.summary),
                    record,
                })
                .collect();
            Body::Search {
                query: state.query.clone(),
                no_results: match hits.is_empty() {
                    true => Some(NO_RESULTS),
                    false => None,
                },
                hits,
            }
        }
    };

    View {
        site,
        route: state.route,
        nav: Route::ALL
            .iter()
            .map(|route| NavItem {
                label: route.label(),
                fragment: route.fragment(),
                active: *route == state.route,
            })
            .collect(),
        menu_open: state.menu_open,
        notice: state.notice.clone(),
        body,
    }
}

fn write_pagination(f: &mut fmt::Formatter, p: &Pagination) -> fmt::Result {
    write!(f, "\nPage {} of {}", p.page, p.page_count)?;
    if let Some(prev) = p.prev {
        write!(f, "  [prev: {}]", prev)?;
    }
    if let Some(next) = p.next {
        write!(f, "  [next: {}]", next)?;
    }
    writeln!(f)
}

impl fmt::Display for View<'_> {
    /// Renders the view as plain text for the terminal.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let nav: Vec<String> = self
            .nav
            .iter()
            .map(|item| match item.active {
                true => format!("[{}]", item.label),
                false => item.label.to_owned(),
            })
            .collect();
        writeln!(f, "{}  |  {}", self.site.title, nav.join("  "))?;
        if self.menu_open {
            writeln!(f, "(menu open)")?;
        }
        if let Some(notice) = &self.notice {
            writeln!(f, "* {}", notice)?;
        }
        writeln!(f)?;

        match &self.body {
            Body::Home { home } => {
                writeln!(f, "{}\n{}\n\n{}", home.eyebrow, home.headline, home.lede)?;
                for card in home.cards.iter() {
                    writeln!(f, "\n  {}: {}", card.title, card.text)?;
                }
                writeln!(f, "\nWhat's ahead")?;
                for milestone in home.timeline.iter() {
                    writeln!(f, "  {}  {}", milestone.when, milestone.title)?;
                }
            }
            Body::Content { issues, pagination } => {
                writeln!(f, "Latest from the newsletter")?;
                for issue in issues {
                    let n = issue.newsletter;
                    writeln!(f, "\n  {}  ({})\n  {}\n  {}", n.title, n.date, n.summary, n.link)?;
                }
                write_pagination(f, pagination)?;
            }
            Body::Resources {
                resources,
                pagination,
            } => {
                writeln!(f, "Resource hub")?;
                for resource in resources.iter() {
                    writeln!(f, "\n  {}", resource.title)?;
                    for point in resource.points.iter() {
                        writeln!(f, "    - {}", point)?;
                    }
                    for link in resource.open_link.iter().chain(resource.download_link.iter()) {
                        writeln!(f, "    {}", link)?;
                    }
                }
                write_pagination(f, pagination)?;
            }
            Body::Search {
                query,
                hits,
                no_results,
            } => {
                writeln!(f, "Search: {:?}", query)?;
                for hit in hits {
                    let r = &hit.record;
                    let kind = match r.source {
                        SourceType::Newsletter => "newsletter",
                        SourceType::Resource => "resource",
                    };
                    write!(f, "\n  {} [{}]", r.title, kind)?;
                    if let Some(date) = r.date {
                        write!(f, "  ({})", date)?;
                    }
                    writeln!(f, "\n  {}", r.summary)?;
                }
                if let Some(message) = no_results {
                    writeln!(f, "{}", message)?;
                }
            }
        }
        Ok(())
    }
}

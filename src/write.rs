use crate::content::ContentStore;
use crate::paginate::page_count;
use crate::router::Route;
use crate::markdown;
use crate::search::{self, SearchableRecord};
use crate::session::{PageSizes, SessionState, SignupForm};
use crate::value::to_value;
use crate::view::{render, SiteInfo, NO_RESULTS};
use gtmpl::{Template, Value};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use url::{ParseError as UrlParseError, Url};

/// Responsible for rendering every route of the site through the page
/// template and writing the results to disk.
pub struct Writer<'a> {
    /// The template every page is rendered with. The template switches on
    /// `.body.kind` to pick the section for the route.
    pub template: &'a Template,

    pub content: &'a ContentStore,

    pub site: &'a SiteInfo,

    pub page_sizes: PageSizes,

    /// The base URL for all pages. Routes live at `{site_root}/index.html`
    /// (home), `{site_root}/content/index.html`, `{site_root}/content/2.html`,
    /// etc.
    pub site_root: &'a Url,

    /// The directory in which the HTML files will be written, laid out the
    /// same way as the URLs under `site_root`.
    pub output_directory: &'a Path,

    /// The URL for the static assets. This is made available to templates,
    /// typically for the theme's stylesheet.
    pub static_url: &'a Url,

    /// The URL of the Atom feed, made available to templates.
    pub feed_url: &'a Url,
}

impl Writer<'_> {
    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page, urls: &Value) -> Result<()> {
        let view = render(&page.state, self.content, self.page_sizes, self.site);
        let mut value = to_value(&view)?;
        if let Value::Object(obj) = &mut value {
            obj.insert("urls".to_owned(), urls.clone());
            obj.insert("page_url".to_owned(), Value::String(page.url.to_string()));
            obj.insert(
                "static_url".to_owned(),
                Value::String(self.static_url.to_string()),
            );
            obj.insert(
                "feed_url".to_owned(),
                Value::String(self.feed_url.to_string()),
            );
            obj.insert("prev".to_owned(), option_to_value(&page.prev));
            obj.insert("next".to_owned(), option_to_value(&page.next));
            obj.insert(
                "search_index_url".to_owned(),
                Value::String(self.site_root.join(SEARCH_INDEX)?.to_string()),
            );
            obj.insert(
                "no_results_text".to_owned(),
                Value::String(NO_RESULTS.to_owned()),
            );
            obj.insert("confirmations".to_owned(), confirmations());
        }

        tracing::debug!(path = %page.file_path.display(), "writing page");
        self.template.execute(
            &mut std::fs::File::create(&page.file_path)?,
            &gtmpl::Context::from(value)?,
        )?;
        Ok(())
    }

    /// Writes every page plus the JSON search index. Returns the number of
    /// HTML pages written.
    pub fn write_site(&self) -> Result<usize> {
        use std::collections::HashSet;
        let pages = pages(self.site_root, self.output_directory, self.content, self.page_sizes)?;
        let urls = route_urls(self.site_root)?;

        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for page in pages.iter() {
            if let Some(dir) = page.file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            self.write_page(page, &urls)?;
        }

        self.write_search_index()?;
        Ok(pages.len())
    }

    /// Writes the projected search records to `search.json` so the theme's
    /// script can run the same filter in the browser. Each record carries its
    /// summary as plain text for matching and as HTML for display.
    fn write_search_index(&self) -> Result<()> {
        std::fs::create_dir_all(self.output_directory)?;
        let file = std::fs::File::create(self.output_directory.join(SEARCH_INDEX))?;
        serde_json::to_writer_pretty(file, &search_index(self.content))?;
        Ok(())
    }
}

/// The file name of the JSON search index, relative to the site root.
const SEARCH_INDEX: &str = "search.json";

/// A record as written to the search index.
#[derive(Serialize)]
struct IndexEntry {
    #[serde(flatten)]
    record: SearchableRecord,
    summary_text: String,
    summary_html: String,
}

fn search_index(content: &ContentStore) -> Vec<IndexEntry> {
    search::project(content)
        .into_iter()
        .map(|record| IndexEntry {
            summary_text: record.summary_text(),
            summary_html: markdown::to_html(&record.summary),
            record,
        })
        .collect()
}

/// The confirmation text for each sign-up form, keyed by the form's name.
fn confirmations() -> Value {
    let mut texts: HashMap<String, Value> = HashMap::new();
    for form in [SignupForm::Footer, SignupForm::Cta].iter() {
        let name = match form {
            SignupForm::Footer => "footer",
            SignupForm::Cta => "cta",
        };
        texts.insert(name.to_owned(), Value::String(form.confirmation().to_owned()));
    }
    Value::Object(texts)
}

fn option_to_value(opt: &Option<Url>) -> Value {
    match opt {
        Some(url) => Value::String(url.to_string()),
        None => Value::Nil,
    }
}

/// An output HTML file: the session state that renders it, where it goes,
/// and its neighbours in a paginated listing.
struct Page {
    /// The state the page is rendered from.
    state: SessionState,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The page's own URL, used as the subscription forms' referrer.
    url: Url,

    /// The URL for the previous page, if any.
    prev: Option<Url>,

    /// The URL for the next page, if any.
    next: Option<Url>,
}

/// The directory of a route relative to the site root. Home is the root
/// itself.
fn route_dir(route: Route) -> &'static str {
    match route {
        Route::Home => "",
        Route::Content => "content/",
        Route::Resources => "resources/",
        Route::Search => "search/",
    }
}

fn page_file_name(page: usize) -> String {
    match page {
        1 => String::from("index.html"),
        _ => format!("{}.html", page),
    }
}

/// The URL of the first page of each route, keyed by fragment, for
/// navigation links.
fn route_urls(site_root: &Url) -> Result<Value> {
    let mut urls: HashMap<String, Value> = HashMap::new();
    for route in Route::ALL.iter() {
        let url = site_root.join(&format!("{}index.html", route_dir(*route)))?;
        urls.insert(route.fragment().to_owned(), Value::String(url.to_string()));
    }
    Ok(Value::Object(urls))
}

/// Creates the pages for a single route: one page per listing page for the
/// paginated routes, otherwise a single page.
fn route_pages(
    route: Route,
    pages: usize,
    site_root: &Url,
    output_directory: &Path,
) -> Result<Vec<Page>> {
    let base = site_root.join(route_dir(route))?;
    let dir = output_directory.join(route_dir(route));
    let url = |page: usize| base.join(&page_file_name(page));

    (1..=pages)
        .map(|page| {
            let mut state = SessionState {
                route,
                ..SessionState::default()
            };
            match route {
                Route::Content => state.content_page = page,
                Route::Resources => state.resources_page = page,
                _ => {}
            }
            Ok(Page {
                state,
                file_path: dir.join(page_file_name(page)),
                url: url(page)?,
                prev: match page {
                    1 => None,
                    _ => Some(url(page - 1)?),
                },
                next: match page < pages {
                    false => None,
                    true => Some(url(page + 1)?),
                },
            })
        })
        .collect()
}

/// Creates every [`Page`] of the site.
fn pages(
    site_root: &Url,
    output_directory: &Path,
    content: &ContentStore,
    page_sizes: PageSizes,
) -> Result<Vec<Page>> {
    let mut all = Vec::new();
    for route in Route::ALL.iter() {
        let count = match route {
            Route::Content => page_count(content.newsletters().len(), page_sizes.content),
            Route::Resources => page_count(content.resources().len(), page_sizes.resources),
            _ => 1,
        };
        all.extend(route_pages(*route, count, site_root, output_directory)?);
    }
    Ok(all)
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error converting a view into template data or writing the search
    /// index.
    Json(serde_json::Error),

    /// An error building a page URL.
    Url(UrlParseError),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<UrlParseError> for Error {
    fn from(err: UrlParseError) -> Error {
        Error::Url(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Json(err) => err.fmt(f),
            Error::Url(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Json(err) => Some(err),
            Error::Url(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn root() -> Url {
        Url::parse("https://example.org/").unwrap()
    }

    #[test]
    fn test_pages_layout() -> Result<()> {
        let content = ContentStore::builtin();
        let pages = pages(
            &root(),
            Path::new("/out"),
            &content,
            PageSizes::default(),
        )?;
        let files: Vec<&Path> = pages.iter().map(|p| p.file_path.as_path()).collect();
        assert_eq!(
            vec![
                Path::new("/out/index.html"),
                Path::new("/out/content/index.html"),
                Path::new("/out/resources/index.html"),
                Path::new("/out/resources/2.html"),
                Path::new("/out/search/index.html"),
            ],
            files
        );
        Ok(())
    }

    #[test]
    fn test_listing_links() -> Result<()> {
        let pages = route_pages(Route::Resources, 3, &root(), Path::new("/out"))?;
        assert_eq!(None, pages[0].prev);
        assert_eq!(
            Some("https://example.org/resources/2.html"),
            pages[0].next.as_ref().map(Url::as_str)
        );
        assert_eq!(
            Some("https://example.org/resources/index.html"),
            pages[1].prev.as_ref().map(Url::as_str)
        );
        assert_eq!(None, pages[2].next);
        assert_eq!(3, pages[2].state.resources_page);
        assert_eq!("https://example.org/resources/3.html", pages[2].url.as_str());
        Ok(())
    }

    #[test]
    fn test_search_index_entries() -> std::result::Result<(), serde_json::Error> {
        let entries = serde_json::to_value(&search_index(&ContentStore::builtin()))?;
        let dpi = &entries[3];
        assert_eq!("dpi-angle", dpi["id"]);
        assert_eq!("newsletter", dpi["source"]);
        assert_eq!("DPI", dpi["tags"][0]["name"]);
        assert_eq!(dpi["summary"], dpi["summary_text"]);
        assert!(dpi["summary_html"].as_str().map_or(false, |s| s.starts_with("<p>")));
        assert_eq!("resource", entries[9]["source"]);
        Ok(())
    }

    #[test]
    fn test_confirmations() {
        match confirmations() {
            Value::Object(texts) => {
                assert!(matches!(
                    texts.get("cta"),
                    Some(Value::String(s)) if s == SignupForm::Cta.confirmation()
                ));
                assert!(matches!(
                    texts.get("footer"),
                    Some(Value::String(s)) if s == SignupForm::Footer.confirmation()
                ));
            }
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_route_urls() -> Result<()> {
        match route_urls(&Url::parse("https://example.org/site/").unwrap())? {
            Value::Object(urls) => {
                assert_eq!(4, urls.len());
                assert!(matches!(
                    urls.get("search"),
                    Some(Value::String(s)) if s == "https://example.org/site/search/index.html"
                ));
                assert!(matches!(
                    urls.get("home"),
                    Some(Value::String(s)) if s == "https://example.org/site/index.html"
                ));
            }
            _ => panic!("expected an object"),
        }
        Ok(())
    }
}

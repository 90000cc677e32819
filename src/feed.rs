//! Support for creating an Atom feed of newsletter issues.

use crate::config::Author;
use crate::content::Newsletter;
use atom_syndication::{Entry, Error as AtomError, Feed, Link, Person, Text};
use chrono::{DateTime, FixedOffset, NaiveTime, TimeZone, Utc};
use std::fmt;
use std::io::Write;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub id: String,
    pub author: Option<Author>,
    pub home_page: String,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`Newsletter`]s and writes the result to a [`std::io::Write`]. Entries are
/// ordered newest first regardless of the order of `newsletters`.
pub fn write_feed<W: Write>(config: FeedConfig, newsletters: &[Newsletter], w: W) -> Result<()> {
    feed(config, newsletters).write_to(w)?;
    Ok(())
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).expect("zero offset is in range")
}

fn feed(config: FeedConfig, newsletters: &[Newsletter]) -> Feed {
    let entries = feed_entries(&config, newsletters);
    let updated = entries
        .iter()
        .map(|e| *e.updated())
        .max()
        .unwrap_or_else(|| utc().from_utc_datetime(&Utc::now().naive_utc()));

    let mut feed = Feed::default();
    feed.set_title(config.title);
    feed.set_id(config.id);
    feed.set_updated(updated);
    feed.set_authors(author_to_people(config.author));
    feed.set_links(vec![alternate(config.home_page)]);
    feed.set_entries(entries);
    feed
}

fn alternate(href: String) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel("alternate");
    link
}

fn published(newsletter: &Newsletter) -> DateTime<FixedOffset> {
    utc().from_utc_datetime(&newsletter.date.and_time(NaiveTime::MIN))
}

fn feed_entries(config: &FeedConfig, newsletters: &[Newsletter]) -> Vec<Entry> {
    let mut sorted: Vec<&Newsletter> = newsletters.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    sorted
        .into_iter()
        .map(|newsletter| {
            let date = published(newsletter);
            let mut entry = Entry::default();
            entry.set_id(newsletter.link.clone());
            entry.set_title(newsletter.title.clone());
            entry.set_updated(date);
            entry.set_published(Some(date));
            entry.set_authors(author_to_people(config.author.clone()));
            entry.set_links(vec![alternate(newsletter.link.clone())]);
            entry.set_summary(Text::plain(newsletter.summary.clone()));
            entry
        })
        .collect()
}

fn author_to_people(author: Option<Author>) -> Vec<Person> {
    match author {
        Some(author) => {
            let mut person = Person::default();
            person.set_name(author.name);
            person.set_email(author.email);
            vec![person]
        }
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is an Atom-related error, including I/O errors
    /// from the underlying writer.
    Atom(AtomError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Atom(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Atom(err) => Some(err),
        }
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

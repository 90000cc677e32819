//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading the content store
//! ([`crate::content`]), rendering every route ([`crate::write`]), copying
//! the static source directory into the static output directory, and
//! generating the Atom feed.

use crate::config::Config;
use crate::content::Error as ContentError;
use crate::feed::{Error as FeedError, *};
use crate::write::{Error as WriteError, *};
use chrono::Datelike;
use gtmpl::Template;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::ParseError as UrlParseError;

/// Builds the site from a [`Config`] object. This calls into
/// [`Writer::write_site`] and [`write_feed`] which do the heavy-lifting. This
/// function also copies the static assets from source directory to the output
/// directory.
pub fn build_site(config: Config) -> Result<()> {
    let content = config.content()?;
    tracing::info!(
        newsletters = content.newsletters().len(),
        resources = content.resources().len(),
        "loaded content"
    );

    // Parse the template files.
    let template = parse_template(config.page_template.iter())?;

    // Only the directories we generate are cleaned; the output root may hold
    // other files the user put there.
    for dir in ["content", "resources", "search"].iter() {
        rmdir(&config.root_output_directory.join(dir))?;
    }
    rmdir(&config.static_output_directory)?;

    let site = config.site_info(chrono::Utc::now().year());
    let static_url = config.site_root.join("static/")?;
    let feed_url = config.site_root.join("feed.atom")?;
    let writer = Writer {
        template: &template,
        content: &content,
        site: &site,
        page_sizes: config.page_sizes,
        site_root: &config.site_root,
        output_directory: &config.root_output_directory,
        static_url: &static_url,
        feed_url: &feed_url,
    };
    let written = writer.write_site()?;
    tracing::info!(pages = written, output = %config.root_output_directory.display(), "wrote pages");

    // copy static directory
    if config.static_source_directory.exists() {
        copy_dir(
            &config.static_source_directory,
            &config.static_output_directory,
        )?;
    } else {
        tracing::warn!(
            path = %config.static_source_directory.display(),
            "no static directory to copy"
        );
    }

    // create the atom feed
    write_feed(
        FeedConfig {
            title: config.title,
            id: config.site_root.to_string(),
            author: config.author,
            home_page: config.site_root.to_string(),
        },
        content.newsletters(),
        File::create(config.root_output_directory.join("feed.atom"))?,
    )?;

    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    use walkdir::WalkDir;
    for result in WalkDir::new(src) {
        let entry = result.map_err(|e| Error::Io(e.into()))?;
        // strip_prefix can't fail since `src` is always an ancestor of the
        // walked entries
        let target = match entry.path().strip_prefix(src) {
            Ok(relative) => dst.join(relative),
            Err(_) => continue,
        };
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(&template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during content loading,
/// writing, cleaning output directories, parsing template files, and other
/// I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading the content store.
    Content(ContentError),

    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors deriving URLs from the site root.
    Url(UrlParseError),

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Content(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Url(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Content(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Url(err) => Some(err),
            Error::Feed(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ContentError> for Error {
    /// Converts [`ContentError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: ContentError) -> Error {
        Error::Content(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<UrlParseError> for Error {
    fn from(err: UrlParseError) -> Error {
        Error::Url(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    const TEMPLATE: &str = r#"<title>{{.site.title}}</title>
<body data-search-index="{{.search_index_url}}" data-no-results="{{.no_results_text}}">
<a href="{{.urls.content}}">Content</a>
{{if eq .body.kind "resources"}}{{range .body.resources}}<h3>{{.title}}</h3>{{end}}{{end}}
{{if eq .body.kind "search"}}{{range .body.hits}}<li>{{.id}}</li>{{end}}{{end}}
{{if .next}}<a rel="next" href="{{.next}}">next</a>{{end}}
"#;

    #[test]
    fn test_build_site() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let root = std::env::temp_dir().join("briefing-build-test");
        let _ = fs::remove_dir_all(&root);
        let project = root.join("project");
        let output = root.join("public");
        fs::create_dir_all(project.join("theme"))?;
        fs::create_dir_all(project.join("static/images"))?;
        fs::write(
            project.join("site.yaml"),
            "title: Responsible AI & Beyond\nsite_root: https://example.org/\n",
        )?;
        fs::write(project.join("theme/theme.yaml"), "page_template: [page.html]\n")?;
        fs::write(project.join("theme/page.html"), TEMPLATE)?;
        fs::write(project.join("static/images/brief.png"), b"png")?;

        build_site(Config::from_directory(&project, &output)?)?;

        let home = fs::read_to_string(output.join("index.html"))?;
        assert!(home.contains("<title>Responsible AI & Beyond</title>"));
        assert!(home.contains(r#"<a href="https://example.org/content/index.html">Content</a>"#));

        let resources = fs::read_to_string(output.join("resources/index.html"))?;
        assert!(resources.contains("<h3>AI Governance 101</h3>"));
        assert!(resources.contains(r#"href="https://example.org/resources/2.html""#));
        let last = fs::read_to_string(output.join("resources/2.html"))?;
        assert!(last.contains("<h3>Practical Templates</h3>"));
        assert!(!last.contains(r#"rel="next""#));

        let search = fs::read_to_string(output.join("search/index.html"))?;
        assert!(search.contains("<li>dpi-angle</li>"));
        assert!(search.contains(r#"data-search-index="https://example.org/search.json""#));
        assert!(search.contains(crate::view::NO_RESULTS));

        let index: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output.join("search.json"))?)?;
        assert_eq!(Some(10), index.as_array().map(Vec::len));

        assert!(output.join("static/images/brief.png").exists());
        assert!(fs::read_to_string(output.join("feed.atom"))?.contains("<feed"));
        Ok(())
    }

    #[test]
    fn test_build_demo_site() -> std::result::Result<(), Box<dyn std::error::Error>> {
        use crate::session::SignupForm;

        let project = Path::new(env!("CARGO_MANIFEST_DIR")).join("site");
        let output = std::env::temp_dir().join("briefing-demo-build-test");
        let _ = fs::remove_dir_all(&output);

        build_site(Config::from_directory(&project, &output)?)?;

        let search = fs::read_to_string(output.join("search/index.html"))?;
        assert!(search.contains(r#"<input id="query""#));
        assert!(search.contains(
            r#"data-search-index="https://responsibleaibeyond.org/search.json""#
        ));
        assert!(search.contains(&format!(
            r#"data-confirmation="{}""#,
            SignupForm::Footer.confirmation()
        )));
        assert!(search.contains("summary_text"));

        let home = fs::read_to_string(output.join("index.html"))?;
        assert!(home.contains(&format!(
            r#"data-confirmation="{}""#,
            SignupForm::Cta.confirmation()
        )));
        assert!(output.join("static/style.css").exists());
        Ok(())
    }
}

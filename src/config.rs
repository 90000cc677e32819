use crate::content::ContentStore;
use crate::session::PageSizes;
use crate::subscribe::DEFAULT_ENDPOINT;
use crate::view::SiteInfo;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

const PROJECT_FILE: &str = "site.yaml";
const CONTENT_FILE: &str = "content.yaml";

#[derive(Deserialize)]
struct ContentPageSize(usize);
impl Default for ContentPageSize {
    fn default() -> Self {
        ContentPageSize(6)
    }
}

#[derive(Deserialize)]
struct ResourcesPageSize(usize);
impl Default for ResourcesPageSize {
    fn default() -> Self {
        ResourcesPageSize(4)
    }
}

fn default_subscribe_url() -> Url {
    // DEFAULT_ENDPOINT is a well-formed literal.
    Url::parse(DEFAULT_ENDPOINT).expect("default subscribe endpoint is a valid URL")
}

/// Makes `url` a directory URL so that joining route paths onto it extends
/// its path instead of replacing the last segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// The author credited in the Atom feed.
#[derive(Clone, Debug, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct Project {
    pub title: String,

    #[serde(default)]
    pub tagline: String,

    pub site_root: Url,

    #[serde(default = "default_subscribe_url")]
    pub subscribe_url: Url,

    #[serde(default)]
    pub content_page_size: ContentPageSize,

    #[serde(default)]
    pub resources_page_size: ResourcesPageSize,

    #[serde(default)]
    pub author: Option<Author>,
}

#[derive(Deserialize)]
struct Theme {
    page_template: Vec<PathBuf>,
}

pub struct Config {
    pub title: String,
    pub tagline: String,
    pub site_root: Url,
    pub subscribe_url: Url,
    pub author: Option<Author>,
    pub page_sizes: PageSizes,

    /// The project's `content.yaml`, if it has one. Without it the built-in
    /// content is used.
    pub content_file: Option<PathBuf>,

    pub page_template: Vec<PathBuf>,
    pub static_source_directory: PathBuf,
    pub root_output_directory: PathBuf,
    pub static_output_directory: PathBuf,
}

impl Config {
    /// Finds `site.yaml` in `dir` or the nearest parent directory that has
    /// one and loads the project from it.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
                .with_context(|| format!("Loading configuration from `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(dir) => Config::from_directory(dir, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<Config> {
        use crate::util::open;
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;

        if project.content_page_size.0 == 0 || project.resources_page_size.0 == 0 {
            return Err(anyhow!("Page sizes must be at least 1"));
        }

        let theme_dir = project_root.join("theme");
        let theme: Theme =
            serde_yaml::from_reader(open(&theme_dir.join("theme.yaml"), "theme")?)?;

        let content_file = project_root.join(CONTENT_FILE);
        Ok(Config {
            title: project.title,
            tagline: project.tagline,
            site_root: with_trailing_slash(project.site_root),
            subscribe_url: project.subscribe_url,
            author: project.author,
            page_sizes: PageSizes {
                content: project.content_page_size.0,
                resources: project.resources_page_size.0,
            },
            content_file: match content_file.exists() {
                true => Some(content_file),
                false => None,
            },
            page_template: theme
                .page_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            static_source_directory: project_root.join("static"),
            root_output_directory: output_directory.to_owned(),
            static_output_directory: output_directory.join("static"),
        })
    }

    /// Loads the content store the project uses.
    pub fn content(&self) -> crate::content::Result<ContentStore> {
        match &self.content_file {
            Some(path) => ContentStore::from_yaml_file(path),
            None => Ok(ContentStore::builtin()),
        }
    }

    /// The site-wide details for page rendering. `year` is the copyright year
    /// printed in the footer.
    pub fn site_info(&self, year: i32) -> SiteInfo {
        SiteInfo {
            title: self.title.clone(),
            tagline: self.tagline.clone(),
            site_root: self.site_root.to_string(),
            subscribe_url: self.subscribe_url.to_string(),
            year,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn project(name: &str, site_yaml: &str) -> std::io::Result<PathBuf> {
        let root = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("theme"))?;
        fs::create_dir_all(root.join("nested/deeper"))?;
        fs::write(root.join(PROJECT_FILE), site_yaml)?;
        fs::write(root.join("theme/theme.yaml"), "page_template: [base.html, body.html]\n")?;
        Ok(root)
    }

    #[test]
    fn test_from_parent_directory() -> Result<()> {
        let root = project(
            "briefing-config-test",
            "title: Responsible AI & Beyond\nsite_root: https://example.org/\n",
        )?;
        let config = Config::from_directory(&root.join("nested/deeper"), Path::new("/tmp/out"))?;
        assert_eq!("Responsible AI & Beyond", config.title);
        assert_eq!(6, config.page_sizes.content);
        assert_eq!(4, config.page_sizes.resources);
        assert_eq!(DEFAULT_ENDPOINT, config.subscribe_url.as_str());
        assert_eq!(None, config.content_file);
        assert_eq!(
            vec![root.join("theme/base.html"), root.join("theme/body.html")],
            config.page_template
        );
        assert_eq!(Path::new("/tmp/out/static"), config.static_output_directory);
        assert_eq!(5, config.content()?.newsletters().len());
        Ok(())
    }

    #[test]
    fn test_page_sizes_and_endpoint() -> Result<()> {
        let root = project(
            "briefing-config-sizes-test",
            "title: T\nsite_root: https://example.org/\ncontent_page_size: 2\nresources_page_size: 3\nsubscribe_url: https://example.org/subscribe\n",
        )?;
        let config = Config::from_directory(&root, Path::new("/tmp/out"))?;
        assert_eq!(2, config.page_sizes.content);
        assert_eq!(3, config.page_sizes.resources);
        assert_eq!("https://example.org/subscribe", config.site_info(2025).subscribe_url);
        Ok(())
    }

    #[test]
    fn test_site_root_gets_trailing_slash() -> Result<()> {
        let root = project(
            "briefing-config-root-test",
            "title: T\nsite_root: https://example.org/site\n",
        )?;
        let config = Config::from_directory(&root, Path::new("/tmp/out"))?;
        assert_eq!("https://example.org/site/", config.site_root.as_str());
        assert_eq!(
            "https://example.org/site/content/index.html",
            config.site_root.join("content/index.html")?.as_str()
        );
        assert_eq!(
            "https://example.org/",
            with_trailing_slash(Url::parse("https://example.org")?).as_str()
        );
        Ok(())
    }

    #[test]
    fn test_zero_page_size_rejected() -> Result<()> {
        let root = project(
            "briefing-config-zero-test",
            "title: T\nsite_root: https://example.org/\ncontent_page_size: 0\n",
        )?;
        assert!(Config::from_directory(&root, Path::new("/tmp/out")).is_err());
        Ok(())
    }
}

//! Defines the [`Tag`] type, which represents a [`crate::content::Newsletter`]
//! tag.

use serde::{Deserialize, Deserializer, Serialize};
use std::hash::{Hash, Hasher};

/// Represents a newsletter tag. Tags are written in content files as plain
/// strings (e.g., `DPI` or `Open Standards`); the slug is derived on parsing.
#[derive(Clone, Debug, Serialize)]
pub struct Tag {
    /// The tag's display name. Search matches against this field, so `DPI`
    /// is found by the query `dpi`.
    pub name: String,

    /// The slugified name, suitable for URLs and HTML ids (e.g.,
    /// `open-standards`). `DPI` and `dpi` resolve to the same slug.
    pub slug: String,
}

impl Tag {
    pub fn new(name: &str) -> Tag {
        Tag {
            name: name.to_owned(),
            slug: slug::slugify(name),
        }
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Tag {
        Tag::new(name)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Tag, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Tag::new(&String::deserialize(deserializer)?))
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `slug`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slug.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `slug` field.
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}
impl Eq for Tag {}

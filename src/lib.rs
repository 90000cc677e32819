//! The library code for the `briefing` newsletter site. The crate has two
//! halves that share the same view function ([`crate::view`]):
//!
//! 1. The interactive core: the content store ([`crate::content`]), keyword
//!    search ([`crate::search`]), pagination ([`crate::paginate`]), route
//!    selection ([`crate::router`]), newsletter sign-up
//!    ([`crate::subscribe`]), and the session that ties them together
//!    ([`crate::session`]).
//! 2. The static site build ([`crate::build`]), which renders every route
//!    through the theme's template ([`crate::write`]), writes a JSON search
//!    index and an Atom feed ([`crate::feed`]), and copies static assets.
//!
//! The session is a plain state machine: events are applied one at a time to
//! an explicit [`crate::session::SessionState`], and rendering that state is
//! a pure function of the state and the content.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod content;
pub mod feed;
pub mod markdown;
pub mod paginate;
pub mod router;
pub mod search;
pub mod session;
pub mod subscribe;
pub mod tag;
pub mod value;
pub mod view;
pub mod write;

mod util;

//! HTML output for extracted entities: anchors via [`Autolink`] and hit
//! highlighting via [`HitHighlighter`].

use thiserror::Error;

mod autolink;
pub mod escape;
mod highlight;
pub mod json;

pub use autolink::{
    Autolink, DEFAULT_CASHTAG_CLASS, DEFAULT_CASHTAG_URL_BASE, DEFAULT_HASHTAG_CLASS,
    DEFAULT_HASHTAG_URL_BASE, DEFAULT_LIST_CLASS, DEFAULT_LIST_URL_BASE, DEFAULT_USERNAME_CLASS,
    DEFAULT_USERNAME_URL_BASE,
};
pub use escape::escape_html;
pub use highlight::HitHighlighter;
pub use json::TweetEntities;

#[derive(Debug, Error)]
pub enum AutolinkError {
    #[error("invalid entities JSON: {0}")]
    Json(#[from] serde_json::Error),
}

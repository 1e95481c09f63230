use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Prefix of every style tag that marks a character as part of a comment
pub const COMMENT_STYLE_PREFIX: &str = "COMMENT-";

static COMMENT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{}([0-9]+)$", regex::escape(COMMENT_STYLE_PREFIX)))
        .expect("comment style pattern is valid")
});

/// Comment identifier issued by the comment store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("Style '{0}' is not a comment style")]
    NotAComment(String),
    #[error("Comment style '{0}' has no valid numeric id")]
    InvalidId(String),
}

/// Style tag for a comment, e.g. `COMMENT-12`
pub fn comment_style(id: CommentId) -> String {
    format!("{COMMENT_STYLE_PREFIX}{id}")
}

pub fn is_comment_style(style: &str) -> bool {
    style.starts_with(COMMENT_STYLE_PREFIX)
}

/// Comment id encoded in a comment style tag
pub fn parse_comment_id(style: &str) -> Result<CommentId, TagError> {
    if !is_comment_style(style) {
        return Err(TagError::NotAComment(style.to_string()));
    }
    COMMENT_STYLE
        .captures(style)
        .and_then(|captures| captures[1].parse().ok())
        .map(CommentId)
        .ok_or_else(|| TagError::InvalidId(style.to_string()))
}

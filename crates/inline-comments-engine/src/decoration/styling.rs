use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::comments::{CommentId, is_comment_style, parse_comment_id};

/// Background colours for comment highlights
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightPalette {
    /// A single comment that is not focused
    pub standard: String,
    /// Any range that includes the focused comment
    pub focused: String,
    /// Several overlapping comments, none focused
    pub overlapping: String,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            standard: "#01afb0".to_string(),
            focused: "#007d7e".to_string(),
            overlapping: "#00989a".to_string(),
        }
    }
}

/// Custom style resolved for one set of styles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightStyle {
    pub background_color: String,
}

/// Highlight for a character's style set; `None` when it carries no comment
pub fn comment_highlight(
    styles: &BTreeSet<String>,
    focused: Option<CommentId>,
    palette: &HighlightPalette,
) -> Option<HighlightStyle> {
    let comment_styles: Vec<&String> = styles.iter().filter(|s| is_comment_style(s)).collect();
    if comment_styles.is_empty() {
        return None;
    }

    let has_focused = focused.is_some_and(|focused| {
        comment_styles
            .iter()
            .any(|style| parse_comment_id(style).is_ok_and(|id| id == focused))
    });
    let background = if has_focused {
        &palette.focused
    } else if comment_styles.len() > 1 {
        &palette.overlapping
    } else {
        &palette.standard
    };

    Some(HighlightStyle {
        background_color: background.clone(),
    })
}

use std::collections::BTreeSet;

use crate::comments::{CommentId, is_comment_style, parse_comment_id};
use crate::document::ContentState;
use crate::error::EditorError;

/// Drop comment styles whose comment is not in `live`. Malformed comment
/// styles are dropped as well.
pub fn filter_comment_styles(content: &ContentState, live: &BTreeSet<CommentId>) -> ContentState {
    content.map_styles(|styles| {
        styles
            .iter()
            .filter(|style| {
                !is_comment_style(style)
                    || parse_comment_id(style).is_ok_and(|id| live.contains(&id))
            })
            .cloned()
            .collect()
    })
}

/// Drop every comment style; highlighting is never saved as content
pub fn strip_comment_styles(content: &ContentState) -> ContentState {
    content.map_styles(|styles| {
        styles
            .iter()
            .filter(|style| !is_comment_style(style))
            .cloned()
            .collect()
    })
}

/// JSON payload handed to the save callback: comment styles stripped, and
/// the literal `null` for a document with nothing in it
pub fn serialise_for_save(content: &ContentState) -> Result<String, EditorError> {
    let raw = strip_comment_styles(content).to_raw();
    if raw.is_empty() {
        return Ok("null".to_string());
    }
    Ok(serde_json::to_string(&raw)?)
}

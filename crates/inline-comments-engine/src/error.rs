use crate::document::BlockKey;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Invalid raw content: {0}")]
    Raw(#[from] serde_json::Error),
    #[error("Unknown block: {0}")]
    UnknownBlock(BlockKey),
    #[error("Selection is collapsed; select some text first")]
    EmptySelection,
    #[error("Commenting is disabled for this field")]
    CommentingDisabled,
}

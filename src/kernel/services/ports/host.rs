//! 宿主协作方：用户消息与只读虚拟文档。

use std::fmt;

/// Fixed label every user-facing message carries.
pub const MESSAGE_PREFIX: &str = "Docker Compose";

pub fn prefixed(text: &str) -> String {
    format!("{}: {}", MESSAGE_PREFIX, text)
}

pub trait MessageSink: Send + Sync {
    fn show_error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    NotFound(DocumentId),
    OutOfRange { id: DocumentId, offset: usize, len: usize },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::NotFound(id) => write!(f, "document {} not found", id.0),
            DocumentError::OutOfRange { id, offset, len } => write!(
                f,
                "offset {} out of range for document {} (len {})",
                offset, id.0, len
            ),
        }
    }
}

impl std::error::Error for DocumentError {}

/// Unsaved documents opened for display only.
pub trait DocumentHost: Send + Sync {
    fn open_untitled(&self, title: &str) -> Result<DocumentId, DocumentError>;

    /// `offset` counts chars from the start of the document.
    fn insert(&self, id: DocumentId, offset: usize, text: &str) -> Result<(), DocumentError>;
}

//! 内存中的只读日志文档（ropey 存储），供 UI 展示。

use crate::kernel::services::ports::{DocumentError, DocumentHost, DocumentId};
use ropey::Rope;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct LogDocument {
    pub id: DocumentId,
    pub title: String,
    pub text: Rope,
}

#[derive(Default)]
pub struct LogDocuments {
    docs: Mutex<Vec<LogDocument>>,
    next_id: AtomicU64,
}

impl LogDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: DocumentId) -> Option<LogDocument> {
        let docs = self.docs.lock().ok()?;
        docs.iter().find(|d| d.id == id).cloned()
    }



    pub fn close(&self, id: DocumentId) -> bool {
        let Ok(mut docs) = self.docs.lock() else {
            return false;
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        docs.len() != before
    }
}

impl DocumentHost for LogDocuments {
    fn open_untitled(&self, title: &str) -> Result<DocumentId, DocumentError> {
        let id = DocumentId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        if let Ok(mut docs) = self.docs.lock() {
            docs.push(LogDocument {
                id,
                title: title.to_string(),
                text: Rope::new(),
            });
        }
        Ok(id)
    }

    fn insert(&self, id: DocumentId, offset: usize, text: &str) -> Result<(), DocumentError> {
        let Ok(mut docs) = self.docs.lock() else {
            return Err(DocumentError::NotFound(id));
        };
        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(DocumentError::NotFound(id))?;
        let len = doc.text.len_chars();
        if offset > len {
            return Err(DocumentError::OutOfRange { id, offset, len });
        }
        doc.text.insert(offset, text);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/documents.rs"]
mod tests;

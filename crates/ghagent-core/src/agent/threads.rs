//! In-memory conversation history keyed by thread id

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::types::Message;

#[derive(Default)]
pub struct ThreadStore {
    threads: RwLock<HashMap<String, Vec<Message>>>,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded for `thread_id`; empty for unknown threads
    pub fn history(&self, thread_id: &str) -> Vec<Message> {
        self.threads
            .read()
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn append(&self, thread_id: &str, messages: &[Message]) {
        self.threads
            .write()
            .entry(thread_id.to_string())
            .or_default()
            .extend_from_slice(messages);
    }

    pub fn remove(&self, thread_id: &str) -> bool {
        self.threads.write().remove(thread_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.threads.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_history() {
        let store = ThreadStore::new();
        assert!(store.history("t1").is_empty());

        store.append("t1", &[Message::user("a"), Message::assistant("b")]);
        store.append("t1", &[Message::user("c")]);
        store.append("t2", &[Message::user("x")]);

        assert_eq!(store.history("t1").len(), 3);
        assert_eq!(store.len(), 2);
        assert!(store.remove("t2"));
        assert!(!store.remove("t2"));
        assert_eq!(store.len(), 1);
    }
}

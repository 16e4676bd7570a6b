use std::collections::HashSet;

/// Remembers the uids seen during one conversion run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `uid` is offered and `false` afterwards.
    pub fn admit(&mut self, uid: &str) -> bool {
        if self.seen.contains(uid) {
            return false;
        }
        self.seen.insert(uid.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

//! On-screen message log

use std::collections::VecDeque;
use std::time::Duration;

/// Longest message kept, in characters
pub const MESSAGE_MAX_CHARS: usize = 79;

/// One line of the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    expires_at: Duration,
}

impl Message {
    /// Text, empty once the message has expired
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Game time at which the message disappears
    pub fn expires_at(&self) -> Duration {
        self.expires_at
    }

    /// Whether the message has been blanked
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Fixed-capacity log, newest message at index 0.
///
/// Pushing into a full log drops the oldest entry. Expired entries keep their
/// slot and are blanked the next time the log is rendered.
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<Message>,
    capacity: usize,
    timeout: Duration,
}

impl MessageLog {
    /// Create an empty log
    pub fn new(capacity: usize, timeout: Duration) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            timeout,
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Add a message shown until `now + timeout`
    pub fn push(&mut self, text: impl Into<String>, now: Duration) {
        let mut text = text.into();
        if let Some((cut, _)) = text.char_indices().nth(MESSAGE_MAX_CHARS) {
            text.truncate(cut);
        }
        log::debug!("Message: {}", text);

        self.entries.push_front(Message {
            text,
            expires_at: now + self.timeout,
        });
        self.entries.truncate(self.capacity);
    }

    /// Entry at `index`, 0 being the newest
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.entries.get(index)
    }

    /// Entries from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    /// Number of occupied slots, blanked ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was ever pushed since the last clear
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Blank every entry whose expiry is not after `now`
    pub fn expire(&mut self, now: Duration) {
        for message in &mut self.entries {
            if !message.text.is_empty() && message.expires_at <= now {
                message.text.clear();
            }
        }
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

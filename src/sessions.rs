//! # Menu Sessions
//!
//! Remembers which message an ephemeral emoji menu acts on, plus the browse
//! state of the static library, so follow-up buttons, selects and modals can
//! pick up where the menu left off. Sessions expire after five minutes of
//! inactivity and live in memory only.

use dashmap::DashMap;
use log::debug;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Idle time after which a session is dropped. Every use restarts the clock.
pub const SESSION_TTL: Duration = Duration::from_secs(300);

/// The message a context-menu command was used on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetMessage {
    pub guild_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSession {
    pub target: TargetMessage,
    pub query: String,
    pub page: usize,
}

#[derive(Debug)]
struct Entry {
    session: MenuSession,
    last_used: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, Entry>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Starts a session for `target` and returns its id.
    pub fn open(&self, target: TargetMessage) -> String {
        let id = self.insert(MenuSession {
            target,
            query: String::new(),
            page: 0,
        });
        debug!("Opened menu session {} for message {}", id, target.message_id);
        id
    }

    /// Starts a session for one static browser message, showing the first page
    /// of `query`. Each browser pages on its own, separate from its parent.
    pub fn open_browser(&self, parent_id: &str, query: &str) -> Option<String> {
        let parent = self.get(parent_id)?;
        let id = self.insert(MenuSession {
            target: parent.target,
            query: query.to_string(),
            page: 0,
        });
        debug!("Opened static browser {} from session {}", id, parent_id);
        Some(id)
    }

    fn insert(&self, session: MenuSession) -> String {
        self.prune();

        let id = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            id.clone(),
            Entry {
                session,
                last_used: Instant::now(),
            },
        );
        id
    }

    /// Looks up a live session and marks it as used.
    pub fn get(&self, id: &str) -> Option<MenuSession> {
        self.update(id, |_| {})
    }

    /// Applies `change` to a live session and returns the updated copy.
    pub fn update<F>(&self, id: &str, change: F) -> Option<MenuSession>
    where
        F: FnOnce(&mut MenuSession),
    {
        let now = Instant::now();
        {
            let mut entry = self.sessions.get_mut(id)?;
            if now.duration_since(entry.last_used) < self.ttl {
                change(&mut entry.session);
                entry.last_used = now;
                return Some(entry.session.clone());
            }
        }

        // Shard lock is released above; removing while holding it would deadlock.
        debug!("Menu session {} expired", id);
        self.sessions.remove(id);
        None
    }

    pub fn prune(&self) {
        let now = Instant::now();
        self.sessions
            .retain(|_, entry| now.duration_since(entry.last_used) < self.ttl);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

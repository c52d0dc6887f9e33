//! Per-session transcripts.
//!
//! One transcript per session id, behind a per-session async mutex so two
//! simultaneous turns on the same session queue instead of interleaving. Session
//! ids are client-supplied, so the map would otherwise grow without bound; idle
//! sessions are evicted once they have not been touched for `IDLE_TTL` and the
//! store has passed `SWEEP_AT` entries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use saathi::Transcript;

/// A session untouched this long is fair game for eviction.
const IDLE_TTL: Duration = Duration::from_secs(6 * 3600);
/// Sweep for idle sessions only once the store holds at least this many.
const SWEEP_AT: usize = 1024;

struct SessionEntry {
    transcript: Arc<Mutex<Transcript>>,
    last_seen: Instant,
}

pub(crate) struct SessionStore {
    sessions: DashMap<String, SessionEntry>,
    idle_ttl: Duration,
    sweep_at: usize,
}

impl SessionStore {
    pub(crate) fn new() -> Self {
        Self::with_limits(IDLE_TTL, SWEEP_AT)
    }

    fn with_limits(idle_ttl: Duration, sweep_at: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_ttl,
            sweep_at,
        }
    }

    /// Returns the transcript handle for a session, creating an empty one for an
    /// unknown id. Touching a session refreshes its idle clock.
    pub(crate) fn get_or_create(&self, session_id: &str) -> Arc<Mutex<Transcript>> {
        // Sweep before taking the entry, so the sweep never sees our own shard lock.
        if self.sessions.len() >= self.sweep_at {
            self.evict_idle();
        }
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry {
                transcript: Arc::new(Mutex::new(Transcript::new())),
                last_seen: Instant::now(),
            });
        entry.last_seen = Instant::now();
        entry.transcript.clone()
    }

    fn evict_idle(&self) {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| entry.last_seen.elapsed() < self.idle_ttl);
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.sessions.len(), "evicted idle sessions");
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}

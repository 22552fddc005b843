//! Keystroke debouncing with last-query-wins ordering.
//!
//! At most one search is emitted per distinct trimmed query, after a quiet
//! window following the last keystroke. Nothing is ever cancelled: every
//! keystroke claims a fresh token, and anything holding an older token —
//! a sleeping debounce or an in-flight provider response — discovers it
//! has been superseded when it checks back in. The debounce sleep is the
//! only suspension point.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

/// Identity of one keystroke's query. Compare against the debouncer with
/// [`SearchDebouncer::is_current`] before applying a search result; a
/// stale token means a newer keystroke owns the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryToken(u64);

/// Outcome of pushing one keystroke through the debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Debounced {
    /// The query survived the quiet window. Run the search, then verify
    /// the token is still current before applying the results.
    Emit { query: String, token: QueryToken },
    /// Below the minimum length: clear the suggestion list immediately,
    /// no network contact.
    TooShort,
    /// Identical to the previously emitted query; keep current results.
    Duplicate,
    /// A newer keystroke arrived during the quiet window.
    Superseded,
}

/// Rate-limits and deduplicates keystroke-driven searches.
pub struct SearchDebouncer {
    window: Duration,
    min_query_len: usize,
    seq: AtomicU64,
    last_emitted: Mutex<Option<String>>,
}

impl SearchDebouncer {
    pub fn new(window: Duration, min_query_len: usize) -> Self {
        Self {
            window,
            min_query_len,
            seq: AtomicU64::new(0),
            last_emitted: Mutex::new(None),
        }
    }

    /// Feed one keystroke's worth of input.
    ///
    /// Trims the query, claims a fresh token (superseding any older one),
    /// and waits out the quiet window before emitting.
    pub async fn debounce(&self, query: &str) -> Debounced {
        let trimmed = query.trim().to_string();
        let token = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        if trimmed.chars().count() < self.min_query_len {
            // An emptied input also resets duplicate suppression, so
            // retyping the previous query searches again.
            *self.last_emitted.lock().expect("debouncer lock") = None;
            return Debounced::TooShort;
        }

        if self
            .last_emitted
            .lock()
            .expect("debouncer lock")
            .as_deref()
            == Some(trimmed.as_str())
        {
            debug!(query = %trimmed, "duplicate query suppressed");
            return Debounced::Duplicate;
        }

        tokio::time::sleep(self.window).await;

        if self.seq.load(Ordering::SeqCst) != token {
            debug!(query = %trimmed, "query superseded during quiet window");
            return Debounced::Superseded;
        }

        *self.last_emitted.lock().expect("debouncer lock") = Some(trimmed.clone());
        Debounced::Emit {
            query: trimmed,
            token: QueryToken(token),
        }
    }

    /// Whether `token` still identifies the latest keystroke. Checked when
    /// a search response arrives; stale responses are discarded.
    pub fn is_current(&self, token: QueryToken) -> bool {
        self.seq.load(Ordering::SeqCst) == token.0
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Generations -- explicit (current, previous) two-slot poll cache
// ---------------------------------------------------------------------------

/// Holds the two most recent poll results of one upstream endpoint.
///
/// The only transition is [`Generations::push`], which shifts `current` into
/// `previous` and installs the new result.  `previous` is therefore always the
/// generation immediately preceding `current`, never an older one.
#[derive(Debug)]
pub struct Generations<T> {
    current: Option<Arc<T>>,
    previous: Option<Arc<T>>,
    updated_at: Option<DateTime<Utc>>,
    polls: u64,
}

impl<T> Default for Generations<T> {
    fn default() -> Self {
        Self {
            current: None,
            previous: None,
            updated_at: None,
            polls: 0,
        }
    }
}

impl<T> Generations<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `next` as the current generation, demoting the old one.
    pub fn push(&mut self, next: T) {
        self.previous = self.current.take();
        self.current = Some(Arc::new(next));
        self.updated_at = Some(Utc::now());
        self.polls += 1;
    }

    pub fn current(&self) -> Option<Arc<T>> {
        self.current.clone()
    }

    pub fn previous(&self) -> Option<Arc<T>> {
        self.previous.clone()
    }

    /// Wall-clock time of the last successful push.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Number of generations pushed since start-up.
    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl<T: Default> Generations<T> {
    /// Both slots, substituting an empty value for any slot not yet filled.
    pub fn pair(&self) -> (Arc<T>, Arc<T>) {
        (
            self.current.clone().unwrap_or_default(),
            self.previous.clone().unwrap_or_default(),
        )
    }
}

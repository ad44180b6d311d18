//! Local mirror of the service's corpus list.
//!
//! [`CorpusLibrary`] is refreshed wholesale from the service, appended to
//! after a successful save, and never deletes entries on its own.  It also
//! holds the single selection pointer, which is an id only: selecting an
//! id that is not cached is allowed, and a selection left dangling by a
//! remote removal is not detected.

use crate::api::{CorpusId, CorpusRecord};

/// Outcome of applying a failed refresh to the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshFailure {
    /// Nothing had ever been cached.  The library now counts as loaded, so
    /// later failures keep whatever it gains meanwhile.
    FirstLoad,
    /// A previous listing is still cached and was left untouched.
    KeptStale,
}

#[derive(Debug, Clone, Default)]
pub struct CorpusLibrary {
    /// Most recent first.
    records: Vec<CorpusRecord>,
    selected: Option<CorpusId>,
    loaded: bool,
}

impl CorpusLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every cached record with a fresh listing.
    pub fn replace_all(&mut self, records: Vec<CorpusRecord>) {
        self.records = records;
        self.loaded = true;
    }

    /// Record that a refresh failed.  Cached records are never touched.
    pub fn refresh_failed(&mut self) -> RefreshFailure {
        if self.loaded {
            RefreshFailure::KeptStale
        } else {
            self.loaded = true;
            RefreshFailure::FirstLoad
        }
    }

    /// Insert a freshly saved record at the head.
    ///
    /// A record whose id is already cached replaces the old entry so a
    /// refresh racing the save cannot leave duplicates.  A saved record
    /// makes the cache populated even if no listing ever arrived.
    pub fn prepend(&mut self, record: CorpusRecord) {
        self.records.retain(|r| r.id != record.id);
        self.records.insert(0, record);
        self.loaded = true;
    }

    pub fn select(&mut self, id: CorpusId) {
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&CorpusId> {
        self.selected.as_ref()
    }

    /// The cached record for the current selection, if it is cached.
    pub fn selected_record(&self) -> Option<&CorpusRecord> {
        let id = self.selected.as_ref()?;
        self.get(id)
    }

    pub fn get(&self, id: &CorpusId) -> Option<&CorpusRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn records(&self) -> &[CorpusRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `true` once a listing, a saved record or a failed first load has
    /// been applied.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use crate::error::Result;
use crate::integrity::IntegrityProvider;
use crate::note::Note;
use crate::store::NoteStore;

/// What the listing screen currently shows: a search box and a
/// favorites toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub search: String,
    pub liked_only: bool,
}

impl ListingQuery {
    pub fn new(search: impl Into<String>, liked_only: bool) -> Self {
        Self {
            search: search.into(),
            liked_only,
        }
    }

    pub fn is_search(&self) -> bool {
        !self.search.trim().is_empty()
    }

    /// A non-empty search wins and `liked_only` is not applied to its
    /// results; otherwise lists everything or only liked notes.
    pub async fn run<I>(&self, store: &NoteStore<I>) -> Result<Vec<Note>>
    where
        I: IntegrityProvider + Send + Sync,
    {
        if self.is_search() {
            store.search(&self.search).await
        } else {
            store.get_all(self.liked_only).await
        }
    }
}

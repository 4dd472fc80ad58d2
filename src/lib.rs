#![warn(warnings)]
#![deny(clippy::all)]

pub mod config;
pub mod error;
pub mod integrity;
pub mod logging;
pub mod note;
pub mod query;
pub mod search;
pub mod share;
pub mod storage;
pub mod store;

pub use error::{Result, StoreError};
pub use note::{Note, NoteDraft, NotePatch};
pub use query::ListingQuery;
pub use share::share_text;
pub use store::NoteStore;

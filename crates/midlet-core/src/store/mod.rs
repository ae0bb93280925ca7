//! Persisted application records.
//!
//! The reconciler only needs bulk operations keyed by directory name, so the
//! store is a small trait. [`SqliteAppRepository`] is the bundled backend.

mod sqlite;

pub use sqlite::SqliteAppRepository;

use crate::error::Result;
use crate::models::AppItem;

/// Record store collaborator.
///
/// Identity of a record is [`AppItem::path`]. Inserting a record whose path
/// is already stored replaces the old row.
pub trait AppRepository: Send + Sync {
    /// All records, in store order.
    fn list(&self) -> Result<Vec<AppItem>>;

    /// Look up one record by directory name.
    fn get(&self, path: &str) -> Result<Option<AppItem>>;

    /// Insert a batch of records.
    fn insert(&self, items: &[AppItem]) -> Result<()>;

    /// Delete a batch of records. Unknown paths are ignored.
    fn delete(&self, items: &[AppItem]) -> Result<()>;

    /// Delete every record.
    fn delete_all(&self) -> Result<()>;
}

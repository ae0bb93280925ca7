//! Application library: discovery, reconciliation and the apps-root lock.

mod lock;
mod scanner;
mod sync;

pub use lock::{ReconcileGuard, ReconcileLock};
pub use scanner::{AppScanner, ScanReport};
pub use sync::{Reconciler, SyncReport};

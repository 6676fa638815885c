//! Alerting System
//!
//! Alert taxonomy, the deduplication guard consulted before detector
//! insertions, the panic fan-out router, and the resolution linker that
//! closes every record of an incident together.

mod fanout;
mod guard;
mod kind;
mod linker;

pub use fanout::{PanicReceipt, PanicRouter};
pub use guard::DedupGuard;
pub use kind::{AlertCategory, AlertKind};
pub use linker::ResolutionLinker;

use thiserror::Error;

/// Alerting errors
#[derive(Debug, Error)]
pub enum AlertingError {
    #[error("storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `ssh/` - OpenSSH control-master transport
//! - `events/` - Console and NDJSON event sinks
//! - `lock` - Per-target local lock file

pub mod events;
pub mod lock;
pub mod ssh;

// Re-export for convenience
pub use events::{event_json, ConsoleEventSink, JsonEventSink};
pub use lock::DeployLock;
pub use ssh::{OpenSshConnector, OpenSshSession, DEFAULT_TRANSFER_TIMEOUT};

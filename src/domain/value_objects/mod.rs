//! Value Objects
//!
//! Immutable types validated at construction.

mod cancel;
mod connection;
mod exclusion;
mod maintenance;
mod remote_path;

pub use cancel::CancellationToken;
pub use connection::{
    ConfigError, ConnectionConfig, Credential, HostKeyPolicy, Secret, DEFAULT_CONNECT_TIMEOUT,
};
pub use exclusion::{ExclusionSet, DEFAULT_EXCLUSIONS};
pub use maintenance::MaintenanceTask;
pub use remote_path::{RemotePath, RemotePathError};

//! Deployment manifest
//!
//! Resolution order for connection settings:
//! 1. Environment (`RDEPLOY_HOST`, `RDEPLOY_PORT`, `RDEPLOY_USER`, `RDEPLOY_SSH`)
//! 2. `deploy.toml`
//! 3. Built-in defaults
//!
//! The password only ever comes from the environment.

mod loader;
mod types;

pub use loader::{
    load_with_warnings, parse_with_warnings, resolve_local, select_batches, with_env_overrides,
    ManifestWarning,
};
pub use types::{
    ArtifactFileSection, ArtifactsSection, BatchSection, CommandSection, ConnectionSection,
    DefaultsSection, Manifest, SyncSection, DEFAULT_MANIFEST, DEFAULT_PASSWORD_ENV,
};

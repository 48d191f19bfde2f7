//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod deploy_events;
pub mod remote_session;

pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink, Stage};
pub use remote_session::{
    CommandChannel, CommandOutput, ConnectionError, FileChannel, RemoteSession, SessionConnector,
    SessionError,
};

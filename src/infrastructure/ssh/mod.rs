//! OpenSSH transport
//!
//! Implements the remote session port by driving the system `ssh` client.

mod askpass;
mod process;
mod session;

pub use session::{OpenSshConnector, OpenSshSession, DEFAULT_TRANSFER_TIMEOUT};

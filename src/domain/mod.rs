//! Domain Layer
//!
//! Types and rules of a deployment run, without I/O.
//!
//! ## Structure
//!
//! - `entities/` - Plan inputs, step results, the deployment report
//! - `value_objects/` - Connection config, remote paths, exclusions
//! - `policies/` - Failure classification and transfer-failure handling
//! - `ports/` - Remote session and event sink interfaces
//!
//! Nothing here touches the network or the local file system; the
//! application layer drives I/O through the ports.

pub mod entities;
pub mod policies;
pub mod ports;
pub mod value_objects;

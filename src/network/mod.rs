//! Network Module
//!
//! Transport handle ownership and command execution.
//!
//! ## Lifecycle
//! - Handle opened lazily on the first `execute`
//! - Dropped on any transport failure (reactive reconnect on the next call)
//! - Released on Connection drop

mod connection;

pub use connection::Connection;

//! # redwire
//!
//! A blocking Redis client driver speaking RESP2, with:
//! - Binary-safe multi-bulk command encoding
//! - A closed five-type reply model
//! - Lazy connect with reactive, failure-triggered reconnect
//! - Typed string, set, and hash operations with expiration support
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                RedisClient                  │
//! │   typed operations, argument validation,    │
//! │          reply interpretation               │
//! └─────────────────────┬───────────────────────┘
//!                       │ Command / Reply
//! ┌─────────────────────▼───────────────────────┐
//! │                Connection                   │
//! │   lazy connect, reactive reconnect, one     │
//! │   in-flight command, owns the TCP handle    │
//! └─────────────────────┬───────────────────────┘
//!                       │ RESP2 bytes
//! ┌─────────────────────▼───────────────────────┐
//! │              Protocol codec                 │
//! │   multi-bulk encode, five-type decode       │
//! └─────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod client;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::{ExpirationTime, RedisClient, SetMode};
pub use config::{Config, Endpoint};
pub use error::{RedisError, Result};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of redwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

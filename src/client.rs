//! Client facade
//!
//! Typed operations over one connection: argument validation on the way in,
//! reply interpretation on the way out. Every operation issues exactly one
//! command and fully consumes its reply before returning.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::{Config, Endpoint};
use crate::error::{RedisError, Result};
use crate::network::Connection;
use crate::protocol::{Command, Reply};

// =============================================================================
// Operation argument types
// =============================================================================

/// Conditional behavior of `SET`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
    /// Set unconditionally
    Anyhow,

    /// Set only if the key does not exist (`NX`)
    IfNotExist,

    /// Set only if the key already exists (`XX`)
    IfExist,
}

/// An absolute instant a key should expire at
///
/// Commands consume it as whole seconds remaining from now. A non-positive
/// remainder fails validation before anything is sent.
#[derive(Debug, Clone, Copy)]
pub struct ExpirationTime {
    when: SystemTime,
}

impl ExpirationTime {
    /// Expire at the given instant
    pub fn at(when: SystemTime) -> Self {
        Self { when }
    }

    /// Expire this long from now
    pub fn after(ttl: Duration) -> Self {
        Self {
            when: SystemTime::now() + ttl,
        }
    }

    /// Signed whole seconds from now until the target instant
    pub fn remaining_seconds(&self) -> i64 {
        match self.when.duration_since(SystemTime::now()) {
            Ok(ahead) => ahead.as_secs() as i64,
            Err(past) => -(past.duration().as_secs() as i64),
        }
    }
}

impl From<SystemTime> for ExpirationTime {
    fn from(when: SystemTime) -> Self {
        Self::at(when)
    }
}

impl From<Duration> for ExpirationTime {
    fn from(ttl: Duration) -> Self {
        Self::after(ttl)
    }
}

// =============================================================================
// RedisClient
// =============================================================================

/// A Redis client owning one connection
///
/// Not internally synchronized: operations take `&mut self`, so one client
/// has one command in flight at a time. Concurrent workloads should use one
/// client per worker rather than sharing a client behind a lock.
pub struct RedisClient {
    conn: Connection,
}

impl RedisClient {
    /// Create a client from a `host:port` specifier
    ///
    /// No I/O happens until the first operation; an invalid specifier fails
    /// here and the client is never constructed.
    pub fn new(server: &str) -> Result<Self> {
        Self::with_config(server, Config::default())
    }

    /// Create a client with explicit configuration
    pub fn with_config(server: &str, config: Config) -> Result<Self> {
        let endpoint = Endpoint::parse(server)?;
        Ok(Self {
            conn: Connection::new(endpoint, config),
        })
    }

    /// Whether the underlying connection currently holds a live handle
    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    /// The configured server endpoint
    pub fn endpoint(&self) -> &Endpoint {
        self.conn.endpoint()
    }

    // =========================================================================
    // Connection-level operations
    // =========================================================================

    /// `PING` the server
    pub fn ping(&mut self) -> Result<()> {
        let reply = self.conn.execute(&Command::new("PING"))?;
        expect_status(reply).map(|_| ())
    }

    /// `SELECT` the logical database with the given index
    pub fn select(&mut self, index: i64) -> Result<()> {
        let reply = self.conn.execute(&Command::new("SELECT").arg_int(index))?;
        expect_status(reply).map(|_| ())
    }

    // =========================================================================
    // String operations
    // =========================================================================

    /// `SET` a key with optional expiration and conditional mode
    ///
    /// A nil reply means the `NX`/`XX` condition was not met and maps to a
    /// mode-specific [`RedisError::Rejected`]. An expiration that is not in
    /// the future fails validation without touching the network.
    pub fn set(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        expiration: Option<ExpirationTime>,
        mode: SetMode,
    ) -> Result<()> {
        let mut command = Command::new("SET").arg(key).arg(value);

        if let Some(expiration) = expiration {
            let ttl = expiration.remaining_seconds();
            if ttl <= 0 {
                return Err(RedisError::Validation(format!(
                    "expiration must be in the future ({ttl}s remaining)"
                )));
            }
            command = command.arg("EX").arg_int(ttl);
        }

        command = match mode {
            SetMode::Anyhow => command,
            SetMode::IfNotExist => command.arg("NX"),
            SetMode::IfExist => command.arg("XX"),
        };

        match self.conn.execute(&command)? {
            Reply::Status(_) => Ok(()),
            Reply::BulkString(None) | Reply::Array(None) => {
                let reason = match mode {
                    SetMode::Anyhow => "set failed for an unknown reason",
                    SetMode::IfNotExist => "key already exists",
                    SetMode::IfExist => "key does not exist",
                };
                Err(RedisError::Rejected(reason.to_string()))
            }
            Reply::Error(msg) => Err(RedisError::Server(msg)),
            other => Err(unexpected("status", &other)),
        }
    }

    /// `GET` a value; `None` when the key does not exist
    pub fn get(&mut self, key: impl AsRef<[u8]>) -> Result<Option<Vec<u8>>> {
        match self.conn.execute(&Command::new("GET").arg(key))? {
            Reply::BulkString(value) => Ok(value),
            Reply::Error(msg) => Err(RedisError::Server(msg)),
            other => Err(unexpected("bulk string", &other)),
        }
    }

    // =========================================================================
    // Key expiration
    // =========================================================================

    /// `EXPIRE` a key after the given number of seconds
    ///
    /// The seconds value is passed through verbatim; the server enforces its
    /// own semantics. A `0` reply (key missing, timeout not set) is an error.
    pub fn expire(&mut self, key: impl AsRef<[u8]>, seconds: i64) -> Result<()> {
        let reply = self
            .conn
            .execute(&Command::new("EXPIRE").arg(key).arg_int(seconds))?;
        applied(expect_integer(reply)?)
    }

    /// `EXPIREAT` a key at an absolute instant
    pub fn expire_at(&mut self, key: impl AsRef<[u8]>, when: SystemTime) -> Result<()> {
        let unix_seconds = match when.duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_secs() as i64,
            Err(before) => -(before.duration().as_secs() as i64),
        };
        let reply = self
            .conn
            .execute(&Command::new("EXPIREAT").arg(key).arg_int(unix_seconds))?;
        applied(expect_integer(reply)?)
    }

    /// `TTL` of a key in seconds
    ///
    /// The server's value passes through verbatim, including `-1` (no
    /// timeout) and `-2` (no such key).
    pub fn ttl(&mut self, key: impl AsRef<[u8]>) -> Result<i64> {
        let reply = self.conn.execute(&Command::new("TTL").arg(key))?;
        expect_integer(reply)
    }

    // =========================================================================
    // Set operations
    // =========================================================================

    /// `SADD` members to a set, returning how many were newly added
    pub fn sadd<M: AsRef<[u8]>>(&mut self, key: impl AsRef<[u8]>, members: &[M]) -> Result<i64> {
        let reply = self
            .conn
            .execute(&Command::new("SADD").arg(key).args(members))?;
        expect_integer(reply)
    }

    /// `SCARD` - number of members in a set
    pub fn scard(&mut self, key: impl AsRef<[u8]>) -> Result<i64> {
        let reply = self.conn.execute(&Command::new("SCARD").arg(key))?;
        expect_integer(reply)
    }

    /// `SDIFF` - members of the first set not present in the others
    pub fn sdiff<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<Vec<Vec<u8>>> {
        let reply = self.conn.execute(&Command::new("SDIFF").args(keys))?;
        members_from(expect_array(reply)?)
    }

    /// `SDIFFSTORE` - store the difference into `dest`, returning its size
    pub fn sdiff_store<K: AsRef<[u8]>>(
        &mut self,
        dest: impl AsRef<[u8]>,
        keys: &[K],
    ) -> Result<i64> {
        let reply = self
            .conn
            .execute(&Command::new("SDIFFSTORE").arg(dest).args(keys))?;
        expect_integer(reply)
    }

    /// `SINTER` - intersection of the given sets
    pub fn sinter<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<Vec<Vec<u8>>> {
        let reply = self.conn.execute(&Command::new("SINTER").args(keys))?;
        members_from(expect_array(reply)?)
    }

    /// `SINTERSTORE` - store the intersection into `dest`, returning its size
    pub fn sinter_store<K: AsRef<[u8]>>(
        &mut self,
        dest: impl AsRef<[u8]>,
        keys: &[K],
    ) -> Result<i64> {
        let reply = self
            .conn
            .execute(&Command::new("SINTERSTORE").arg(dest).args(keys))?;
        expect_integer(reply)
    }

    /// `SISMEMBER` - membership test
    pub fn sismember(
        &mut self,
        key: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<bool> {
        let reply = self
            .conn
            .execute(&Command::new("SISMEMBER").arg(key).arg(member))?;
        Ok(expect_integer(reply)? != 0)
    }

    // =========================================================================
    // Hash operations
    // =========================================================================

    /// `HMGET` - fetch hash fields, in the order supplied
    ///
    /// Returns one `(field, value)` pair per requested field, zipped back
    /// onto the caller's order. A missing field yields an empty value. A
    /// reply whose length differs from the request count is an error.
    pub fn hget<F: AsRef<[u8]>>(
        &mut self,
        key: impl AsRef<[u8]>,
        fields: &[F],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let reply = self
            .conn
            .execute(&Command::new("HMGET").arg(key).args(fields))?;
        let items = expect_array(reply)?.unwrap_or_default();

        if items.len() != fields.len() {
            return Err(RedisError::UnexpectedReply(format!(
                "HMGET returned {} elements for {} requested fields",
                items.len(),
                fields.len()
            )));
        }

        fields
            .iter()
            .zip(items)
            .map(|(field, item)| match item {
                Reply::BulkString(Some(value)) => Ok((field.as_ref().to_vec(), value)),
                Reply::BulkString(None) => Ok((field.as_ref().to_vec(), Vec::new())),
                Reply::Error(msg) => Err(RedisError::Server(msg)),
                other => Err(unexpected("bulk string", &other)),
            })
            .collect()
    }

    /// `HMSET` - set hash fields from ordered `(field, value)` pairs
    ///
    /// Pairs are flattened onto the wire in the order given, never in an
    /// associative container's traversal order.
    pub fn hset<F: AsRef<[u8]>, V: AsRef<[u8]>>(
        &mut self,
        key: impl AsRef<[u8]>,
        pairs: &[(F, V)],
    ) -> Result<()> {
        let mut command = Command::new("HMSET").arg(key);
        for (field, value) in pairs {
            command = command.arg(field).arg(value);
        }
        let reply = self.conn.execute(&command)?;
        expect_status(reply).map(|_| ())
    }
}

// =============================================================================
// Reply interpretation helpers
// =============================================================================

fn unexpected(expected: &str, actual: &Reply) -> RedisError {
    RedisError::UnexpectedReply(format!("expected {expected}, got {}", actual.type_name()))
}

/// Map the 0/1 reply of the expiration commands to an outcome
fn applied(flag: i64) -> Result<()> {
    if flag == 1 {
        Ok(())
    } else {
        Err(RedisError::Rejected(format!(
            "key does not exist or the timeout could not be set (reply {flag})"
        )))
    }
}

/// Accept a status reply, surfacing server errors verbatim
fn expect_status(reply: Reply) -> Result<String> {
    match reply {
        Reply::Status(line) => Ok(line),
        Reply::Error(msg) => Err(RedisError::Server(msg)),
        other => Err(unexpected("status", &other)),
    }
}

fn expect_integer(reply: Reply) -> Result<i64> {
    match reply {
        Reply::Integer(n) => Ok(n),
        Reply::Error(msg) => Err(RedisError::Server(msg)),
        other => Err(unexpected("integer", &other)),
    }
}

fn expect_array(reply: Reply) -> Result<Option<Vec<Reply>>> {
    match reply {
        Reply::Array(items) => Ok(items),
        Reply::Error(msg) => Err(RedisError::Server(msg)),
        other => Err(unexpected("array", &other)),
    }
}

/// Collect an array of bulk strings into owned member byte-strings
///
/// A nil array and an empty array both yield an empty sequence; a nil
/// element yields an empty member.
fn members_from(items: Option<Vec<Reply>>) -> Result<Vec<Vec<u8>>> {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|item| match item {
            Reply::BulkString(Some(bytes)) => Ok(bytes),
            Reply::BulkString(None) => Ok(Vec::new()),
            other => Err(unexpected("bulk string", &other)),
        })
        .collect()
}

//! Protocol codec
//!
//! Encoding and decoding functions for the RESP2 wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (multi-bulk)
//! ```text
//! ┌──────────────┬───────────────────────────────────┐
//! │ *<argc>\r\n  │ $<len>\r\n<arg bytes>\r\n  (x argc) │
//! └──────────────┴───────────────────────────────────┘
//! ```
//!
//! ### Reply (one type sigil, then the typed payload)
//! - `+` status line
//! - `-` error line
//! - `:` integer line
//! - `$` length line + payload + CRLF (`$-1` is nil)
//! - `*` count line + that many nested replies (`*-1` is nil)
//!
//! Line terminators are strictly `\r\n` throughout. Anything else is a
//! protocol error, never a reply.

use std::io::{BufRead, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, Reply};
use crate::error::{RedisError, Result};

/// Hard cap on a single bulk payload (512 MB, the server-side value limit)
pub const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a command as a RESP2 multi-bulk request
///
/// Every argument is length-prefixed with its exact byte count, so embedded
/// NUL bytes are carried verbatim. This is the only request form the codec
/// emits; inline commands are not supported.
pub fn encode_command(command: &Command) -> Bytes {
    let argv = command.argv();
    let payload: usize = argv.iter().map(|arg| arg.len() + 16).sum();
    let mut buf = BytesMut::with_capacity(16 + payload);

    buf.put_u8(b'*');
    buf.put_slice(argv.len().to_string().as_bytes());
    buf.put_slice(b"\r\n");

    for arg in argv {
        buf.put_u8(b'$');
        buf.put_slice(arg.len().to_string().as_bytes());
        buf.put_slice(b"\r\n");
        buf.put_slice(arg);
        buf.put_slice(b"\r\n");
    }

    buf.freeze()
}

/// Write an encoded command to a stream and flush it
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Decoding
// =============================================================================

/// Read exactly one reply from a stream
///
/// Blocks until a complete reply has arrived. Any framing violation
/// (unknown type sigil, missing CRLF, malformed length line) aborts the
/// decode with a transport-class error.
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply> {
    let mut sigil = [0u8; 1];
    reader.read_exact(&mut sigil)?;

    match sigil[0] {
        b'+' => Ok(Reply::Status(read_line_lossy(reader)?)),
        b'-' => Ok(Reply::Error(read_line_lossy(reader)?)),
        b':' => read_integer_line(reader).map(Reply::Integer),
        b'$' => read_bulk_string(reader),
        b'*' => read_array(reader),
        other => Err(RedisError::Protocol(format!(
            "unknown reply type sigil 0x{other:02x}"
        ))),
    }
}

fn read_bulk_string<R: BufRead>(reader: &mut R) -> Result<Reply> {
    let len = read_integer_line(reader)?;
    if len == -1 {
        return Ok(Reply::BulkString(None));
    }
    if len < 0 || len > MAX_BULK_LEN {
        return Err(RedisError::Protocol(format!("invalid bulk length {len}")));
    }

    let mut data = vec![0u8; len as usize];
    reader.read_exact(&mut data)?;
    read_crlf(reader)?;

    Ok(Reply::BulkString(Some(data)))
}

fn read_array<R: BufRead>(reader: &mut R) -> Result<Reply> {
    let count = read_integer_line(reader)?;
    if count == -1 {
        return Ok(Reply::Array(None));
    }
    if count < 0 {
        return Err(RedisError::Protocol(format!("invalid array count {count}")));
    }

    // Capacity is clamped so a corrupt count line cannot force a huge
    // allocation before the nested decodes fail.
    let mut items = Vec::with_capacity((count as usize).min(1024));
    for _ in 0..count {
        items.push(read_reply(reader)?);
    }

    Ok(Reply::Array(Some(items)))
}

// =============================================================================
// Line-level helpers
// =============================================================================

/// Read one CRLF-terminated line, returning it without the terminator
fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line)?;

    // Covers EOF before any byte, EOF mid-line, and bare-LF terminators.
    if !line.ends_with(b"\r\n") {
        return Err(RedisError::Protocol(
            "reply line missing CRLF terminator".to_string(),
        ));
    }

    line.truncate(line.len() - 2);
    Ok(line)
}

fn read_line_lossy<R: BufRead>(reader: &mut R) -> Result<String> {
    let line = read_line(reader)?;
    Ok(String::from_utf8_lossy(&line).into_owned())
}

fn read_integer_line<R: BufRead>(reader: &mut R) -> Result<i64> {
    let line = read_line(reader)?;
    std::str::from_utf8(&line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            RedisError::Protocol(format!(
                "malformed integer line [{}]",
                String::from_utf8_lossy(&line)
            ))
        })
}

/// Consume the CRLF trailing a bulk payload
fn read_crlf<R: BufRead>(reader: &mut R) -> Result<()> {
    let mut crlf = [0u8; 2];
    reader.read_exact(&mut crlf)?;
    if &crlf != b"\r\n" {
        return Err(RedisError::Protocol(
            "bulk payload missing CRLF terminator".to_string(),
        ));
    }
    Ok(())
}

//! Connection lifecycle tests
//!
//! Lazy connect, reactive reconnect, and handle ownership, driven against
//! scripted TCP servers.

mod common;

use std::net::TcpListener;

use common::ScriptedServer;
use redwire::network::Connection;
use redwire::protocol::{Command, Reply};
use redwire::{Config, Endpoint, RedisError};

fn connection_to(addr: &str) -> Connection {
    Connection::new(Endpoint::parse(addr).unwrap(), Config::default())
}

#[test]
fn test_new_performs_no_io() {
    // No listener exists on this address; construction must not care.
    let conn = connection_to("127.0.0.1:1");
    assert!(!conn.is_connected());
}

#[test]
fn test_execute_connects_lazily_and_replies() {
    let server = ScriptedServer::spawn(vec![vec![Some(b"+PONG\r\n".to_vec())]]);
    let mut conn = connection_to(server.addr());
    assert!(!conn.is_connected());

    let reply = conn.execute(&Command::new("PING")).unwrap();
    assert_eq!(reply, Reply::Status("PONG".to_string()));
    assert!(conn.is_connected());

    drop(conn);
    assert_eq!(server.join().connections, 1);
}

#[test]
fn test_connect_failure_is_reported_and_recoverable() {
    // Bind then immediately drop a listener so the port is known-dead.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
    drop(listener);

    let mut conn = connection_to(&addr);
    let err = conn.execute(&Command::new("PING")).unwrap_err();
    assert!(matches!(err, RedisError::Connect { .. }));
    assert!(!conn.is_connected());

    // The object stays usable; a second attempt reports again, not panics.
    assert!(conn.execute(&Command::new("PING")).is_err());
    assert!(!conn.is_connected());
}

#[test]
fn test_transport_failure_drops_handle_and_next_call_reconnects() {
    // First connection hangs up without replying; second one answers.
    let server = ScriptedServer::spawn(vec![
        vec![None],
        vec![Some(b"+OK\r\n".to_vec())],
    ]);
    let mut conn = connection_to(server.addr());

    let err = conn.execute(&Command::new("PING")).unwrap_err();
    assert!(
        matches!(err, RedisError::Io(_) | RedisError::Protocol(_)),
        "expected a transport-class error, got {err:?}"
    );
    assert!(!conn.is_connected(), "failed handle must be discarded");

    let reply = conn.execute(&Command::new("PING")).unwrap();
    assert_eq!(reply, Reply::Status("OK".to_string()));
    assert!(conn.is_connected());

    drop(conn);
    // Exactly one reopen: two connections total, no stale handles piling up.
    assert_eq!(server.join().connections, 2);
}

#[test]
fn test_repeated_failures_reopen_once_per_call() {
    let server = ScriptedServer::spawn(vec![vec![None], vec![None], vec![None]]);
    let mut conn = connection_to(server.addr());

    for _ in 0..3 {
        assert!(conn.execute(&Command::new("PING")).is_err());
        assert!(!conn.is_connected());
    }

    drop(conn);
    assert_eq!(server.join().connections, 3);
}

#[test]
fn test_server_error_reply_keeps_handle_open() {
    let server = ScriptedServer::spawn(vec![vec![
        Some(b"-ERR unknown command\r\n".to_vec()),
        Some(b"+OK\r\n".to_vec()),
    ]]);
    let mut conn = connection_to(server.addr());

    // An error reply is a well-formed reply, not a transport failure.
    let reply = conn.execute(&Command::new("NOPE")).unwrap();
    assert_eq!(reply, Reply::Error("ERR unknown command".to_string()));
    assert!(conn.is_connected());

    let reply = conn.execute(&Command::new("PING")).unwrap();
    assert_eq!(reply, Reply::Status("OK".to_string()));

    drop(conn);
    assert_eq!(server.join().connections, 1);
}

#[test]
fn test_malformed_reply_is_protocol_failure() {
    let server = ScriptedServer::spawn(vec![vec![Some(b"?garbage\r\n".to_vec())]]);
    let mut conn = connection_to(server.addr());

    let err = conn.execute(&Command::new("PING")).unwrap_err();
    assert!(matches!(err, RedisError::Protocol(_)));
    assert!(!conn.is_connected());

    drop(conn);
    server.join();
}

#[test]
fn test_close_drops_handle() {
    let server = ScriptedServer::spawn(vec![vec![Some(b"+PONG\r\n".to_vec())]]);
    let mut conn = connection_to(server.addr());

    conn.execute(&Command::new("PING")).unwrap();
    assert!(conn.is_connected());

    conn.close();
    assert!(!conn.is_connected());

    server.join();
}

//! Shared test helpers
//!
//! A scripted TCP server standing in for Redis: it accepts connections in
//! order and, per connection, answers each incoming request with canned
//! reply bytes (or hangs up without replying). Incoming requests are RESP2
//! multi-bulk arrays, so they are parsed with the crate's own decoder and
//! recorded for assertions on the wire shape.

// Not every test harness uses every helper.
#![allow(dead_code)]

use std::io::{BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::JoinHandle;

use redwire::protocol::{read_reply, Reply};

/// One step of a connection script: reply bytes, or `None` to hang up
pub type Step = Option<Vec<u8>>;

/// What the server observed by the time it finished
pub struct ServerReport {
    /// Number of connections accepted
    pub connections: usize,

    /// Every request received, in arrival order across all connections
    pub requests: Vec<Reply>,
}

pub struct ScriptedServer {
    addr: String,
    handle: JoinHandle<ServerReport>,
}

impl ScriptedServer {
    /// Spawn a server that serves the given per-connection scripts in order
    pub fn spawn(connections: Vec<Vec<Step>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind scripted server");
        let port = listener.local_addr().expect("local addr").port();
        let addr = format!("127.0.0.1:{port}");

        let handle = std::thread::spawn(move || {
            let mut report = ServerReport {
                connections: 0,
                requests: Vec::new(),
            };
            for script in connections {
                let (stream, _) = match listener.accept() {
                    Ok(accepted) => accepted,
                    Err(_) => break,
                };
                report.connections += 1;
                serve_one(stream, script, &mut report.requests);
            }
            report
        });

        Self { addr, handle }
    }

    /// Address to hand to the client under test
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Wait for every scripted connection to finish
    pub fn join(self) -> ServerReport {
        self.handle.join().expect("scripted server panicked")
    }
}

fn serve_one(stream: TcpStream, script: Vec<Step>, requests: &mut Vec<Reply>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut writer = stream;

    for step in script {
        match read_reply(&mut reader) {
            Ok(request) => requests.push(request),
            Err(_) => return,
        }
        match step {
            Some(reply) => {
                writer.write_all(&reply).expect("write scripted reply");
                writer.flush().expect("flush scripted reply");
            }
            // Hang up without replying; the client sees a truncated stream.
            None => return,
        }
    }
}

/// Extract the argv of a recorded multi-bulk request
pub fn request_argv(request: &Reply) -> Vec<Vec<u8>> {
    match request {
        Reply::Array(Some(items)) => items
            .iter()
            .map(|item| match item {
                Reply::BulkString(Some(bytes)) => bytes.clone(),
                other => panic!("request argument is not a bulk string: {other:?}"),
            })
            .collect(),
        other => panic!("request is not a multi-bulk array: {other:?}"),
    }
}

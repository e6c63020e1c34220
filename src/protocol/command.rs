//! Command invocation
//!
//! An ordered, binary-safe argument list; argument 0 is the command name.
//! Arguments are always length-prefixed on the wire, so they may contain
//! embedded NUL bytes and CRLF sequences.

/// A command invocation to send to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    args: Vec<Vec<u8>>,
}

impl Command {
    /// Start a command with the given name
    pub fn new(name: &str) -> Self {
        Self {
            args: vec![name.as_bytes().to_vec()],
        }
    }

    /// Append one binary-safe argument
    pub fn arg(mut self, arg: impl AsRef<[u8]>) -> Self {
        self.args.push(arg.as_ref().to_vec());
        self
    }

    /// Append an integer argument in its decimal form
    pub fn arg_int(self, n: i64) -> Self {
        self.arg(n.to_string())
    }

    /// Append every argument yielded by an iterator, in order
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_vec());
        }
        self
    }

    /// Command name (argument 0)
    pub fn name(&self) -> &[u8] {
        &self.args[0]
    }

    /// All arguments in wire order, the name included
    pub fn argv(&self) -> &[Vec<u8>] {
        &self.args
    }
}

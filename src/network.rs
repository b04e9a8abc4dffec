//! Network backend: blocking TCP transport for one submission session.
//!
//! The session protocol is strict half-duplex with exactly two read points
//! (after the handshake and after the final query), so everything here is
//! plain blocking `std::net` I/O. No timeouts, no retries: a hung server
//! hangs the caller, matching the upstream submission scripts.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use crate::protocol::MossError;

/// Default submission server.
pub const MOSS_SERVER: &str = "moss.stanford.edu";

/// Default submission port.
pub const MOSS_PORT: u16 = 7690;

/// Bidirectional byte stream a session runs over. Blanket-implemented so a
/// `TcpStream` and any in-memory test double both qualify.
pub trait Channel: Read + Write {}

impl<T: Read + Write> Channel for T {}

/// Connector seam: how a session obtains its channel. The default is
/// [`connect`]; tests inject a closure returning a scripted channel.
pub type Connector = dyn Fn(&str, u16) -> Result<Box<dyn Channel>, MossError> + Send + Sync;

/// Open a TCP connection to `server:port`, resolving the hostname first.
pub fn connect(server: &str, port: u16) -> Result<Box<dyn Channel>, MossError> {
    let addr = (server, port).to_socket_addrs()?.next().ok_or_else(|| {
        MossError::Connection(io::Error::new(
            io::ErrorKind::NotFound,
            format!("unresolvable server '{server}'"),
        ))
    })?;
    let stream = TcpStream::connect(addr)?;
    Ok(Box::new(stream))
}

/// Write one control line, appending the `\n` terminator.
pub fn write_line(channel: &mut dyn Channel, line: &str) -> std::io::Result<()> {
    channel.write_all(line.as_bytes())?;
    channel.write_all(b"\n")
}

/// Read one line, byte at a time, keeping the trailing `\n` when present.
/// EOF before any byte yields an empty string.
pub fn read_line(channel: &mut dyn Channel) -> std::io::Result<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if channel.read(&mut byte)? == 0 {
            break;
        }
        line.push(byte[0]);
        if byte[0] == b'\n' {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_line_keeps_terminator() {
        let mut chan = Cursor::new(b"yes\nrest".to_vec());
        assert_eq!(read_line(&mut chan).unwrap(), "yes\n");
    }

    #[test]
    fn read_line_stops_at_eof_without_terminator() {
        let mut chan = Cursor::new(b"partial".to_vec());
        assert_eq!(read_line(&mut chan).unwrap(), "partial");
    }

    #[test]
    fn read_line_empty_on_immediate_eof() {
        let mut chan = Cursor::new(Vec::new());
        assert_eq!(read_line(&mut chan).unwrap(), "");
    }

    #[test]
    fn read_line_consumes_one_line_per_call() {
        let mut chan = Cursor::new(b"yes\nhttp://example/1\n".to_vec());
        assert_eq!(read_line(&mut chan).unwrap(), "yes\n");
        assert_eq!(read_line(&mut chan).unwrap(), "http://example/1\n");
        assert_eq!(read_line(&mut chan).unwrap(), "");
    }

    #[test]
    fn write_line_appends_terminator() {
        let mut chan = Cursor::new(Vec::new());
        write_line(&mut chan, "moss 123").unwrap();
        assert_eq!(chan.into_inner(), b"moss 123\n");
    }
}

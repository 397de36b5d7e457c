//!
//! The line-oriented serial link to the controller board. The protocol is
//! ASCII, one newline-terminated command per line, one reply line per command:
//! `"r <dr0> <dr1>"` for a relative step move, `"p u"` / `"p d"` for the pen
//! servo, `"v"` for a firmware version query.
//!

pub mod error;

use std::io::{BufRead, BufReader, Read, Write};
use std::time::Duration;

use error::LinkError;

/// The fixed reply substituted for every query when no real link is attached.
pub const NO_LINK_RESPONSE: &str = "-null serial-";

/// Controller boards talk at 9600 baud.
pub const BAUD_RATE: u32 = 9600;

/// How long a blocking read waits for the controller before giving up.
const READ_TIMEOUT: Duration = Duration::from_secs(10);

///
/// The seam between the motion driver and a physical (or test) serial device.
/// Implementations own the transport; the driver only ever writes a command
/// line and reads a reply line.
///
pub trait SerialLink {
    ///
    /// Writes one command line, appending the newline terminator.
    ///
    /// # Parameters:
    /// - `line`: The command, without a trailing newline
    ///
    fn write_line(&mut self, line: &str) -> Result<(), LinkError>;

    ///
    /// Blocks reading one reply line, returned without its line terminator.
    ///
    fn read_line(&mut self) -> Result<String, LinkError>;
}

///
/// A `SerialLink` over any byte-oriented transport. Reads are buffered so a
/// reply can be consumed line-by-line; writes are flushed immediately, the
/// controller acts on whole lines only.
///
pub struct LineLink<T: Read + Write> {
    io: BufReader<T>,
}

impl<T: Read + Write> LineLink<T> {
    pub fn new(io: T) -> LineLink<T> {
        LineLink { io: BufReader::new(io) }
    }
}

impl<T: Read + Write> SerialLink for LineLink<T> {
    fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        let io = self.io.get_mut();
        io.write_all(line.as_bytes()).map_err(LinkError::Write)?;
        io.write_all(b"\n").map_err(LinkError::Write)?;
        io.flush().map_err(LinkError::Write)
    }

    fn read_line(&mut self) -> Result<String, LinkError> {
        let mut line = String::new();
        self.io.read_line(&mut line).map_err(LinkError::Read)?;
        Ok(line.trim_end().to_owned())
    }
}

///
/// Opens a physical serial device as a line link.
///
/// # Parameters:
/// - `path`: The device path, e.g. `/dev/ttyUSB0` or `COM3`
///
/// # Returns:
/// - A ready `LineLink` over the port
/// - A `LinkError` if the port could not be opened
///
pub fn open_port(path: &str) -> Result<LineLink<Box<dyn serialport::SerialPort>>, LinkError> {
    let port = serialport::new(path, BAUD_RATE)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(|source| LinkError::OpenFailed { path: path.to_owned(), source })?;

    Ok(LineLink::new(port))
}

///
/// Tests relating to the line link framing.
///
#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// An in-memory transport: captures writes, replays canned reads.
    struct Loopback {
        written: Vec<u8>,
        replies: io::Cursor<Vec<u8>>,
    }

    impl Loopback {
        fn new(replies: &str) -> Loopback {
            Loopback { written: Vec::new(), replies: io::Cursor::new(replies.as_bytes().to_vec()) }
        }
    }

    impl Read for &mut Loopback {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.replies.read(buf)
        }
    }

    impl Write for &mut Loopback {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_are_newline_terminated() {
        let mut io = Loopback::new("");
        let mut link = LineLink::new(&mut io);
        link.write_line("r -3 12").unwrap();
        link.write_line("p u").unwrap();
        drop(link);

        assert_eq!(io.written, b"r -3 12\np u\n");
    }

    #[test]
    fn replies_are_stripped_of_terminators() {
        let mut io = Loopback::new("ok 1\r\nok 2\n");
        let mut link = LineLink::new(&mut io);
        assert_eq!(link.read_line().unwrap(), "ok 1");
        assert_eq!(link.read_line().unwrap(), "ok 2");
    }
}

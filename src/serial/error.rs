use thiserror::Error;

/// All errors emitted from the serial module.
///
/// - `OpenFailed`: When the serial device could not be opened
///     Parameters:
///     - `path`: The device path that was requested
/// - `Write`: When writing a command line to an attached link failed
/// - `Read`: When reading a reply line from an attached link failed
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Could not open serial port {}", .path)]
    OpenFailed { path: String, source: serialport::Error },

    #[error("Error writing a command line to the serial link")]
    Write(#[source] std::io::Error),

    #[error("Error reading a reply line from the serial link")]
    Read(#[source] std::io::Error),
}

//! The owning serial port entity.
//!
//! A [`SerialPort`] holds exactly one transport and guarantees the handle is
//! released exactly once, on every exit path: `close()` releases early and is
//! idempotent, and `Drop` covers every path where `close()` was never called.
//! Callers never carry a "remember to close" obligation.

use super::error::PortError;
use super::native::NativeTransport;
use super::traits::{PortSettings, SerialTransport};
use memchr::memchr;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Delimiter byte marking end-of-message for `read_line`.
pub const LINE_DELIMITER: u8 = b'\n';

/// Back-off between polls of a transport that reports `WouldBlock` instead of
/// blocking on its own timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Read chunk size; lines on a serial link are short.
const READ_CHUNK: usize = 256;

/// An open serial port with line-delimited I/O.
///
/// The port is in one of two states, open or closed, and closed is terminal.
/// Every I/O operation on a closed port returns [`PortError::NotOpen`].
/// A `SerialPort` is never cloned; moving it transfers exclusive ownership of
/// the OS handle.
///
/// All I/O takes `&mut self`: one caller at a time, operations execute in
/// issue order, and the port adds no locking or background threads of its
/// own. Callers needing concurrent access must serialize externally.
///
/// # Example
/// ```no_run
/// use lineport::{PortSettings, SerialPort};
///
/// let mut port = SerialPort::open("/dev/ttyUSB0", PortSettings::new(9600))?;
/// port.write_line(b"status\n")?;
/// let reply = port.read_line()?;
/// println!("device said: {}", String::from_utf8_lossy(&reply));
/// // No close required: dropping the port releases the handle.
/// # Ok::<(), lineport::PortError>(())
/// ```
pub struct SerialPort {
    /// `Some` while open; `take()` on close makes release single-shot.
    transport: Option<Box<dyn SerialTransport>>,
    /// Port name, kept past close for logging and error text.
    name: String,
    /// Settings the port was opened with (baud updated on reconfigure).
    settings: PortSettings,
    /// Bytes received but not yet consumed by a delimiter.
    pending: Vec<u8>,
}

impl SerialPort {
    /// Open the named port with the given settings.
    ///
    /// Fails with [`PortError::InvalidConfig`] for an empty name,
    /// [`PortError::NotFound`] when the device does not exist,
    /// [`PortError::Busy`] when it is claimed elsewhere, and
    /// [`PortError::InvalidConfig`] for an unsupported baud rate. No handle
    /// is left allocated on any failure path.
    pub fn open(name: &str, settings: PortSettings) -> Result<Self, PortError> {
        if name.is_empty() {
            return Err(PortError::invalid_config("port name is empty"));
        }

        let transport = NativeTransport::open(name, &settings)?;
        debug!(port = name, baud = settings.baud_rate, "serial port opened");
        Ok(Self::with_transport(Box::new(transport), settings))
    }

    /// Open the named port at 9600 baud with a 1 s read timeout.
    pub fn open_default(name: &str) -> Result<Self, PortError> {
        Self::open(name, PortSettings::default())
    }

    /// Build a port over an already-open transport.
    ///
    /// This is the injection seam: tests hand in a
    /// [`MockTransport`](super::mock::MockTransport) here.
    pub fn with_transport(transport: Box<dyn SerialTransport>, settings: PortSettings) -> Self {
        let name = transport.name().to_string();
        Self {
            transport: Some(transport),
            name,
            settings,
            pending: Vec::new(),
        }
    }

    /// Whether the port is open.
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// The port name this port was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current settings.
    pub fn settings(&self) -> &PortSettings {
        &self.settings
    }

    /// Bytes waiting in the receive buffer, when the backend can tell.
    ///
    /// Returns `None` on a closed port or when the backend cannot report it.
    pub fn bytes_to_read(&self) -> Option<usize> {
        self.transport.as_ref().and_then(|t| t.bytes_to_read())
    }

    /// Reconfigure the baud rate on the open port.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), PortError> {
        let transport = self.transport.as_mut().ok_or(PortError::NotOpen)?;
        transport.set_baud_rate(baud_rate)?;
        self.settings.baud_rate = baud_rate;
        debug!(port = %self.name, baud = baud_rate, "baud rate reconfigured");
        Ok(())
    }

    /// Write the exact byte sequence to the port.
    ///
    /// No terminator is appended; the caller supplies any framing bytes.
    /// Short writes are retried until the whole buffer is on the wire, so a
    /// success means every byte was accepted. Returns the byte count written.
    pub fn write_line(&mut self, bytes: &[u8]) -> Result<usize, PortError> {
        let transport = self.transport.as_mut().ok_or(PortError::NotOpen)?;

        let mut written = 0;
        while written < bytes.len() {
            match transport.write_bytes(&bytes[written..])? {
                0 => {
                    return Err(PortError::Transport(std::io::Error::new(
                        std::io::ErrorKind::WriteZero,
                        "device accepted no bytes",
                    )))
                }
                n => written += n,
            }
        }

        trace!(port = %self.name, bytes = written, "line written");
        Ok(written)
    }

    /// Read one line, waiting at most the configured default timeout.
    ///
    /// See [`read_line_deadline`](Self::read_line_deadline).
    pub fn read_line(&mut self) -> Result<Vec<u8>, PortError> {
        let timeout = self.settings.timeout;
        self.read_line_deadline(timeout)
    }

    /// Read one line, waiting at most `timeout`.
    ///
    /// Blocks until a `\n` is observed, the deadline elapses, or the
    /// transport faults. The returned bytes EXCLUDE the trailing delimiter.
    /// Bytes received after a delimiter are retained for the next read.
    ///
    /// On [`PortError::Timeout`] any partially received bytes are discarded,
    /// so a later read never silently resumes half a message. A timeout is
    /// always reported as the distinct `Timeout` error, never as an empty
    /// line.
    pub fn read_line_deadline(&mut self, timeout: Duration) -> Result<Vec<u8>, PortError> {
        if self.transport.is_none() {
            return Err(PortError::NotOpen);
        }

        let result = self.fill_until_delimiter(timeout);

        // The deadline loop shrinks the transport timeout as it goes; put the
        // configured value back for whoever performs the next operation.
        if let Some(transport) = self.transport.as_mut() {
            let _ = transport.set_timeout(self.settings.timeout);
        }

        result
    }

    fn fill_until_delimiter(&mut self, timeout: Duration) -> Result<Vec<u8>, PortError> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(pos) = memchr(LINE_DELIMITER, &self.pending) {
                let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
                line.pop();
                trace!(port = %self.name, bytes = line.len(), "line received");
                return Ok(line);
            }

            let now = Instant::now();
            if now >= deadline {
                self.pending.clear();
                return Err(PortError::timeout(timeout));
            }

            let transport = match self.transport.as_mut() {
                Some(t) => t,
                None => return Err(PortError::NotOpen),
            };
            transport.set_timeout(deadline - now)?;

            let mut chunk = [0u8; READ_CHUNK];
            match transport.read_bytes(&mut chunk) {
                Ok(0) => {
                    return Err(PortError::Transport(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "device disconnected",
                    )))
                }
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                // Deadline not reached yet: the transport gave up early.
                Err(PortError::Timeout(_)) => {}
                Err(PortError::Transport(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock =>
                {
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Release the OS handle.
    ///
    /// Idempotent: the first call releases, every later call (and the eventual
    /// drop) is a no-op.
    pub fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            debug!(port = %self.name, "serial port closed");
            drop(transport);
        }
        self.pending.clear();
    }
}

impl Drop for SerialPort {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPort")
            .field("name", &self.name)
            .field("open", &self.is_open())
            .field("baud_rate", &self.settings.baud_rate)
            .finish()
    }
}

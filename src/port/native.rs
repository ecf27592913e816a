//! Real serial port transport backed by the `serialport` crate.
//!
//! Maps `serialport` error kinds into the [`PortError`] taxonomy so that
//! callers never see backend-specific failures.

use super::error::PortError;
use super::traits::{PortSettings, SerialTransport};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::trace;

/// Transport over a real OS serial port handle.
///
/// Dropping the value releases the OS handle; the owning
/// [`SerialPort`](crate::SerialPort) ensures that happens exactly once.
pub struct NativeTransport {
    /// The underlying serial port implementation.
    port: Box<dyn serialport::SerialPort>,
    /// The port name/path for identification.
    name: String,
    /// Currently configured timeout, reported back in `Timeout` errors.
    timeout: Duration,
}

impl NativeTransport {
    /// Open a serial port with the given settings.
    ///
    /// Fails without leaking a handle: on any error the builder never hands
    /// out an open descriptor.
    ///
    /// # Example
    /// ```no_run
    /// use lineport::port::{NativeTransport, PortSettings};
    ///
    /// let transport = NativeTransport::open("/dev/ttyUSB0", &PortSettings::default())?;
    /// # Ok::<(), lineport::PortError>(())
    /// ```
    pub fn open(port_name: &str, settings: &PortSettings) -> Result<Self, PortError> {
        let port = serialport::new(port_name, settings.baud_rate)
            .timeout(settings.timeout)
            .open()
            .map_err(|e| map_open_error(port_name, e))?;

        Ok(Self {
            port,
            name: port_name.to_string(),
            timeout: settings.timeout,
        })
    }
}

/// Translate a `serialport` open failure into the port error taxonomy.
fn map_open_error(port_name: &str, e: serialport::Error) -> PortError {
    match e.kind() {
        serialport::ErrorKind::NoDevice => PortError::not_found(port_name),
        serialport::ErrorKind::InvalidInput => PortError::invalid_config(e.to_string()),
        serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
            PortError::busy(port_name)
        }
        serialport::ErrorKind::Io(std::io::ErrorKind::NotFound) => PortError::not_found(port_name),
        _ => PortError::Transport(e.into()),
    }
}

impl SerialTransport for NativeTransport {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let n = self.port.write(data).map_err(|e| self.map_io_error(e))?;
        trace!(port = %self.name, bytes = n, "wrote to serial port");
        Ok(n)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let n = self.port.read(buffer).map_err(|e| self.map_io_error(e))?;
        trace!(port = %self.name, bytes = n, "read from serial port");
        Ok(n)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.port
            .set_timeout(timeout)
            .map_err(|e| PortError::Transport(e.into()))?;
        self.timeout = timeout;
        Ok(())
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), PortError> {
        self.port.set_baud_rate(baud_rate).map_err(|e| match e.kind() {
            serialport::ErrorKind::InvalidInput => PortError::invalid_config(e.to_string()),
            _ => PortError::Transport(e.into()),
        })
    }

    fn bytes_to_read(&self) -> Option<usize> {
        self.port.bytes_to_read().ok().map(|n| n as usize)
    }
}

impl NativeTransport {
    /// The OS reports a blocking deadline expiry as `TimedOut`; everything
    /// else is a genuine transport fault.
    fn map_io_error(&self, e: std::io::Error) -> PortError {
        if e.kind() == std::io::ErrorKind::TimedOut {
            PortError::timeout(self.timeout)
        } else {
            PortError::Transport(e)
        }
    }
}

impl std::fmt::Debug for NativeTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeTransport")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate())
            .finish()
    }
}

//! One-shot command/reply session over a single port.
//!
//! Illustrative caller for the core: opens one port, optionally waits for
//! the device to settle, exchanges command/reply pairs, and releases the
//! port deterministically. Hardware bring-up rarely needs more than this.

use crate::config::Profile;
use crate::port::{PortError, PortSettings, SerialPort};
use std::time::Duration;
use tracing::debug;

/// A conversation with one device over one serial port.
///
/// The session owns its port; dropping the session releases the handle, and
/// [`finish`](Self::finish) releases it early. No close bookkeeping falls on
/// the caller.
///
/// # Example
/// ```no_run
/// use lineport::{PortSettings, Session};
/// use std::time::Duration;
///
/// let mut session = Session::connect("COM11", PortSettings::new(9600))?;
/// session.settle(Duration::from_secs(1));
/// let reply = session.command(b"red")?;
/// println!("received: {reply}");
/// # Ok::<(), lineport::PortError>(())
/// ```
#[derive(Debug)]
pub struct Session {
    port: SerialPort,
}

impl Session {
    /// Open the named port and wrap it in a session.
    pub fn connect(name: &str, settings: PortSettings) -> Result<Self, PortError> {
        let port = SerialPort::open(name, settings)?;
        Ok(Self { port })
    }

    /// Open the port a profile names.
    ///
    /// Fails with [`PortError::InvalidConfig`] when the profile has no port.
    pub fn from_profile(profile: &Profile) -> Result<Self, PortError> {
        let name = profile
            .port
            .as_deref()
            .ok_or_else(|| PortError::invalid_config("profile names no port"))?;
        Self::connect(name, profile.settings())
    }

    /// Run a session over an already-built port (a mock, usually).
    pub fn over(port: SerialPort) -> Self {
        Self { port }
    }

    /// Give the device time to come up after the port opens.
    ///
    /// Some boards reset when the host asserts DTR and drop the first bytes
    /// sent to them; a short wait here avoids that.
    pub fn settle(&self, wait: Duration) {
        debug!(port = %self.port.name(), ?wait, "waiting for device to settle");
        std::thread::sleep(wait);
    }

    /// Send a command and wait for one reply line.
    ///
    /// The command bytes go out exactly as given; the reply is everything up
    /// to the next newline, decoded lossily for display.
    pub fn command(&mut self, command: &[u8]) -> Result<String, PortError> {
        self.port.write_line(command)?;
        let reply = self.port.read_line()?;
        Ok(String::from_utf8_lossy(&reply).into_owned())
    }

    /// The port underneath, for operations the session does not wrap.
    pub fn port(&mut self) -> &mut SerialPort {
        &mut self.port
    }

    /// Release the port now instead of at drop time.
    pub fn finish(mut self) {
        self.port.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockTransport;
    use pretty_assertions::assert_eq;

    fn mock_session(name: &str) -> (Session, crate::port::MockHandle) {
        let transport = MockTransport::new(name);
        let handle = transport.handle();
        let port = SerialPort::with_transport(Box::new(transport), PortSettings::default());
        (Session::over(port), handle)
    }

    #[test]
    fn test_command_round_trip() {
        let (mut session, handle) = mock_session("TEST0");

        handle.enqueue_read(b"red\n");
        let reply = session.command(b"red").unwrap();

        assert_eq!(reply, "red");
        assert_eq!(handle.written(), vec![b"red".to_vec()]);
    }

    #[test]
    fn test_finish_releases_port() {
        let (session, handle) = mock_session("TEST0");
        session.finish();
        assert_eq!(handle.release_count(), 1);
    }

    #[test]
    fn test_drop_releases_port() {
        let (session, handle) = mock_session("TEST0");
        drop(session);
        assert_eq!(handle.release_count(), 1);
    }

    #[test]
    fn test_command_error_still_releases_once() {
        let (mut session, handle) = mock_session("TEST0");

        handle.inject_fault();
        assert!(session.command(b"red").is_err());

        drop(session);
        assert_eq!(handle.release_count(), 1);
    }

    #[test]
    fn test_from_profile_requires_a_port() {
        let profile = Profile::default();
        let result = Session::from_profile(&profile);
        assert!(matches!(result, Err(PortError::InvalidConfig(_))));
    }
}

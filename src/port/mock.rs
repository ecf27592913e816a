//! Mock serial transport for testing.
//!
//! Simulates a serial device without hardware: reads are served from a
//! queue, writes are logged, and timeouts or transport faults can be
//! injected. A [`MockHandle`] observes the shared state from the outside,
//! which is how the tests count handle releases and play the device side
//! of a conversation while a [`SerialPort`](crate::SerialPort) owns the
//! transport.

use super::error::PortError;
use super::traits::SerialTransport;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Inner state of the mock transport, protected by a mutex.
#[derive(Debug)]
struct MockState {
    /// Queue of bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Log of all writes, one entry per `write_bytes` call.
    write_log: Vec<Vec<u8>>,
    /// Echo every written byte back into the read queue.
    loopback: bool,
    /// Whether the next operation should time out.
    should_timeout: bool,
    /// Whether the next operation should fail with a transport fault.
    should_fault: bool,
    /// Configured timeout duration.
    timeout: Duration,
    /// Configured baud rate.
    baud_rate: u32,
    /// Times the transport has been released (dropped).
    released: u32,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            read_queue: VecDeque::new(),
            write_log: Vec::new(),
            loopback: false,
            should_timeout: false,
            should_fault: false,
            timeout: Duration::from_secs(1),
            baud_rate: 9600,
            released: 0,
        }
    }
}

impl MockState {
    /// Consume a pending injection, if any.
    fn take_injection(&mut self) -> Option<PortError> {
        if self.should_timeout {
            self.should_timeout = false;
            return Some(PortError::timeout(self.timeout));
        }
        if self.should_fault {
            self.should_fault = false;
            return Some(PortError::Transport(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "injected transport fault",
            )));
        }
        None
    }
}

/// Mock serial transport.
///
/// The transport itself is an exclusive handle, like a real port: it is not
/// `Clone`, and dropping it counts as releasing the device. Create a
/// [`MockHandle`] before handing the transport over to keep a view into the
/// shared state.
///
/// # Example
/// ```
/// use lineport::port::{MockTransport, SerialTransport};
///
/// let mut transport = MockTransport::new("MOCK0");
/// let handle = transport.handle();
///
/// handle.enqueue_read(b"pong\n");
/// let mut buffer = [0u8; 8];
/// let n = transport.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"pong\n");
///
/// transport.write_bytes(b"ping\n").unwrap();
/// assert_eq!(handle.written(), vec![b"ping\n".to_vec()]);
///
/// drop(transport);
/// assert_eq!(handle.release_count(), 1);
/// ```
#[derive(Debug)]
pub struct MockTransport {
    /// The port name/identifier.
    name: String,
    /// Shared state, also visible through handles.
    state: Arc<Mutex<MockState>>,
}

/// Observer for a [`MockTransport`]'s shared state.
///
/// Handles are cheap to clone and outlive the transport, so a test can keep
/// asserting after the port under test has released it.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a new mock transport with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create an observer handle onto this transport's state.
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MockHandle {
    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.lock().read_queue.extend(data);
    }

    /// Echo written bytes back into the read queue (a loopback plug).
    pub fn set_loopback(&self, enabled: bool) {
        self.lock().loopback = enabled;
    }

    /// Make the next read or write time out.
    pub fn inject_timeout(&self) {
        self.lock().should_timeout = true;
    }

    /// Make the next read or write fail with a transport fault.
    pub fn inject_fault(&self) {
        self.lock().should_fault = true;
    }

    /// All writes so far, one entry per call.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.lock().write_log.clone()
    }

    /// Number of bytes waiting in the read queue.
    pub fn available_bytes(&self) -> usize {
        self.lock().read_queue.len()
    }

    /// Currently configured baud rate.
    pub fn baud_rate(&self) -> u32 {
        self.lock().baud_rate
    }

    /// Times the transport has been released. The invariant under test is
    /// that this reaches exactly 1, on every exit path.
    pub fn release_count(&self) -> u32 {
        self.lock().released
    }
}

impl SerialTransport for MockTransport {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.lock();

        if let Some(err) = state.take_injection() {
            return Err(err);
        }

        state.write_log.push(data.to_vec());
        if state.loopback {
            state.read_queue.extend(data);
        }
        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.lock();

        if let Some(err) = state.take_injection() {
            return Err(err);
        }

        let mut bytes_read = 0;
        for byte in buffer.iter_mut() {
            match state.read_queue.pop_front() {
                Some(queued) => {
                    *byte = queued;
                    bytes_read += 1;
                }
                None => break,
            }
        }

        if bytes_read == 0 {
            // An idle device: report "no data yet" rather than blocking.
            Err(PortError::Transport(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "no data available",
            )))
        } else {
            Ok(bytes_read)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.lock().timeout = timeout;
        Ok(())
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), PortError> {
        if baud_rate == 0 {
            return Err(PortError::invalid_config("baud rate must be nonzero"));
        }
        self.lock().baud_rate = baud_rate;
        Ok(())
    }

    fn bytes_to_read(&self) -> Option<usize> {
        Some(self.lock().read_queue.len())
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.lock().released += 1;
    }
}

//! Minimal cross-platform serial port library.
//!
//! `lineport` covers the three things a hardware bring-up tool needs from a
//! host serial port: enumerate what the OS can see, open a named port at a
//! baud rate, and exchange newline-delimited messages. The OS handle is
//! released exactly once on every exit path; there is no close discipline
//! for callers to get wrong.
//!
//! # Modules
//!
//! - `catalog`: port enumeration with compile-time platform backends
//! - `port`: the [`SerialPort`] core, its transport seam, and the mock
//! - `session`: illustrative command/reply caller over one port
//! - `config`: TOML connection profiles
//!
//! # Example
//!
//! Talking to a device over a loopback mock (no hardware required):
//!
//! ```
//! use lineport::{MockTransport, PortSettings, SerialPort};
//!
//! let transport = MockTransport::new("TEST0");
//! let handle = transport.handle();
//! handle.set_loopback(true);
//!
//! let mut port = SerialPort::with_transport(Box::new(transport), PortSettings::default());
//! port.write_line(b"red\n")?;
//! assert_eq!(port.read_line()?, b"red");
//!
//! port.close();
//! assert_eq!(handle.release_count(), 1);
//! # Ok::<(), lineport::PortError>(())
//! ```
//!
//! On real hardware the flow is the same with [`SerialPort::open`] and a
//! name from [`catalog::list_ports`].
//!
//! # Blocking model
//!
//! All I/O is synchronous and blocking; `read_line` is the only call that
//! waits for an extended time, and its deadline is explicit. Ports are
//! single-caller: operations take `&mut self` and execute in issue order.

pub mod catalog;
pub mod config;
pub mod port;
pub mod session;

// Re-export commonly used types for convenience
pub use catalog::{list_ports, PortDescriptor};
pub use config::{ConfigError, ConfigResult, Profile};
pub use port::{
    MockHandle, MockTransport, NativeTransport, PortError, PortSettings, SerialPort,
    SerialTransport, LINE_DELIMITER,
};
pub use session::Session;

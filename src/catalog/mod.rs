//! Port catalog: enumerate the serial ports the OS can currently see.
//!
//! One backend per platform, selected at compile time; both produce the same
//! [`PortDescriptor`] shape. Enumeration failure degrades to an empty result
//! on every platform: "catalog unavailable" is reported as "zero ports",
//! never as an error and never as a panic.

use serde::{Deserialize, Serialize};

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;

#[cfg(unix)]
use self::unix as backend;

#[cfg(windows)]
use self::windows as backend;

/// One enumerated serial port.
///
/// An immutable value: its identity is the `name` string, and two
/// descriptors with the same name are interchangeable. `name` is the
/// platform-native address (`COM7`, `/dev/ttyUSB0`) that [`SerialPort::open`]
/// accepts; `label` is the OS-reported human-readable name where the
/// platform provides one.
///
/// [`SerialPort::open`]: crate::SerialPort::open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescriptor {
    /// Platform-native port identifier.
    pub name: String,

    /// Human-readable device label, when the OS reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PortDescriptor {
    /// Descriptor with a name and no label.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
        }
    }

    /// Descriptor with a name and a label.
    pub fn labeled(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: Some(label.into()),
        }
    }
}

/// List the serial ports currently visible to the operating system.
///
/// The result is finite, unordered, and possibly empty; duplicates reported
/// by the OS are preserved. Each call queries live OS state and shares
/// nothing with other calls.
pub fn list_ports() -> Vec<PortDescriptor> {
    backend::list_ports()
}

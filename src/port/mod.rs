//! Serial port core: the transport seam, its implementations, and the
//! owning [`SerialPort`] entity.

pub mod error;
pub mod mock;
pub mod native;
pub mod serial;
pub mod traits;

pub use error::PortError;
pub use mock::{MockHandle, MockTransport};
pub use native::NativeTransport;
pub use serial::{SerialPort, LINE_DELIMITER};
pub use traits::{PortSettings, SerialTransport, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};

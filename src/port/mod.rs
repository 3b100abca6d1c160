/// Access to the two EC I/O ports
///
/// The transport only needs three primitives from its environment: read a
/// byte from a port, write a byte to a port, and sleep between status
/// samples. Everything platform specific lives behind `PortIo`.

mod hardware;
mod linux;

pub use self::hardware::{
	PortIo,
	reliable_sleep,
};

// OS-specific. for now linux only.
pub use self::linux::{
	DevPort,
	open_dev_port,
};

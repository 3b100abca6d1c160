/* ThinkPad embedded controller, byte access through ports 0x1600/0x1604 */

// The EC is driven by polling only: write a command to the control port,
// the register offset to the data port, then wait for the status bits to
// signal that the controller consumed the input (IBF clear) or produced
// output (OBF set).

mod diag;
mod poll;
mod shared;
mod status;
mod transport;

#[cfg(test)]
mod sim;

#[allow(dead_code)]
pub mod consts {
	use std::time::Duration;

	pub const EC_DATAPORT: u16 = 0x1600; // EC data io-port (0x62 on ACPI ECs)
	pub const EC_CTRLPORT: u16 = 0x1604; // EC control io-port (0x66 on ACPI ECs)

	// status register bits
	pub const EC_STAT_OBF: u8 = 0x01; // output buffer full
	pub const EC_STAT_IBF: u8 = 0x02; // input buffer full
	pub const EC_STAT_CMD: u8 = 0x08; // last write was a command (0 = data)

	// commands, written to EC_CTRLPORT
	pub const EC_CMD_READ: u8 = 0x80;
	pub const EC_CMD_WRITE: u8 = 0x81;
	pub const EC_CMD_QUERY: u8 = 0x84;

	pub const TICK: Duration = Duration::from_millis(10);
	pub const IDLE_TIMEOUT: Duration = Duration::from_millis(1000);
	pub const PHASE_TIMEOUT: Duration = Duration::from_millis(100);

	// full handshake attempts per read/write
	pub const SETUP_TRIES: u32 = 5;
}

pub use self::diag::{
	DIAGNOSTIC_LOG_CAPACITY,
	DiagnosticLog,
	Diagnostics,
	NoDiagnostics,
};

pub use self::poll::{
	Phase,
	PollTimeout,
	poll_status,
};

pub use self::shared::{
	EcTransaction,
	SharedEc,
};

pub use self::status::EcStatus;

pub use self::transport::{
	EcTimeout,
	EcTransport,
};

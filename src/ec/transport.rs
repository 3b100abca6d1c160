use failure::Fail;

use crate::port::PortIo;

use super::{
	Diagnostics,
	EcStatus,
	NoDiagnostics,
	Phase,
	poll_status,
};
use super::consts::*;

/// The controller didn't reach the expected state in time
///
/// Covers absent, busy and broken controllers alike; the failing phase is
/// only logged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Fail)]
#[fail(display = "EC timeout")]
pub struct EcTimeout;

/// Byte access to EC registers
///
/// Not synchronized: a transaction must not interleave with any other access
/// to the same ports. Wrap it in a `SharedEc` unless the ports are
/// exclusively owned anyway.
pub struct EcTransport<P: PortIo, D: Diagnostics = NoDiagnostics> {
	port: P,
	diagnostics: D,
}

impl<P: PortIo> EcTransport<P> {
	pub fn without_diagnostics(port: P) -> Self {
		EcTransport::new(port, NoDiagnostics)
	}
}

impl<P: PortIo, D: Diagnostics> EcTransport<P, D> {
	pub fn new(port: P, diagnostics: D) -> Self {
		EcTransport {
			port,
			diagnostics,
		}
	}

	pub fn port(&self) -> &P {
		&self.port
	}

	pub fn port_mut(&mut self) -> &mut P {
		&mut self.port
	}

	pub fn diagnostics(&self) -> &D {
		&self.diagnostics
	}

	pub fn into_inner(self) -> (P, D) {
		(self.port, self.diagnostics)
	}

	fn wait(&mut self, phase: Phase) -> Result<EcStatus, EcTimeout> {
		poll_status(&mut self.port, phase.budget(), |s| phase.is_satisfied(s)).map_err(|e| {
			debug!("EC timeout in phase {:?} after {:?}, last status {:?}", phase, e.budget, e.last);
			EcTimeout
		})
	}

	// a byte that never reached the controller fails the operation like a
	// timeout; it is not retried
	fn write_ctrl(&mut self, command: u8) -> Result<(), EcTimeout> {
		trace!("EC command 0x{:02x}", command);
		self.port.write_port(EC_CTRLPORT, command).map_err(|e| {
			debug!("EC command 0x{:02x} not written: {}", command, e);
			EcTimeout
		})
	}

	fn write_data(&mut self, data: u8) -> Result<(), EcTimeout> {
		trace!("EC data 0x{:02x}", data);
		self.port.write_port(EC_DATAPORT, data).map_err(|e| {
			debug!("EC data 0x{:02x} not written: {}", data, e);
			EcTimeout
		})
	}

	// Runs the setup phases until the controller has taken `offset` and
	// reached `last_phase`. Only a `last_phase` timeout is retried; the
	// earlier phases fail the whole operation right away.
	fn handshake(&mut self, command: u8, offset: u8, last_phase: Phase) -> Result<(), EcTimeout> {
		let mut tries = SETUP_TRIES;
		let mut ready = false;

		while tries > 0 {
			self.wait(Phase::Idle)?;
			self.write_ctrl(command)?;
			self.wait(Phase::CommandAccepted)?;
			self.write_data(offset)?;

			ready = self.wait(last_phase).is_ok();
			if ready {
				tries = 1;
			} else {
				debug!("EC command 0x{:02x} offset 0x{:02x}: {} tries left", command, offset, tries - 1);
			}
			tries -= 1;
		}

		if !ready {
			warn!("EC command 0x{:02x} offset 0x{:02x}: giving up after {} tries", command, offset, SETUP_TRIES);
			return Err(EcTimeout);
		}

		Ok(())
	}

	/// Reads the EC register at `offset`.
	///
	/// Successful reads are recorded in the diagnostics log.
	pub fn read_byte(&mut self, offset: u8) -> Result<u8, EcTimeout> {
		self.handshake(EC_CMD_READ, offset, Phase::DataReady)?;

		let data = self.port.read_port(EC_DATAPORT);

		if self.diagnostics.enabled() {
			self.diagnostics.append(format_args!("readec: offset= {:x}, data= {:02x}\n", offset, data));
		}

		Ok(data)
	}

	/// Writes `data` to the EC register at `offset`.
	///
	/// The transaction is complete once the controller accepted the offset;
	/// the data byte itself isn't confirmed. Writes are not recorded in the
	/// diagnostics log.
	pub fn write_byte(&mut self, offset: u8, data: u8) -> Result<(), EcTimeout> {
		self.handshake(EC_CMD_WRITE, offset, Phase::OffsetAccepted)?;

		self.write_data(data)
	}
}

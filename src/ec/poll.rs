use std::time::Duration;

use crate::port::PortIo;

use super::EcStatus;
use super::consts::*;

/// The wait phases of a read or write handshake
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Phase {
	/// before issuing a command: no input or output pending
	Idle,
	/// command written, controller must consume it
	CommandAccepted,
	/// read: offset written, controller must provide the data byte
	DataReady,
	/// write: offset written, controller must consume it
	OffsetAccepted,
}

impl Phase {
	/// The controller might still be busy with a transaction started by
	/// firmware, so becoming idle gets the long budget; all other phases
	/// must respond quickly.
	pub fn budget(self) -> Duration {
		match self {
			Phase::Idle => IDLE_TIMEOUT,
			_ => PHASE_TIMEOUT,
		}
	}

	pub fn is_satisfied(self, status: EcStatus) -> bool {
		match self {
			Phase::Idle | Phase::CommandAccepted | Phase::OffsetAccepted => status.is_idle(),
			Phase::DataReady => status.is_obf(),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PollTimeout {
	pub budget: Duration,
	/// status from the last sample
	pub last: EcStatus,
}

/// Sample the control port every `TICK` until `predicate` holds or `budget`
/// is used up.
///
/// Every sample that fails the predicate is followed by a sleep, so a
/// timeout consumes exactly `budget` worth of ticks.
pub fn poll_status<P, F>(port: &mut P, budget: Duration, predicate: F) -> Result<EcStatus, PollTimeout>
where
	P: PortIo + ?Sized,
	F: Fn(EcStatus) -> bool,
{
	let mut last = EcStatus::default();
	let mut elapsed = Duration::from_millis(0);

	while elapsed < budget {
		last = EcStatus(port.read_port(EC_CTRLPORT));
		trace!("EC status: {:?}", last);
		if predicate(last) {
			return Ok(last);
		}
		port.sleep(TICK);
		elapsed += TICK;
	}

	Err(PollTimeout {
		budget,
		last,
	})
}

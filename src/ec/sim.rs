use std::io;
use std::time::Duration;

use crate::port::PortIo;

use super::consts::*;

// longer than one phase budget, well below the idle budget
const DEFAULT_STALL_MS: u64 = 150;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
	Idle,
	Command(u8),
	// read: data byte latched in the output buffer
	Output(u8),
	// write: offset accepted, waiting for the data byte
	AwaitData(u8),
	// offset lost; busy until the given time
	Stalled(u64),
}

/// Scripted embedded controller on a virtual clock
///
/// Sleeping advances `now_ms` instead of blocking.
pub struct SimEc {
	pub registers: [u8; 256],
	pub now_ms: u64,
	/// reports IBF until `now_ms` reaches this
	pub busy_until_ms: u64,
	/// never consume commands
	pub reject_commands: bool,
	/// number of attempts (command writes) for which the offset is lost
	pub stall_attempts: u32,
	/// a lost offset keeps IBF up this long
	pub stall_ms: u64,
	/// port writes that succeed before every further write fails
	pub accepted_writes: Option<usize>,

	pub attempts: u32,
	pub status_reads: usize,
	pub writes: Vec<(u16, u8)>,
	pub locks: u32,
	pub locked: bool,

	state: State,
}

impl SimEc {
	pub fn new() -> Self {
		SimEc {
			registers: [0u8; 256],
			now_ms: 0,
			busy_until_ms: 0,
			reject_commands: false,
			stall_attempts: 0,
			stall_ms: DEFAULT_STALL_MS,
			accepted_writes: None,
			attempts: 0,
			status_reads: 0,
			writes: Vec::new(),
			locks: 0,
			locked: false,
			state: State::Idle,
		}
	}

	pub fn data_writes(&self) -> Vec<u8> {
		self.writes.iter().filter(|&&(port, _)| port == EC_DATAPORT).map(|&(_, data)| data).collect()
	}

	fn status(&mut self) -> u8 {
		if self.now_ms < self.busy_until_ms {
			return EC_STAT_IBF;
		}
		match self.state {
			State::Idle | State::AwaitData(_) => 0,
			State::Command(_) if self.reject_commands => EC_STAT_IBF | EC_STAT_CMD,
			State::Command(_) => EC_STAT_CMD,
			State::Output(_) => EC_STAT_OBF,
			State::Stalled(until) => {
				if self.now_ms < until {
					EC_STAT_IBF
				} else {
					self.state = State::Idle;
					0
				}
			}
		}
	}
}

impl PortIo for SimEc {
	fn read_port(&mut self, port: u16) -> u8 {
		match port {
			EC_CTRLPORT => {
				self.status_reads += 1;
				self.status()
			},
			EC_DATAPORT => match self.state {
				State::Output(data) => {
					self.state = State::Idle;
					data
				},
				_ => 0xff,
			},
			_ => panic!("unexpected port read 0x{:04x}", port),
		}
	}

	fn write_port(&mut self, port: u16, data: u8) -> io::Result<()> {
		if let Some(accepted) = self.accepted_writes {
			if self.writes.len() >= accepted {
				return Err(io::Error::new(io::ErrorKind::Other, "port write rejected"));
			}
		}
		self.writes.push((port, data));
		match port {
			EC_CTRLPORT => {
				self.attempts += 1;
				self.state = State::Command(data);
			},
			EC_DATAPORT => match self.state {
				State::Command(_) if self.attempts <= self.stall_attempts => {
					self.state = State::Stalled(self.now_ms + self.stall_ms);
				},
				State::Command(EC_CMD_READ) => {
					self.state = State::Output(self.registers[data as usize]);
				},
				State::Command(EC_CMD_WRITE) => {
					self.state = State::AwaitData(data);
				},
				State::AwaitData(offset) => {
					self.registers[offset as usize] = data;
					self.state = State::Idle;
				},
				state => panic!("unexpected data write 0x{:02x} in state {:?}", data, state),
			},
			_ => panic!("unexpected port write 0x{:04x}", port),
		}
		Ok(())
	}

	fn sleep(&mut self, duration: Duration) {
		self.now_ms += duration.as_millis() as u64;
	}

	fn acquire(&mut self) -> crate::AResult<()> {
		assert!(!self.locked, "nested transaction");
		self.locked = true;
		self.locks += 1;
		Ok(())
	}

	fn release(&mut self) {
		assert!(self.locked, "release without acquire");
		self.locked = false;
	}
}

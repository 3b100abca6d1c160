use std::io;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

/// `thread::sleep` may return early; keep sleeping until `duration` really
/// passed.
pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

pub trait PortIo {
	fn read_port(&mut self, port: u16) -> u8;
	fn write_port(&mut self, port: u16, data: u8) -> io::Result<()>;

	// sleep for (at least) `duration`
	fn sleep(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}

	/// Called when a transaction starts; implementations shared with other
	/// processes take their exclusive lock here.
	fn acquire(&mut self) -> crate::AResult<()> {
		Ok(())
	}

	/// Counterpart to `acquire`, called when the transaction ends.
	fn release(&mut self) {
	}
}

impl<'a, P: ?Sized + PortIo> PortIo for &'a mut P {
	fn read_port(&mut self, port: u16) -> u8 {
		P::read_port(*self, port)
	}
	fn write_port(&mut self, port: u16, data: u8) -> io::Result<()> {
		P::write_port(*self, port, data)
	}
	fn sleep(&mut self, duration: Duration) {
		P::sleep(*self, duration)
	}
	fn acquire(&mut self) -> crate::AResult<()> {
		P::acquire(*self)
	}
	fn release(&mut self) {
		P::release(*self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reliable_sleep_waits_at_least_duration() {
		let duration = Duration::from_millis(5);
		let start = Instant::now();
		reliable_sleep(duration);
		assert!(start.elapsed() >= duration);
	}

	#[test]
	fn reliable_sleep_zero_returns() {
		reliable_sleep(Duration::from_millis(0));
	}
}

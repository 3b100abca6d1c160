use std::fmt::{
	self,
	Write,
};
use std::sync::{
	Arc,
	Mutex,
	MutexGuard,
};
use std::sync::atomic::{
	AtomicU32,
	Ordering,
};

pub const DIAGNOSTIC_LOG_CAPACITY: usize = 8192;

/// Receives a record for every successful register read
pub trait Diagnostics {
	fn enabled(&self) -> bool;
	fn append(&self, entry: fmt::Arguments);
}

impl<'a, D: ?Sized + Diagnostics> Diagnostics for &'a D {
	fn enabled(&self) -> bool {
		D::enabled(*self)
	}
	fn append(&self, entry: fmt::Arguments) {
		D::append(*self, entry)
	}
}

impl<D: ?Sized + Diagnostics> Diagnostics for Arc<D> {
	fn enabled(&self) -> bool {
		D::enabled(&**self)
	}
	fn append(&self, entry: fmt::Arguments) {
		D::append(&**self, entry)
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {
	fn enabled(&self) -> bool {
		false
	}
	fn append(&self, _entry: fmt::Arguments) {
	}
}

/// Fixed capacity text log; entries are only recorded while the verbosity
/// is above zero.
///
/// The log is never cleared by the transport. An entry that doesn't fit
/// anymore is dropped as a whole.
#[derive(Debug)]
pub struct DiagnosticLog {
	verbosity: AtomicU32,
	capacity: usize,
	buffer: Mutex<String>,
}

impl DiagnosticLog {
	pub fn new(verbosity: u32) -> Self {
		Self::with_capacity(verbosity, DIAGNOSTIC_LOG_CAPACITY)
	}

	pub fn with_capacity(verbosity: u32, capacity: usize) -> Self {
		DiagnosticLog {
			verbosity: AtomicU32::new(verbosity),
			capacity,
			buffer: Mutex::new(String::new()),
		}
	}

	pub fn verbosity(&self) -> u32 {
		self.verbosity.load(Ordering::Relaxed)
	}

	pub fn set_verbosity(&self, verbosity: u32) {
		self.verbosity.store(verbosity, Ordering::Relaxed);
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	fn buffer(&self) -> MutexGuard<'_, String> {
		// a panic while appending can't leave the String inconsistent
		self.buffer.lock().unwrap_or_else(|e| e.into_inner())
	}

	pub fn contents(&self) -> String {
		self.buffer().clone()
	}

	pub fn len(&self) -> usize {
		self.buffer().len()
	}

	pub fn is_empty(&self) -> bool {
		self.buffer().is_empty()
	}
}

impl Default for DiagnosticLog {
	fn default() -> Self {
		Self::new(0)
	}
}

impl Diagnostics for DiagnosticLog {
	fn enabled(&self) -> bool {
		self.verbosity() > 0
	}

	fn append(&self, entry: fmt::Arguments) {
		let mut line = String::new();
		if line.write_fmt(entry).is_err() {
			return;
		}

		let mut buffer = self.buffer();
		if buffer.len() + line.len() > self.capacity {
			warn!("diagnostic log full ({} bytes), dropping entry {:?}", buffer.len(), line);
			return;
		}
		buffer.push_str(&line);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::thread;

	#[test]
	fn verbosity_controls_enabled() {
		let log = DiagnosticLog::default();
		assert!(!log.enabled());
		log.set_verbosity(2);
		assert!(log.enabled());
		assert_eq!(log.verbosity(), 2);
		log.set_verbosity(0);
		assert!(!log.enabled());
		assert_eq!(log.capacity(), DIAGNOSTIC_LOG_CAPACITY);
	}

	#[test]
	fn appends_in_order() {
		let log = DiagnosticLog::new(1);
		log.append(format_args!("a={}\n", 1));
		log.append(format_args!("b={}\n", 2));
		assert_eq!(log.contents(), "a=1\nb=2\n");
		assert_eq!(log.len(), 8);
	}

	#[test]
	fn drops_entries_that_dont_fit() {
		let log = DiagnosticLog::with_capacity(1, 10);
		log.append(format_args!("12345\n"));
		log.append(format_args!("67890\n"));
		log.append(format_args!("abc\n"));
		assert_eq!(log.contents(), "12345\nabc\n");
		assert_eq!(log.len(), 10);
	}

	#[test]
	fn concurrent_appends_dont_interleave() {
		let log = Arc::new(DiagnosticLog::new(1));
		let threads: Vec<_> = (0..4u8).map(|t| {
			let log = log.clone();
			thread::spawn(move || {
				for i in 0..50u8 {
					log.append(format_args!("thread {} entry {:02x}\n", t, i));
				}
			})
		}).collect();
		for t in threads {
			t.join().unwrap();
		}

		let contents = log.contents();
		assert_eq!(contents.lines().count(), 200);
		for line in contents.lines() {
			assert!(line.starts_with("thread "), "garbled line {:?}", line);
			assert_eq!(line.len(), "thread 0 entry 00".len());
		}
	}

	#[test]
	fn no_diagnostics_is_disabled() {
		assert!(!NoDiagnostics.enabled());
		NoDiagnostics.append(format_args!("ignored"));
	}
}

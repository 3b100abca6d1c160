use std::ops::{
	Deref,
	DerefMut,
};
use std::sync::{
	Mutex,
	MutexGuard,
};

use crate::port::PortIo;

use super::{
	Diagnostics,
	EcTransport,
	NoDiagnostics,
};

/// `EcTransport` behind a lock
///
/// Every read or write runs inside an `EcTransaction`, which holds the
/// process-local mutex and the port's own (possibly cross-process) lock for
/// the whole handshake including its retries.
pub struct SharedEc<P: PortIo, D: Diagnostics = NoDiagnostics> {
	inner: Mutex<EcTransport<P, D>>,
}

impl<P: PortIo, D: Diagnostics> SharedEc<P, D> {
	pub fn new(transport: EcTransport<P, D>) -> Self {
		SharedEc {
			inner: Mutex::new(transport),
		}
	}

	pub fn into_inner(self) -> EcTransport<P, D> {
		self.inner.into_inner().unwrap_or_else(|e| e.into_inner())
	}

	pub fn transaction(&self) -> crate::AResult<EcTransaction<'_, P, D>> {
		let mut guard = self.inner.lock().unwrap_or_else(|e| {
			// the next idle wait resynchronizes with the controller
			warn!("EC transaction panicked; continuing");
			e.into_inner()
		});
		guard.port_mut().acquire()?;
		Ok(EcTransaction(guard))
	}

	pub fn read_byte(&self, offset: u8) -> crate::AResult<u8> {
		Ok(self.transaction()?.read_byte(offset)?)
	}

	pub fn write_byte(&self, offset: u8, data: u8) -> crate::AResult<()> {
		Ok(self.transaction()?.write_byte(offset, data)?)
	}
}

/// Exclusive access to the EC; released on drop
pub struct EcTransaction<'a, P: PortIo + 'a, D: Diagnostics + 'a>(MutexGuard<'a, EcTransport<P, D>>);

impl<'a, P: PortIo, D: Diagnostics> Drop for EcTransaction<'a, P, D> {
	fn drop(&mut self) {
		self.0.port_mut().release();
	}
}

impl<'a, P: PortIo, D: Diagnostics> Deref for EcTransaction<'a, P, D> {
	type Target = EcTransport<P, D>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<'a, P: PortIo, D: Diagnostics> DerefMut for EcTransaction<'a, P, D> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

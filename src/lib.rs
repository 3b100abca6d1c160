extern crate failure;
#[macro_use]
extern crate log;

#[macro_export]
macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		$crate::with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod ec;
pub mod port;

pub use self::ec::{
	DiagnosticLog,
	Diagnostics,
	EcTimeout,
	EcTransaction,
	EcTransport,
	NoDiagnostics,
	SharedEc,
};

pub use self::port::{
	DevPort,
	PortIo,
	open_dev_port,
};

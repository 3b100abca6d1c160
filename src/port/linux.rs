use std::fs;
use std::io;
use std::os::unix::fs::FileExt;
use std::os::unix::io::AsRawFd;
use std::path::{
	Path,
	PathBuf,
};

use libc::{
	EINTR,
	LOCK_EX,
	LOCK_UN,
	flock,
};

use super::PortIo;

/// Port I/O through the kernel's `/dev/port` device: the file offset is the
/// port address.
#[derive(Debug)]
pub struct DevPort {
	file: fs::File,
	path: PathBuf,
	locked: bool,
}

impl DevPort {
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_exact_at(&self, buf: &mut [u8], port: u16) -> io::Result<()> {
		// single byte port access; must complete in one step
		let l = self.file.read_at(buf, u64::from(port))?;
		if l != buf.len() {
			Err(io::Error::new(io::ErrorKind::UnexpectedEof, "failed to read port"))
		} else {
			Ok(())
		}
	}

	fn write_exact_at(&self, buf: &[u8], port: u16) -> io::Result<()> {
		let l = self.file.write_at(buf, u64::from(port))?;
		if l != buf.len() {
			Err(io::Error::new(io::ErrorKind::Other, "failed to write port"))
		} else {
			Ok(())
		}
	}

	fn lock_file(&self, operation: libc::c_int) -> io::Result<()> {
		loop {
			let res = unsafe { flock(self.file.as_raw_fd(), operation) };
			if 0 == res {
				return Ok(());
			}
			let e = io::Error::last_os_error();
			if e.raw_os_error() != Some(EINTR) {
				return Err(e);
			}
		}
	}
}

impl PortIo for DevPort {
	fn read_port(&mut self, port: u16) -> u8 {
		let mut buf = [0u8];
		match self.read_exact_at(&mut buf, port) {
			Ok(()) => buf[0],
			Err(e) => {
				// an unreadable port looks like a floating bus: all bits set
				error!("{}: reading port 0x{:04x} failed: {}", self.path.display(), port, e);
				0xff
			}
		}
	}

	fn write_port(&mut self, port: u16, data: u8) -> io::Result<()> {
		self.write_exact_at(&[data], port).map_err(|e| {
			error!("{}: writing 0x{:02x} to port 0x{:04x} failed: {}", self.path.display(), data, port, e);
			e
		})
	}

	fn acquire(&mut self) -> crate::AResult<()> {
		with_context!(("couldn't lock {}", self.path.display()), {
			self.lock_file(LOCK_EX)?;
			Ok(())
		})?;
		self.locked = true;
		Ok(())
	}

	fn release(&mut self) {
		if !self.locked {
			return;
		}
		self.locked = false;
		if let Err(e) = self.lock_file(LOCK_UN) {
			warn!("couldn't unlock {}: {}", self.path.display(), e);
		}
	}
}

impl Drop for DevPort {
	fn drop(&mut self) {
		self.release();
	}
}

pub fn open_dev_port<P: AsRef<Path>>(path: P) -> crate::AResult<DevPort> {
	let path = path.as_ref().to_path_buf();

	let file = with_context!(("couldn't open {}; try sudo?", path.display()), {
		Ok(fs::OpenOptions::new()
			.read(true)
			.write(true)
			.open(&path)?)
	})?;

	debug!("opened {} for EC port access", path.display());

	Ok(DevPort {
		file,
		path,
		locked: false,
	})
}

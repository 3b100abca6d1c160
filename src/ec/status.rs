use std::fmt;

use super::consts::*;

/// Value of the EC status (control) register
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EcStatus(pub u8);

impl EcStatus {
	pub fn is_obf(&self) -> bool {
		0 != self.0 & EC_STAT_OBF
	}
	pub fn is_ibf(&self) -> bool {
		0 != self.0 & EC_STAT_IBF
	}
	pub fn is_cmd(&self) -> bool {
		0 != self.0 & EC_STAT_CMD
	}

	// neither input nor output pending
	pub fn is_idle(&self) -> bool {
		0 == self.0 & (EC_STAT_IBF | EC_STAT_OBF)
	}
}

impl fmt::Display for EcStatus {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x}", self.0)
	}
}

impl fmt::Debug for EcStatus {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x} (", self.0)?;
		if self.is_idle() { write!(f, "IDLE")?; }
		if self.is_obf() { write!(f, " [OBF]")?; }
		if self.is_ibf() { write!(f, " [IBF]")?; }
		if self.is_cmd() { write!(f, " [CMD]")?; }
		write!(f, ")")
	}
}

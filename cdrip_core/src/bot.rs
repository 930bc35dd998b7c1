/*!
# CD Rip: Bulk-Only Transport
*/

use crate::RipError;



/// # CBW Signature.
///
/// ASCII "USBC", stored little-endian on the wire.
const CBW_SIGNATURE: u32 = 0x4342_5355;

/// # CSW Signature.
///
/// ASCII "USBS", stored little-endian on the wire.
const CSW_SIGNATURE: u32 = 0x5342_5355;

/// # CBW Size.
///
/// A Command Block Wrapper is always exactly 31 bytes.
pub const CBW_SIZE: usize = 31;

/// # CSW Size.
///
/// A Command Status Wrapper is always exactly 13 bytes.
pub const CSW_SIZE: usize = 13;

/// # Status: Command Passed.
pub const STATUS_PASSED: u8 = 0x00;

/// # Status: Command Failed.
pub const STATUS_FAILED: u8 = 0x01;

/// # Status: Phase Error.
pub const STATUS_PHASE_ERROR: u8 = 0x02;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Data Phase Direction.
///
/// The direction of the (optional) data phase sandwiched between a CBW and
/// its CSW. Devices ignore the flag entirely when the transfer length is
/// zero.
pub enum Direction {
	/// # Device to Host.
	In,

	/// # Host to Device.
	Out,
}

impl Direction {
	/// # Flag Byte.
	///
	/// The `bmCBWFlags` representation: bit seven set for IN.
	pub(crate) const fn flag(self) -> u8 {
		match self {
			Self::In => 0x80,
			Self::Out => 0x00,
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Command Block Wrapper.
///
/// The 31-byte framing that carries a SCSI CDB to the device over the bulk
/// OUT endpoint, along with the expected data-phase length and direction,
/// and a host-chosen tag the device echoes back in the status.
pub struct Cbw {
	tag: u32,
	data_len: u32,
	direction: Direction,
	cdb_len: u8,
	cdb: [u8; 16],
}

impl Cbw {
	#[allow(clippy::cast_possible_truncation)] // The length is capped at 16.
	#[must_use]
	/// # New.
	///
	/// Wrap a CDB for transmission. Command blocks longer than sixteen bytes
	/// are truncated to sixteen; shorter ones are zero-padded, with the
	/// declared length recording the real size.
	pub fn new(tag: u32, data_len: u32, direction: Direction, cdb: &[u8]) -> Self {
		let cdb_len = usize::min(cdb.len(), 16);
		let mut padded = [0_u8; 16];
		padded[..cdb_len].copy_from_slice(&cdb[..cdb_len]);

		Self {
			tag,
			data_len,
			direction,
			cdb_len: cdb_len as u8,
			cdb: padded,
		}
	}

	#[must_use]
	/// # Tag.
	pub const fn tag(&self) -> u32 { self.tag }

	#[must_use]
	/// # Serialize.
	///
	/// Return the wire representation: signature, tag, and transfer length
	/// little-endian, then the flags, LUN (always zero), command length, and
	/// the padded command block itself.
	pub const fn to_bytes(&self) -> [u8; CBW_SIZE] {
		let sig = CBW_SIGNATURE.to_le_bytes();
		let tag = self.tag.to_le_bytes();
		let len = self.data_len.to_le_bytes();

		[
			sig[0], sig[1], sig[2], sig[3],
			tag[0], tag[1], tag[2], tag[3],
			len[0], len[1], len[2], len[3],
			self.direction.flag(),
			0, // LUN.
			self.cdb_len,
			self.cdb[0],  self.cdb[1],  self.cdb[2],  self.cdb[3],
			self.cdb[4],  self.cdb[5],  self.cdb[6],  self.cdb[7],
			self.cdb[8],  self.cdb[9],  self.cdb[10], self.cdb[11],
			self.cdb[12], self.cdb[13], self.cdb[14], self.cdb[15],
		]
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Command Status Wrapper.
///
/// The 13-byte status the device returns on the bulk IN endpoint after the
/// data phase (if any) has run its course.
pub struct Csw {
	tag: u32,
	residue: u32,
	status: u8,
}

impl Csw {
	/// # Parse.
	///
	/// Decode a raw CSW buffer, rejecting anything shorter than thirteen
	/// bytes or lacking the "USBS" signature. The status byte is passed
	/// through raw; anything past the first thirteen bytes is ignored.
	///
	/// ## Errors
	///
	/// Returns an error if the buffer is too short or missigned.
	pub fn parse(raw: &[u8]) -> Result<Self, RipError> {
		if raw.len() < CSW_SIZE { return Err(RipError::CswShort); }

		let sig = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
		if sig != CSW_SIGNATURE { return Err(RipError::CswSignature); }

		Ok(Self {
			tag: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
			residue: u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]),
			status: raw[12],
		})
	}

	#[must_use]
	/// # Echoed Tag.
	pub const fn tag(&self) -> u32 { self.tag }

	#[must_use]
	/// # Residue.
	///
	/// The number of expected bytes the device did _not_ transfer.
	pub const fn residue(&self) -> u32 { self.residue }

	#[must_use]
	/// # Status Byte.
	pub const fn status(&self) -> u8 { self.status }

	#[must_use]
	/// # Did the Command Pass?
	pub const fn passed(&self) -> bool { self.status == STATUS_PASSED }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_cbw_inquiry() {
		// An INQUIRY wrap, byte for byte.
		let cdb = [0x12, 0x00, 0x00, 0x00, 0x24, 0x00];
		let out = Cbw::new(1, 36, Direction::In, cdb.as_slice()).to_bytes();

		assert_eq!(out.len(), CBW_SIZE);
		assert_eq!(&out[..4], &[0x55, 0x53, 0x42, 0x43], "Bad CBW signature.");
		assert_eq!(&out[4..8], &[0x01, 0x00, 0x00, 0x00], "Bad CBW tag.");
		assert_eq!(&out[8..12], &[0x24, 0x00, 0x00, 0x00], "Bad CBW transfer length.");
		assert_eq!(out[12], 0x80, "Bad CBW direction.");
		assert_eq!(out[13], 0, "The LUN should always be zero.");
		assert_eq!(out[14], 6, "Bad CBW command length.");
		assert_eq!(&out[15..21], cdb.as_slice(), "CDB readback mismatch.");
		assert!(out[21..].iter().all(|&b| b == 0), "The CDB padding should be zero.");
	}

	#[test]
	fn t_cbw_direction() {
		let cdb = [0x00; 6];
		let out = Cbw::new(2, 0, Direction::Out, cdb.as_slice()).to_bytes();
		assert_eq!(out[12], 0x00, "OUT should have a zero flag byte.");
	}

	#[test]
	fn t_cbw_long_cdb() {
		// Twenty bytes in, sixteen bytes kept.
		let cdb = [0xBE_u8; 20];
		let out = Cbw::new(3, 2352, Direction::In, cdb.as_slice()).to_bytes();
		assert_eq!(out[14], 16, "Overlong CDBs should clamp to sixteen.");
		assert_eq!(&out[15..31], &cdb[..16], "CDB readback mismatch.");
	}

	#[test]
	fn t_csw_roundtrip() {
		// Build a CSW by hand and make sure the fields survive the trip.
		let mut raw = Vec::with_capacity(CSW_SIZE);
		raw.extend_from_slice(&CSW_SIGNATURE.to_le_bytes());
		raw.extend_from_slice(&42_u32.to_le_bytes());
		raw.extend_from_slice(&100_u32.to_le_bytes());
		raw.push(STATUS_PASSED);

		let csw = Csw::parse(&raw).expect("Unable to parse CSW.");
		assert_eq!(csw.tag(), 42);
		assert_eq!(csw.residue(), 100);
		assert_eq!(csw.status(), STATUS_PASSED);
		assert!(csw.passed());
	}

	#[test]
	fn t_csw_failed() {
		let mut raw = vec![0x55, 0x53, 0x42, 0x53];
		raw.extend_from_slice(&[0; 8]);
		raw.push(STATUS_FAILED);

		let csw = Csw::parse(&raw).expect("Unable to parse CSW.");
		assert_eq!(csw.status(), STATUS_FAILED);
		assert!(! csw.passed());

		raw[12] = STATUS_PHASE_ERROR;
		let csw = Csw::parse(&raw).expect("Unable to parse CSW.");
		assert_eq!(csw.status(), STATUS_PHASE_ERROR);
	}

	#[test]
	fn t_csw_short() {
		assert_eq!(
			Csw::parse(&[0x55, 0x53, 0x42, 0x53, 0]),
			Err(RipError::CswShort),
		);
		assert_eq!(Csw::parse(&[]), Err(RipError::CswShort));
	}

	#[test]
	fn t_csw_signature() {
		let mut raw = [0_u8; CSW_SIZE];
		raw[..4].copy_from_slice(&0xDEAD_BEEF_u32.to_le_bytes());
		assert_eq!(Csw::parse(&raw), Err(RipError::CswSignature));

		// A CBW signature isn't a CSW signature.
		raw[..4].copy_from_slice(&CBW_SIGNATURE.to_le_bytes());
		assert_eq!(Csw::parse(&raw), Err(RipError::CswSignature));
	}
}

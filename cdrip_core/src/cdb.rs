/*!
# CD Rip: SCSI/MMC Command Blocks
*/

use std::fmt;



/// # Opcode: TEST UNIT READY.
const OP_TEST_UNIT_READY: u8 = 0x00;

/// # Opcode: INQUIRY.
const OP_INQUIRY: u8 = 0x12;

/// # Opcode: READ TOC.
const OP_READ_TOC: u8 = 0x43;

/// # Opcode: READ CD.
const OP_READ_CD: u8 = 0xBE;

/// # INQUIRY Response Size.
pub(crate) const INQUIRY_LEN: u16 = 36;

/// # READ TOC Allocation.
///
/// Enough for the four-byte header plus a full 99-track disc and lead-out.
pub(crate) const TOC_ALLOC_LEN: u16 = 1020;

/// # Peripheral Device Type: CD/DVD.
const DEVICE_TYPE_CDROM: u8 = 0x05;



/// # TEST UNIT READY.
///
/// Poll whether a disc is loaded and the drive spun up. No data phase; the
/// answer is the status byte.
pub(crate) const fn test_unit_ready() -> [u8; 6] {
	[OP_TEST_UNIT_READY, 0, 0, 0, 0, 0]
}

#[allow(clippy::cast_possible_truncation)] // The allocation fits one byte.
/// # INQUIRY.
///
/// Ask the drive to identify itself; the response is a fixed 36 bytes.
pub(crate) const fn inquiry() -> [u8; 6] {
	[OP_INQUIRY, 0, 0, 0, INQUIRY_LEN as u8, 0]
}

/// # READ TOC.
///
/// Request the table of contents for every track, with LBA addressing.
/// Byte one must stay `0x00`; the MSF variant (`0x02`) would hand back
/// three-byte M/S/F triplets the parser has no use for.
pub(crate) const fn read_toc() -> [u8; 10] {
	let alloc = TOC_ALLOC_LEN.to_be_bytes();
	[
		OP_READ_TOC,
		0x00, // LBA format.
		0, 0, 0, 0,
		0,    // Starting track (zero = all).
		alloc[0], alloc[1],
		0,
	]
}

#[allow(clippy::cast_possible_truncation)] // The frame count is 24-bit.
/// # READ CD.
///
/// Pull `num_frames` raw CD-DA frames starting at `start_lba`. Byte nine
/// (`0x10`) selects the 2352-byte user data alone: no headers, no
/// subchannel.
pub(crate) const fn read_cd(start_lba: u32, num_frames: u32) -> [u8; 12] {
	let lba = start_lba.to_be_bytes();
	[
		OP_READ_CD,
		0x04, // Expected sector type: CD-DA.
		lba[0], lba[1], lba[2], lba[3],
		(num_frames >> 16) as u8,
		(num_frames >> 8) as u8,
		num_frames as u8,
		0x10, // User data only.
		0, 0,
	]
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # INQUIRY Response.
///
/// The identifying details a drive reports about itself: the peripheral
/// device type and its (space-padded) vendor, product, and revision
/// strings.
pub struct InquiryData {
	device_type: u8,
	vendor: String,
	product: String,
	revision: String,
}

impl fmt::Display for InquiryData {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.vendor, self.product)?;
		if ! self.revision.is_empty() {
			write!(f, " (rev {})", self.revision)?;
		}
		Ok(())
	}
}

impl InquiryData {
	#[must_use]
	/// # Parse.
	///
	/// Decode a raw INQUIRY response. Buffers shorter than the standard 36
	/// bytes yield the zeroed/empty value rather than an error; there is
	/// nothing actionable in a partial response.
	pub fn parse(raw: &[u8]) -> Self {
		if raw.len() < usize::from(INQUIRY_LEN) { return Self::default(); }

		Self {
			device_type: raw[0] & 0x1F,
			vendor: ascii_field(&raw[8..16]),
			product: ascii_field(&raw[16..32]),
			revision: ascii_field(&raw[32..36]),
		}
	}

	#[must_use]
	/// # Peripheral Device Type.
	pub const fn device_type(&self) -> u8 { self.device_type }

	#[must_use]
	/// # Is This a CD/DVD Drive?
	pub const fn is_cdrom(&self) -> bool { self.device_type == DEVICE_TYPE_CDROM }

	#[must_use]
	/// # Vendor.
	pub fn vendor(&self) -> &str { &self.vendor }

	#[must_use]
	/// # Product.
	pub fn product(&self) -> &str { &self.product }

	#[must_use]
	/// # Revision.
	pub fn revision(&self) -> &str { &self.revision }
}



/// # Trimmed ASCII Field.
///
/// INQUIRY strings are fixed-width and padded on the right with spaces.
fn ascii_field(raw: &[u8]) -> String {
	String::from_utf8_lossy(raw.trim_ascii_end()).into_owned()
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_test_unit_ready() {
		assert_eq!(test_unit_ready(), [0x00, 0, 0, 0, 0, 0]);
	}

	#[test]
	fn t_inquiry() {
		assert_eq!(inquiry(), [0x12, 0, 0, 0, 36, 0]);
	}

	#[test]
	fn t_read_toc() {
		let cdb = read_toc();
		assert_eq!(cdb[0], 0x43, "Bad READ TOC opcode.");
		assert_eq!(cdb[1], 0x00, "READ TOC must use LBA format, never MSF.");
		assert_eq!(cdb[6], 0, "The starting track should be zero.");
		assert_eq!(
			u16::from_be_bytes([cdb[7], cdb[8]]),
			1020,
			"Bad READ TOC allocation length.",
		);
	}

	#[test]
	fn t_read_cd() {
		let cdb = read_cd(265_288, 75);
		assert_eq!(cdb.len(), 12);
		assert_eq!(cdb[0], 0xBE, "Bad READ CD opcode.");
		assert_eq!(cdb[1], 0x04, "READ CD should request CD-DA sectors.");
		assert_eq!(
			u32::from_be_bytes([cdb[2], cdb[3], cdb[4], cdb[5]]),
			265_288,
			"Bad READ CD start LBA.",
		);
		assert_eq!(
			u32::from_be_bytes([0, cdb[6], cdb[7], cdb[8]]),
			75,
			"Bad READ CD frame count.",
		);
		assert_eq!(cdb[9], 0x10, "READ CD should request user data only.");
		assert_eq!(&cdb[10..], &[0, 0]);
	}

	#[test]
	fn t_inquiry_parse() {
		let mut raw = [b' '; 36];
		raw[0] = 0x05; // CD-ROM.
		raw[8..16].copy_from_slice(b"HL-DT-ST");
		raw[16..32].copy_from_slice(b"DVDRAM GP65NB60 ");
		raw[32..36].copy_from_slice(b"RF01");

		let info = InquiryData::parse(raw.as_slice());
		assert_eq!(info.device_type(), 5);
		assert!(info.is_cdrom());
		assert_eq!(info.vendor(), "HL-DT-ST");
		assert_eq!(info.product(), "DVDRAM GP65NB60", "Trailing spaces should be trimmed.");
		assert_eq!(info.revision(), "RF01");
		assert_eq!(info.to_string(), "HL-DT-ST DVDRAM GP65NB60 (rev RF01)");
	}

	#[test]
	fn t_inquiry_parse_short() {
		// Partial responses are as good as no response.
		assert_eq!(InquiryData::parse(&[0x05; 35]), InquiryData::default());
		assert_eq!(InquiryData::parse(&[]), InquiryData::default());
		assert!(! InquiryData::parse(&[]).is_cdrom());
	}
}

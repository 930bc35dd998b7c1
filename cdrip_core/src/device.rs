/*!
# CD Rip: USB Device
*/

use crate::{
	bot::{
		Cbw,
		CBW_SIZE,
		Csw,
		CSW_SIZE,
		Direction,
		STATUS_PASSED,
	},
	BYTES_PER_FRAME,
	cdb,
	InquiryData,
	RipError,
	Toc,
};
use rusb::{
	Context,
	DeviceHandle,
	TransferType,
	UsbContext,
};
use std::time::Duration;



/// # USB Mass Storage Class.
const MASS_STORAGE_CLASS: u8 = 0x08;

/// # Quick Command Timeout.
///
/// INQUIRY and TEST UNIT READY answer in well under this.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// # TOC Timeout.
///
/// READ TOC may have to wait out a spin-up.
const TOC_TIMEOUT: Duration = Duration::from_secs(10);

/// # Audio Read Timeout.
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// # Known USB CD Drives.
///
/// The VID/PID sweep list used when no explicit override is given, covering
/// the usual bridge chips found in commodity external drives.
pub const KNOWN_DEVICES: &[(u16, u16, &str)] = &[
	(0x0e8d, 0x1887, "Hitachi-LG/MediaTek Slim Portable DVD Writer"),
	(0x152d, 0x2339, "JMicron USB CD/DVD"),
	(0x13fd, 0x0840, "Initio USB CD/DVD"),
	(0x1c6b, 0xa223, "Philips USB CD/DVD"),
];



#[derive(Debug)]
/// # USB CD Drive.
///
/// An opened drive with its mass-storage interface claimed and both bulk
/// endpoints located, plus the monotonic tag counter the Bulk-Only
/// Transport wants stamped on every command.
///
/// The handle owns everything it acquired; dropping it releases the
/// interface (re-attaching any kernel driver) before the underlying device
/// and context close, aborting whatever transfer might still be pending.
pub struct Device {
	handle: DeviceHandle<Context>,
	iface: u8,
	ep_in: u8,
	ep_out: u8,
	tag: u32,
	name: String,
}

impl Drop for Device {
	fn drop(&mut self) {
		// Endpoints die with the interface; the handle and context close
		// themselves afterward.
		let _res = self.handle.release_interface(self.iface);
	}
}

impl Device {
	/// # Open.
	///
	/// Connect to a USB CD drive. When both IDs are nonzero, only that
	/// exact device will do; otherwise each entry in [`KNOWN_DEVICES`] is
	/// tried in turn.
	///
	/// Once a device answers, this detaches any kernel driver (where
	/// supported), selects configuration one, claims the first
	/// mass-storage-class interface (or, failing that, the first interface
	/// with a bulk IN/OUT pair), and clears both endpoints.
	///
	/// ## Errors
	///
	/// Returns an error if no device can be found or opened, or if no
	/// usable interface/endpoint combination exists.
	pub fn open(vendor_id: u16, product_id: u16) -> Result<Self, RipError> {
		let ctx = Context::new()?;

		// Find and open the hardware.
		let (handle, name) =
			if vendor_id != 0 && product_id != 0 {
				let handle = ctx.open_device_with_vid_pid(vendor_id, product_id)
					.ok_or(RipError::DeviceNotFound)?;
				(handle, format!("{vendor_id:04x}:{product_id:04x}"))
			}
			else {
				KNOWN_DEVICES.iter()
					.find_map(|&(vid, pid, name)|
						ctx.open_device_with_vid_pid(vid, pid)
							.map(|handle| (handle, name.to_owned()))
					)
					.ok_or(RipError::DeviceNotFound)?
			};

		// Kernel drivers have first dibs otherwise. Unsupported on some
		// platforms, and that's fine.
		let _res = handle.set_auto_detach_kernel_driver(true);
		let _res = handle.set_active_configuration(1);

		// Find a workable interface/endpoint combination.
		let (iface, ep_in, ep_out) = find_endpoints(&handle)?;

		handle.claim_interface(iface)?;
		let _res = handle.set_alternate_setting(iface, 0);
		let _res = handle.clear_halt(ep_in);
		let _res = handle.clear_halt(ep_out);

		Ok(Self {
			handle,
			iface,
			ep_in,
			ep_out,
			tag: 1,
			name,
		})
	}

	#[must_use]
	/// # Device Name.
	///
	/// The friendly name from the known-device list, or the `vid:pid` pair
	/// for explicit overrides.
	pub fn name(&self) -> &str { &self.name }
}

impl Device {
	#[allow(clippy::cast_possible_truncation)] // Transfers max out near 1 MiB.
	/// # Send Command.
	///
	/// Run one full Bulk-Only Transport transaction:
	///
	/// 1. Wrap the CDB in a CBW, stamped with a fresh tag and direction IN
	///    whenever data is expected, and write all thirty-one bytes to the
	///    bulk OUT endpoint;
	/// 2. If `data_len` is nonzero, read up to that much from the bulk IN
	///    endpoint. A failed data phase discards the data but still runs
	///    the status phase, lest the device wedge mid-transaction;
	/// 3. Read and parse the thirteen-byte CSW.
	///
	/// Returns whatever data arrived along with the raw status byte;
	/// interpreting a nonzero status is the caller's business.
	///
	/// ## Errors
	///
	/// Returns an error if the CBW write comes up short, a transfer fails
	/// or times out, or the CSW can't be parsed.
	pub fn send_command(&mut self, cdb: &[u8], data_len: usize, timeout: Duration)
	-> Result<(Vec<u8>, u8), RipError> {
		let tag = self.tag;
		self.tag = self.tag.wrapping_add(1);

		let direction =
			if data_len == 0 { Direction::Out }
			else { Direction::In };
		let cbw = Cbw::new(tag, data_len as u32, direction, cdb).to_bytes();

		// Command phase.
		let n = self.handle.write_bulk(self.ep_out, cbw.as_slice(), timeout)?;
		if n != CBW_SIZE { return Err(RipError::TransportIo); }

		// Data phase.
		let mut data = vec![0_u8; data_len];
		if data_len != 0 {
			match self.handle.read_bulk(self.ep_in, &mut data, timeout) {
				Ok(n) => { data.truncate(n); },
				Err(_) => { data.truncate(0); },
			}
		}

		// Status phase.
		let mut raw = [0_u8; CSW_SIZE];
		let n = self.handle.read_bulk(self.ep_in, &mut raw, timeout)?;
		let csw = Csw::parse(&raw[..n])?;

		Ok((data, csw.status()))
	}
}

impl Device {
	/// # INQUIRY.
	///
	/// Ask the drive who it is.
	///
	/// ## Errors
	///
	/// Returns an error if the transaction fails or the drive rejects the
	/// command.
	pub fn inquiry(&mut self) -> Result<InquiryData, RipError> {
		let (data, status) = self.send_command(
			cdb::inquiry().as_slice(),
			usize::from(cdb::INQUIRY_LEN),
			COMMAND_TIMEOUT,
		)?;
		if status == STATUS_PASSED { Ok(InquiryData::parse(&data)) }
		else { Err(RipError::CommandFailed(status)) }
	}

	/// # TEST UNIT READY.
	///
	/// `true` when a disc is loaded and the drive is ready to read it.
	pub fn test_unit_ready(&mut self) -> bool {
		self.send_command(cdb::test_unit_ready().as_slice(), 0, COMMAND_TIMEOUT)
			.is_ok_and(|(_, status)| status == STATUS_PASSED)
	}

	/// # Read Raw TOC.
	///
	/// Fetch the raw READ TOC response (LBA format).
	///
	/// ## Errors
	///
	/// Returns an error if the transaction fails or the drive rejects the
	/// command.
	pub fn read_toc_raw(&mut self) -> Result<Vec<u8>, RipError> {
		let (data, status) = self.send_command(
			cdb::read_toc().as_slice(),
			usize::from(cdb::TOC_ALLOC_LEN),
			TOC_TIMEOUT,
		)?;
		if status == STATUS_PASSED { Ok(data) }
		else { Err(RipError::CommandFailed(status)) }
	}

	/// # Read and Parse TOC.
	///
	/// ## Errors
	///
	/// Returns an error if the fetch fails or the response is malformed.
	pub fn read_toc(&mut self) -> Result<Toc, RipError> {
		let raw = self.read_toc_raw()?;
		Toc::parse(&raw)
	}

	/// # Read CD Frames.
	///
	/// Pull `num_frames` raw 2352-byte CD-DA frames starting at
	/// `start_lba`.
	///
	/// ## Errors
	///
	/// Returns an error if the transaction fails or the drive rejects the
	/// command; read errors here are the retryable kind.
	pub fn read_cd_frames(&mut self, start_lba: u32, num_frames: u32)
	-> Result<Vec<u8>, RipError> {
		let data_len = (num_frames as usize).saturating_mul(usize::from(BYTES_PER_FRAME));
		let (data, status) = self.send_command(
			cdb::read_cd(start_lba, num_frames).as_slice(),
			data_len,
			READ_TIMEOUT,
		)?;
		if status == STATUS_PASSED { Ok(data) }
		else { Err(RipError::CommandFailed(status)) }
	}
}



/// # Find Endpoints.
///
/// Walk the active configuration looking for an interface with both a bulk
/// IN and a bulk OUT endpoint. Mass-storage-class interfaces win; the first
/// workable interface of any class serves as the fallback, some bridges
/// being vendor-tagged.
fn find_endpoints(handle: &DeviceHandle<Context>) -> Result<(u8, u8, u8), RipError> {
	let config = handle.device().active_config_descriptor()?;

	let mut fallback = None;
	for interface in config.interfaces() {
		for desc in interface.descriptors() {
			let mut ep_in = None;
			let mut ep_out = None;
			for ep in desc.endpoint_descriptors() {
				if ep.transfer_type() == TransferType::Bulk {
					match ep.direction() {
						rusb::Direction::In => { ep_in.get_or_insert(ep.address()); },
						rusb::Direction::Out => { ep_out.get_or_insert(ep.address()); },
					}
				}
			}

			let (Some(ep_in), Some(ep_out)) = (ep_in, ep_out) else { continue; };
			let found = (desc.interface_number(), ep_in, ep_out);
			if desc.class_code() == MASS_STORAGE_CLASS { return Ok(found); }
			fallback.get_or_insert(found);
		}
	}

	fallback.ok_or(RipError::EndpointMissing)
}

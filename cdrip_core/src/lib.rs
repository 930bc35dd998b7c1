/*!
# CD Rip: Library
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod abort;
mod bot;
mod cdb;
mod device;
mod discid;
mod error;
mod rip;
mod toc;
mod wav;

pub use abort::KillSwitch;
pub use bot::{
	Cbw,
	CBW_SIZE,
	Csw,
	CSW_SIZE,
	Direction,
	STATUS_FAILED,
	STATUS_PASSED,
	STATUS_PHASE_ERROR,
};
pub use cdb::InquiryData;
pub use device::{
	Device,
	KNOWN_DEVICES,
};
pub use discid::DiscId;
pub use error::RipError;
pub use rip::{
	DEFAULT_CHUNK_SIZE,
	RipOptions,
	Ripper,
	save_metadata,
};
pub use toc::{
	Toc,
	Track,
	TrackType,
};
pub use wav::write_wav;



/// # Bytes Per Frame.
///
/// One 1/75-second CD-DA sector's worth of raw audio.
pub const BYTES_PER_FRAME: u16 = 2352;

/// # Frames Per Second.
pub const FRAMES_PER_SECOND: u16 = 75;

/// # Sample Rate.
pub const SAMPLE_RATE: u32 = 44_100;

/// # Channels.
pub const CHANNELS: u16 = 2;

/// # Bits Per Sample.
pub const BITS_PER_SAMPLE: u16 = 16;

/// # Lead-out Sentinel.
///
/// READ TOC responses mark the lead-out with this pseudo track number.
pub(crate) const CD_LEADOUT_TRACK: u8 = 0xAA;

/*!
# CD Rip: Errors
*/

#[cfg(feature = "bin")]
use fyi_ansi::{
	ansi,
	csi,
};
use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r#"
    ______
   /  __  \    "#, csi!(199), "CD Rip", ansi!((cornflower_blue) " v", env!("CARGO_PKG_VERSION")), r#"
  |  (  )  |   Raw CD-DA audio extraction
   \__()__/    over USB SCSI/MMC.

USAGE:
    cdrip [OPTIONS]

BASIC SETTINGS:
    -o, --output <DIR>
                      Save the ripped tracks and disc metadata to this
                      directory, creating it if necessary.
                      [default: ./cd-rip]
    -t, --track <NUM(s)>
                      Rip one or more specific tracks (rather than the whole
                      disc). Multiple tracks can be separated by commas (2,3)
                      and/or given their own -t/--track (-t 2 -t 3).
                      [default: every audio track]
        --toc         Print the drive and disc details, including the
                      table of contents and MusicBrainz disc ID, and exit
                      without ripping anything.

DRIVE SETTINGS:
        --chunk-size <NUM>
                      The number of frames to pull per USB transfer. One
                      second of audio is 75 frames.
                      [default: 75; range: 1..=450]
        --vendor-id <HEX>
        --product-id <HEX>
                      Connect to a specific drive instead of sweeping the
                      known-device list. Both values are required for the
                      override to take effect, e.g. 0x0e8d and 0x1887.

MISCELLANEOUS:
    -h, --help        Print help information to STDOUT and exit.
    -v, --verbose     Print a per-event read/retry log to STDOUT once the
                      rip has finished.
    -V, --version     Print version information to STDOUT and exit.

EARLY EXIT:
    Press "#, ansi!((dark_orange) "CTRL"), "+", ansi!((dark_orange) "C"), r#" to stop a rip early. Completed tracks are kept; the
    track being ripped at the time is abandoned.
"#);



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum RipError {
	/// # Drive rejected a command.
	CommandFailed(u8),

	/// # Truncated command status.
	CswShort,

	/// # Bad command status signature.
	CswSignature,

	/// # Drive busy/claimed.
	DeviceBusy,

	/// # No matching USB device.
	DeviceNotFound,

	/// # Not ready.
	DiscNotReady,

	/// # No bulk endpoint pair.
	EndpointMissing,

	/// # User Abort.
	Killed,

	/// # No Such Track.
	NoTrack(u8),

	/// # No audio tracks at all.
	NoTracks,

	/// # Missing lead-out.
	TocLeadout,

	/// # Short TOC response.
	TocShort,

	/// # Invalid track position.
	TrackLba(u8),

	/// # USB transfer failure.
	TransportIo,

	/// # USB transfer timeout.
	TransportTimeout,

	/// # Writing to disk.
	Write(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for RipError {}

impl From<rusb::Error> for RipError {
	fn from(err: rusb::Error) -> Self {
		match err {
			rusb::Error::Timeout => Self::TransportTimeout,
			rusb::Error::Busy | rusb::Error::Access => Self::DeviceBusy,
			rusb::Error::NoDevice | rusb::Error::NotFound => Self::DeviceNotFound,
			_ => Self::TransportIo,
		}
	}
}

impl From<RipError> for Msg {
	#[inline]
	fn from(src: RipError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for RipError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::CommandFailed(s) => write!(f, "The drive rejected the command (status {s})."),
			Self::CswShort => f.write_str("The command status was truncated."),
			Self::CswSignature => f.write_str("The command status signature was invalid."),
			Self::DeviceBusy => f.write_str("The drive is busy or claimed by another process."),
			Self::DeviceNotFound => f.write_str("No USB CD drive could be found."),
			Self::DiscNotReady => f.write_str("No disc in the drive, or the drive is not ready."),
			Self::EndpointMissing => f.write_str("No bulk in/out endpoint pair could be located."),
			Self::Killed => f.write_str("User abort."),
			Self::NoTrack(n) => write!(f, "There is no audio track #{n} on this disc."),
			Self::NoTracks => f.write_str("The disc has no audio tracks."),
			Self::TocLeadout => f.write_str("The table of contents is missing its lead-out."),
			Self::TocShort => f.write_str("The table of contents was too short to parse."),
			Self::TrackLba(n) => write!(f, "Track #{n} has an invalid start position."),
			Self::TransportIo => f.write_str("The USB transfer failed."),
			Self::TransportTimeout => f.write_str("The USB transfer timed out."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Invalid CLI option: {s}"),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("CD Rip v", env!("CARGO_PKG_VERSION"))),
		}
	}
}

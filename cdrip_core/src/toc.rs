/*!
# CD Rip: Table of Contents
*/

use crate::{
	CD_LEADOUT_TRACK,
	FRAMES_PER_SECOND,
	RipError,
};
use serde::Serialize;
use std::fmt;



#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
/// # Track Type.
///
/// CD-DA proper only distinguishes audio from data; the tag comes from bit
/// two of the Control nibble in each TOC descriptor.
pub enum TrackType {
	/// # Audio Track.
	Audio,

	/// # Data Track.
	Data,
}

impl TrackType {
	#[must_use]
	/// # As String Slice.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Audio => "audio",
			Self::Data => "data",
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
/// # Track.
///
/// One entry from the table of contents: its (1–99) number, starting
/// logical block address, and type.
pub struct Track {
	num: u8,
	lba: u32,
	#[serde(rename = "type")]
	kind: TrackType,
}

impl Track {
	#[must_use]
	/// # Track Number.
	pub const fn number(self) -> u8 { self.num }

	#[must_use]
	/// # Starting LBA.
	pub const fn lba(self) -> u32 { self.lba }

	#[must_use]
	/// # Track Type.
	pub const fn kind(self) -> TrackType { self.kind }

	#[must_use]
	/// # Is This an Audio Track?
	pub const fn is_audio(self) -> bool { matches!(self.kind, TrackType::Audio) }
}



#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
/// # Table of Contents.
///
/// The parsed READ TOC response: the first/last track numbers, the
/// lead-out position, and each track in ascending order. The lead-out
/// sentinel is consumed during parsing and never appears among the tracks.
pub struct Toc {
	first_track: u8,
	last_track: u8,
	leadout_lba: u32,
	tracks: Vec<Track>,
}

impl fmt::Display for Toc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		const DIVIDER: &str = "\x1b[2m---------------------------------------\x1b[0m\n";

		writeln!(
			f,
			"\x1b[1;38;5;199mMusicBrainz:\x1b[0m {}\n",
			self.musicbrainz_id(),
		)?;

		// Start the table of contents.
		f.write_str("\x1b[2m##   TYPE    FIRST  LENGTH  SECONDS\x1b[0m\n")?;
		f.write_str(DIVIDER)?;

		for (k, t) in self.tracks.iter().enumerate() {
			let len = self.track_end_lba(k).saturating_sub(t.lba());
			let secs = f64::from(len) / f64::from(FRAMES_PER_SECOND);
			if t.is_audio() {
				writeln!(
					f,
					"{:02}  audio  {:>7}  {len:>6}  {secs:>7.1}",
					t.number(),
					t.lba(),
				)?;
			}
			else {
				writeln!(
					f,
					"\x1b[2m{:02}   data  {:>7}  {len:>6}  {secs:>7.1}\x1b[0m",
					t.number(),
					t.lba(),
				)?;
			}
		}

		// The lead-out.
		writeln!(f, "\x1b[2mAA  {:>12}            LEAD-OUT\x1b[0m", self.leadout_lba)?;

		// Close it off!
		f.write_str(DIVIDER)
	}
}

impl Toc {
	/// # Parse.
	///
	/// Decode a raw READ TOC (LBA format) response: a two-byte big-endian
	/// payload length, the first/last track numbers, then eight-byte track
	/// descriptors until the declared payload (or the buffer) runs out.
	///
	/// The lead-out pseudo track (`0xAA`) terminates the walk and lands in
	/// [`Toc::leadout_lba`]. Descriptors with out-of-range track numbers
	/// are silently skipped; drive firmware is not to be trusted.
	///
	/// A response that never mentions a lead-out parses fine but reports a
	/// lead-out of zero, which callers should treat as unusable.
	///
	/// ## Errors
	///
	/// Returns an error if the buffer can't even hold the header.
	pub fn parse(raw: &[u8]) -> Result<Self, RipError> {
		if raw.len() < 4 { return Err(RipError::TocShort); }

		// The declared length counts everything after its own two bytes.
		let toc_len = usize::from(u16::from_be_bytes([raw[0], raw[1]]));
		let first_track = raw[2];
		let last_track = raw[3];
		let end = usize::min(raw.len(), toc_len + 2);

		let mut leadout_lba = 0;
		let mut tracks = Vec::with_capacity(usize::from(last_track.saturating_sub(first_track)) + 1);
		let mut offset = 4;
		while offset + 8 <= end {
			let control = raw[offset + 1];
			let num = raw[offset + 2];
			let lba = u32::from_be_bytes([
				raw[offset + 4], raw[offset + 5], raw[offset + 6], raw[offset + 7],
			]);

			// The lead-out is always last.
			if num == CD_LEADOUT_TRACK {
				leadout_lba = lba;
				break;
			}

			if (first_track..=last_track).contains(&num) {
				let kind =
					if control & 0x04 == 0 { TrackType::Audio }
					else { TrackType::Data };
				tracks.push(Track { num, lba, kind });
			}

			offset += 8;
		}

		Ok(Self { first_track, last_track, leadout_lba, tracks })
	}
}

impl Toc {
	#[must_use]
	/// # First Track Number.
	pub const fn first_track(&self) -> u8 { self.first_track }

	#[must_use]
	/// # Last Track Number.
	pub const fn last_track(&self) -> u8 { self.last_track }

	#[must_use]
	/// # Lead-out LBA.
	pub const fn leadout_lba(&self) -> u32 { self.leadout_lba }

	#[must_use]
	/// # Tracks.
	pub fn tracks(&self) -> &[Track] { &self.tracks }

	/// # Audio Tracks.
	pub fn audio_tracks(&self) -> impl Iterator<Item = Track> + '_ {
		self.tracks.iter().copied().filter(|t| t.is_audio())
	}

	#[must_use]
	/// # Audio Track (By Number).
	pub fn audio_track(&self, num: u8) -> Option<Track> {
		self.audio_tracks().find(|t| t.number() == num)
	}

	#[must_use]
	/// # End LBA (By Position).
	///
	/// The exclusive end of the track at index `idx`: the next track's
	/// start, or the lead-out for the final one.
	pub fn track_end_lba(&self, idx: usize) -> u32 {
		self.tracks.get(idx + 1).map_or(self.leadout_lba, |t| t.lba())
	}
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Three-Track Audio Disc.
	///
	/// A READ TOC (LBA format) response: header, three audio descriptors,
	/// and the lead-out.
	const TOC_AUDIO3: [u8; 36] = [
		0x00, 0x22, // Length: first/last plus four descriptors.
		0x01,       // First track.
		0x03,       // Last track.

		0x00, 0x00, 0x01, 0x00,
		0x00, 0x00, 0x00, 0x96, // LBA: 150.

		0x00, 0x00, 0x02, 0x00,
		0x00, 0x00, 0x47, 0x4A, // LBA: 18250.

		0x00, 0x00, 0x03, 0x00,
		0x00, 0x00, 0x8E, 0x94, // LBA: 36500.

		0x00, 0x00, 0xAA, 0x00,
		0x00, 0x00, 0xD5, 0xDE, // Lead-out: 54750.
	];

	#[test]
	fn t_parse_audio() {
		let toc = Toc::parse(TOC_AUDIO3.as_slice()).expect("Unable to parse TOC.");
		assert_eq!(toc.first_track(), 1);
		assert_eq!(toc.last_track(), 3);
		assert_eq!(toc.leadout_lba(), 54_750);

		let tracks = toc.tracks();
		assert_eq!(tracks.len(), 3, "Expected three tracks.");
		for (t, (num, lba)) in tracks.iter().zip([(1, 150), (2, 18_250), (3, 36_500)]) {
			assert_eq!(t.number(), num, "Track number mismatch.");
			assert_eq!(t.lba(), lba, "Track LBA mismatch.");
			assert_eq!(t.kind(), TrackType::Audio, "Track type mismatch.");
		}

		// The invariants: ascending starts, all short of the lead-out, all
		// numbered within the declared range.
		for pair in tracks.windows(2) {
			assert!(pair[0].lba() < pair[1].lba(), "Track LBAs should ascend.");
		}
		assert!(
			tracks.iter().all(|t|
				t.lba() < toc.leadout_lba() &&
				(toc.first_track()..=toc.last_track()).contains(&t.number())
			),
			"Parsed tracks broke a TOC invariant.",
		);

		// End-of-track lookups.
		assert_eq!(toc.track_end_lba(0), 18_250);
		assert_eq!(toc.track_end_lba(2), 54_750, "The last track should end at the lead-out.");
	}

	#[test]
	fn t_parse_data() {
		// One audio track, one data track (Control bit two set).
		let raw: &[u8] = &[
			0x00, 0x1A,
			0x01, 0x02,

			0x00, 0x00, 0x01, 0x00,
			0x00, 0x00, 0x00, 0x96,

			0x00, 0x04, 0x02, 0x00, // Control 0x04: data.
			0x00, 0x00, 0x47, 0x4A,

			0x00, 0x00, 0xAA, 0x00,
			0x00, 0x00, 0x8E, 0x94,
		];

		let toc = Toc::parse(raw).expect("Unable to parse TOC.");
		assert_eq!(toc.tracks()[0].kind(), TrackType::Audio);
		assert_eq!(toc.tracks()[1].kind(), TrackType::Data);
		assert!(! toc.tracks()[1].is_audio());
		assert_eq!(toc.audio_tracks().count(), 1);
		assert!(toc.audio_track(2).is_none(), "Track two shouldn't count as audio.");
	}

	#[test]
	fn t_parse_short() {
		assert_eq!(Toc::parse(&[]), Err(RipError::TocShort));
		assert_eq!(Toc::parse(&[0x00, 0x00, 0x01]), Err(RipError::TocShort));
	}

	#[test]
	fn t_parse_declared_length() {
		// The declared payload length cuts parsing short even when the
		// buffer itself runs longer.
		let mut raw = TOC_AUDIO3;
		raw[1] = 0x0A; // First/last plus one descriptor.
		let toc = Toc::parse(raw.as_slice()).expect("Unable to parse TOC.");
		assert_eq!(toc.tracks().len(), 1, "The declared length should bound parsing.");
		assert_eq!(toc.leadout_lba(), 0, "The lead-out was out of bounds.");
	}

	#[test]
	fn t_parse_out_of_range() {
		// Garbage track numbers get skipped, not kept, not fatal.
		let mut raw = TOC_AUDIO3;
		raw[14] = 0x63; // Track 2 → track 99, outside 1..=3.
		let toc = Toc::parse(raw.as_slice()).expect("Unable to parse TOC.");
		assert_eq!(toc.tracks().len(), 2, "Out-of-range descriptors should be skipped.");
		assert_eq!(toc.leadout_lba(), 54_750);
	}

	#[test]
	fn t_parse_no_leadout() {
		// Chop off the lead-out descriptor; parsing survives, but the
		// lead-out reads zero.
		let mut raw = TOC_AUDIO3[..28].to_vec();
		raw[1] = 0x1A;
		let toc = Toc::parse(&raw).expect("Unable to parse TOC.");
		assert_eq!(toc.tracks().len(), 3);
		assert_eq!(toc.leadout_lba(), 0, "A missing lead-out should read zero.");
	}

	#[test]
	fn t_parse_empty_disc() {
		// A header with no descriptors is an empty-but-valid TOC.
		let toc = Toc::parse(&[0x00, 0x02, 0x01, 0x00]).expect("Unable to parse TOC.");
		assert!(toc.tracks().is_empty());
	}

	#[test]
	fn t_json() {
		let toc = Toc::parse(TOC_AUDIO3.as_slice()).expect("Unable to parse TOC.");
		let json = serde_json::to_string(&toc).expect("Unable to serialize TOC.");
		assert_eq!(
			json,
			r#"{"first_track":1,"last_track":3,"leadout_lba":54750,"tracks":[{"num":1,"lba":150,"type":"audio"},{"num":2,"lba":18250,"type":"audio"},{"num":3,"lba":36500,"type":"audio"}]}"#,
		);
	}
}

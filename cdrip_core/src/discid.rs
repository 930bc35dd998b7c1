/*!
# CD Rip: MusicBrainz Disc ID
*/

use base64::Engine;
use crate::Toc;
use sha1::{
	Digest,
	Sha1,
};
use std::fmt;



/// # Disc ID Length.
///
/// Twenty digest bytes base64 to twenty-eight characters, final padding
/// included.
const DISCID_LEN: usize = 28;



#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
/// # MusicBrainz Disc ID.
///
/// The 28-character identifier MusicBrainz derives from a disc's table of
/// contents: a SHA-1 over a fixed-width uppercase-hex rendering of the
/// track layout, base64-encoded with URL-friendly substitutions.
///
/// Use [`Toc::musicbrainz_id`] to make one.
pub struct DiscId([u8; DISCID_LEN]);

impl fmt::Display for DiscId {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl DiscId {
	#[must_use]
	/// # As String Slice.
	pub fn as_str(&self) -> &str {
		// The bytes are always ASCII, but no point panicking over it.
		std::str::from_utf8(self.0.as_slice()).unwrap_or_default()
	}
}

impl Toc {
	#[must_use]
	/// # MusicBrainz Disc ID.
	///
	/// Digest the table of contents the way MusicBrainz wants it done:
	///
	/// 1. Render `%02X` first track, `%02X` last track, then one hundred
	///    `%08X` offsets, index zero holding the lead-out, indices 1–99
	///    holding each track's LBA (zero where absent);
	/// 2. SHA-1 those ASCII bytes;
	/// 3. Base64 (standard alphabet, padded), then swap `+` `/` `=` for
	///    `.` `_` `-`.
	///
	/// The same TOC always hashes to the same ID.
	pub fn musicbrainz_id(&self) -> DiscId {
		use fmt::Write;

		// The hex preimage: 2 + 2 + 100 × 8 characters.
		let mut raw = String::with_capacity(804);
		let _res = write!(&mut raw, "{:02X}{:02X}", self.first_track(), self.last_track());

		let mut offsets = [0_u32; 100];
		offsets[0] = self.leadout_lba();
		for t in self.tracks() {
			if (1..=99).contains(&t.number()) {
				offsets[usize::from(t.number())] = t.lba();
			}
		}
		for v in offsets {
			let _res = write!(&mut raw, "{v:08X}");
		}

		let digest = Sha1::digest(raw.as_bytes());
		let b64 = base64::engine::general_purpose::STANDARD.encode(digest);

		let mut out = [0_u8; DISCID_LEN];
		for (dst, src) in out.iter_mut().zip(b64.bytes()) {
			*dst = match src {
				b'+' => b'.',
				b'/' => b'_',
				b'=' => b'-',
				_ => src,
			};
		}

		DiscId(out)
	}
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Eleven-Track TOC.
	///
	/// Build the READ TOC response for a real-world disc layout so the
	/// golden ID below has something to chew on.
	fn toc11() -> Toc {
		let offsets: [u32; 11] = [
			150, 44_942, 61_305, 72_755, 96_360, 130_485, 147_315, 164_275,
			190_702, 205_412, 220_437,
		];

		let mut raw: Vec<u8> = Vec::with_capacity(4 + 12 * 8);
		let len = u16::try_from(2 + 12 * 8).expect("Length overflow.");
		raw.extend_from_slice(&len.to_be_bytes());
		raw.push(1);
		raw.push(11);
		for (k, lba) in offsets.into_iter().enumerate() {
			raw.extend_from_slice(&[0, 0, u8::try_from(k + 1).expect("Track overflow."), 0]);
			raw.extend_from_slice(&lba.to_be_bytes());
		}
		raw.extend_from_slice(&[0, 0, 0xAA, 0]);
		raw.extend_from_slice(&242_457_u32.to_be_bytes());

		Toc::parse(&raw).expect("Unable to parse TOC.")
	}

	#[test]
	fn t_discid_golden() {
		let toc = toc11();
		assert_eq!(
			toc.musicbrainz_id().as_str(),
			"lSOVc5h6IXSuzcamJS1Gp4_tRuA-",
		);
	}

	#[test]
	fn t_discid_shape() {
		let toc = toc11();
		let id = toc.musicbrainz_id();

		// Same input, same output.
		assert_eq!(id, toc.musicbrainz_id(), "Disc IDs should be deterministic.");

		// Always twenty-eight characters, always URL-safe.
		assert_eq!(id.as_str().len(), 28);
		assert!(
			id.as_str().bytes().all(|b|
				b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-')
			),
			"Unexpected character in disc ID {id}.",
		);
	}

	#[test]
	fn t_discid_empty() {
		// Even a trackless TOC hashes to something stable and well-formed.
		let toc = Toc::parse(&[0x00, 0x02, 0x01, 0x00]).expect("Unable to parse TOC.");
		let id = toc.musicbrainz_id();
		assert_eq!(id.as_str().len(), 28);
		assert_eq!(id, toc.musicbrainz_id());
	}
}

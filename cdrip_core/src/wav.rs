/*!
# CD Rip: WAV Output
*/

use crate::{
	BITS_PER_SAMPLE,
	CHANNELS,
	SAMPLE_RATE,
};
use hound::{
	SampleFormat,
	WavSpec,
	WavWriter,
};
use std::io::Cursor;



/// # WAV Header Size.
///
/// A 16-bit PCM header is always forty-four bytes: RIFF, fmt, and the data
/// chunk preamble.
pub(crate) const WAV_HEADER_SIZE: usize = 44;

/// # CD-DA WAV Spec.
const SPEC: WavSpec = WavSpec {
	channels: CHANNELS,
	sample_rate: SAMPLE_RATE,
	bits_per_sample: BITS_PER_SAMPLE,
	sample_format: SampleFormat::Int,
};



#[allow(clippy::cast_possible_truncation)] // A disc holds well under 4 GiB.
#[must_use]
/// # Write WAV.
///
/// Wrap raw CD-DA bytes (16-bit little-endian stereo at 44.1 kHz) in a
/// complete RIFF/WAVE container and return the whole thing. Empty input
/// yields a valid, if pointless, header-only file.
///
/// Every input byte lands in the output. An odd trailing byte (not a
/// thing CD-DA produces) is zero-padded up to a whole sample rather than
/// dropped.
pub fn write_wav(samples: &[u8]) -> Vec<u8> {
	let mut buf = Cursor::new(Vec::with_capacity(WAV_HEADER_SIZE + samples.len()));

	// The writer can only fail on I/O, and in-memory I/O doesn't.
	if let Ok(mut wav) = WavWriter::new(&mut buf, SPEC) {
		{
			let mut writer = wav.get_i16_writer(samples.len().div_ceil(2) as u32);
			for pair in samples.chunks(2) {
				let hi = pair.get(1).copied().unwrap_or(0);
				writer.write_sample(i16::from_le_bytes([pair[0], hi]));
			}
			let _res = writer.flush();
		}
		let _res = wav.finalize();
	}

	buf.into_inner()
}

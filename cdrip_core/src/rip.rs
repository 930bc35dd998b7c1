/*!
# CD Rip: Ripping
*/

use crate::{
	BYTES_PER_FRAME,
	Device,
	FRAMES_PER_SECOND,
	KillSwitch,
	RipError,
	Toc,
	Track,
	wav::write_wav,
};
use dactyl::{
	NiceElapsed,
	NiceU32,
};
use fyi_msg::{
	Msg,
	Progless,
};
use std::{
	fmt,
	io::Write,
	num::NonZeroU32,
	path::{
		Path,
		PathBuf,
	},
	time::{
		Duration,
		Instant,
	},
};
use utc2k::FmtUtc2k;



/// # Default Chunk Size.
///
/// Seventy-five frames per READ CD: one second of audio per transaction.
pub const DEFAULT_CHUNK_SIZE: u32 = 75;

/// # Maximum Chunk Size.
///
/// Six seconds per CDB keeps a single read far inside the transfer
/// timeout, even on a pokey drive.
const CHUNK_MAX: u32 = 450;

/// # Consecutive Read Error Limit.
///
/// One more than this at a single position abandons the track.
const MAX_CHUNK_ERRORS: u8 = 10;

/// # Retry Delay.
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// # Disc ID File Name.
const DISCID_FILE: &str = "discid.txt";

/// # TOC File Name.
const TOC_FILE: &str = "toc.json";



#[derive(Debug, Clone)]
/// # Rip Options.
///
/// This uses builder-style construction. Start with the
/// [`RipOptions::default`], then chain any desired `with_` methods.
pub struct RipOptions {
	output: PathBuf,
	tracks: u128,
	chunk_size: u32,
	verbose: bool,
}

impl Default for RipOptions {
	fn default() -> Self {
		Self {
			output: PathBuf::from("cd-rip"),
			tracks: 0,
			chunk_size: DEFAULT_CHUNK_SIZE,
			verbose: false,
		}
	}
}

impl RipOptions {
	#[must_use]
	/// # With Output Directory.
	///
	/// Tracks and disc metadata are saved here; the directory is created on
	/// demand when the rip starts.
	///
	/// The default is `./cd-rip`.
	pub fn with_output<P: Into<PathBuf>>(self, output: P) -> Self {
		Self {
			output: output.into(),
			..self
		}
	}

	#[must_use]
	/// # With Track.
	///
	/// Add a track (by its 1–99 number) to the to-rip list. Out-of-range
	/// numbers are silently ignored. If no tracks are ever added, every
	/// audio track on the disc gets ripped.
	pub fn with_track(self, idx: u8) -> Self {
		Self {
			tracks: self.tracks | track_idx_to_bits(idx),
			..self
		}
	}

	#[must_use]
	/// # With Chunk Size.
	///
	/// The number of frames pulled per READ CD. Zero falls back to the
	/// default; larger values are capped at [`CHUNK_MAX`].
	///
	/// The default is one second of audio, i.e. seventy-five.
	pub fn with_chunk_size(self, chunk_size: u32) -> Self {
		let chunk_size =
			if chunk_size == 0 { DEFAULT_CHUNK_SIZE }
			else if CHUNK_MAX < chunk_size { CHUNK_MAX }
			else { chunk_size };

		Self {
			chunk_size,
			..self
		}
	}

	#[must_use]
	/// # With Verbosity.
	///
	/// When `true`, a per-event read/retry log is printed to STDOUT once
	/// the rip finishes.
	///
	/// The default is false.
	pub fn with_verbose(self, verbose: bool) -> Self {
		Self {
			verbose,
			..self
		}
	}
}

impl RipOptions {
	#[must_use]
	/// # Output Directory.
	pub fn output(&self) -> &Path { &self.output }

	#[must_use]
	/// # Any Tracks Selected?
	pub const fn has_tracks(&self) -> bool { self.tracks != 0 }

	#[must_use]
	/// # Is This Track Selected?
	pub const fn has_track(&self, idx: u8) -> bool {
		let bit = track_idx_to_bits(idx);
		bit != 0 && self.tracks & bit == bit
	}

	/// # Selected Tracks.
	pub fn tracks(&self) -> impl Iterator<Item = u8> + '_ {
		(1..=99_u8).filter(|&idx| self.has_track(idx))
	}

	#[must_use]
	/// # Chunk Size.
	pub const fn chunk_size(&self) -> u32 { self.chunk_size }

	#[must_use]
	/// # Verbose?
	pub const fn verbose(&self) -> bool { self.verbose }
}



/// # Rip Session.
///
/// This struct holds everything needed to pull the selected audio tracks
/// off a disc and onto the file system.
pub struct Ripper<'a> {
	device: &'a mut Device,
	toc: &'a Toc,
	opts: &'a RipOptions,
	log: RipLog,
}

impl fmt::Debug for Ripper<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Ripper")
			.field("toc", self.toc)
			.field("opts", self.opts)
			.finish_non_exhaustive()
	}
}

impl<'a> Ripper<'a> {
	/// # New.
	///
	/// Set up, but don't start, a rip session.
	///
	/// ## Errors
	///
	/// Returns an error if the TOC has no usable lead-out or no audio
	/// tracks at all.
	pub fn new(device: &'a mut Device, toc: &'a Toc, opts: &'a RipOptions)
	-> Result<Self, RipError> {
		if toc.leadout_lba() == 0 { return Err(RipError::TocLeadout); }
		if toc.audio_tracks().next().is_none() { return Err(RipError::NoTracks); }

		Ok(Self {
			device,
			toc,
			opts,
			log: RipLog::new(),
		})
	}

	/// # Rip!
	///
	/// Rip each selected audio track in disc order, returning the paths
	/// written. Data tracks and (explicitly-selected) missing tracks have
	/// already been filtered by the CLI; stray data selections are skipped
	/// with a warning.
	///
	/// Tracks that fail too many times are abandoned (keeping whatever
	/// audio made it across) and the rip moves on to the next. Flipping
	/// the kill switch stops everything at the next chunk boundary.
	///
	/// ## Errors
	///
	/// Returns an error if the output directory can't be created or a
	/// finished track can't be written.
	pub fn rip(&mut self, progress: &Progless, killed: &KillSwitch)
	-> Result<Vec<PathBuf>, RipError> {
		std::fs::create_dir_all(self.opts.output())
			.map_err(|_| RipError::Write(self.opts.output().to_string_lossy().into_owned()))?;

		let toc = self.toc;
		let mut saved = Vec::new();
		for (idx, track) in toc.tracks().iter().copied().enumerate() {
			if killed.killed() { break; }
			if self.opts.has_tracks() && ! self.opts.has_track(track.number()) {
				continue;
			}
			if ! track.is_audio() {
				Msg::warning(format!("Track #{:02} is a data track; skipping.", track.number()))
					.eprint();
				continue;
			}

			if let Some(dst) = self.rip_track(idx, track, progress, killed)? {
				saved.push(dst);
			}
		}

		// Dump the event log, if any and wanted.
		if self.opts.verbose() { self.log.flush(); }

		Ok(saved)
	}

	#[allow(clippy::cast_possible_truncation)] // A disc holds well under 4 GiB.
	/// # Rip One Track.
	///
	/// Chunk through `[start, end)`, retrying failed reads in place,
	/// 100 ms apart, abandoning the track after ten straight failures;
	/// then wrap whatever arrived in a WAV and save it.
	///
	/// Returns the output path, or `None` if the rip was killed before
	/// any audio landed.
	fn rip_track(
		&mut self,
		idx: usize,
		track: Track,
		progress: &Progless,
		killed: &KillSwitch,
	) -> Result<Option<PathBuf>, RipError> {
		let start = track.lba();
		let end = self.toc.track_end_lba(idx);
		if end <= start { return Err(RipError::TrackLba(track.number())); }
		let total = end - start;

		// Reset the progress bar. (This won't fail.)
		let _res = progress.reset(
			NonZeroU32::new(total.div_ceil(self.opts.chunk_size())).unwrap()
		);
		let label = format!("Track #{:02}", track.number());
		progress.set_title(Some(Msg::new((label.as_str(), 199), "Ripping…")));

		let mut audio: Vec<u8> = Vec::with_capacity(
			(total as usize).saturating_mul(usize::from(BYTES_PER_FRAME))
		);
		let mut lba = start;
		let mut errors = 0_u8;
		let mut abandoned = false;
		let started = Instant::now();

		while lba < end {
			if killed.killed() { break; }

			let frames = u32::min(self.opts.chunk_size(), end - lba);
			match self.device.read_cd_frames(lba, frames) {
				Ok(data) => {
					audio.extend_from_slice(&data);
					lba += frames;
					errors = 0;
					progress.increment();
				},
				Err(e) => {
					errors += 1;
					if MAX_CHUNK_ERRORS < errors {
						self.log.add_abandon(track, lba);
						Msg::warning(format!(
							"Too many read errors at LBA {lba}; abandoning track #{:02}.",
							track.number(),
						)).eprint();
						abandoned = true;
						break;
					}

					self.log.add_retry(track, lba, e);
					std::thread::sleep(RETRY_DELAY);
				},
			}
		}

		progress.finish();

		// Killed with nothing (or a partial chunk trail) to show for it?
		// Leave no file behind.
		if killed.killed() && ! abandoned && lba < end {
			return Ok(None);
		}

		// Save it!
		let dst = self.opts.output().join(format!("track{:02}.wav", track.number()));
		write_atomic::write_file(&dst, &write_wav(&audio))
			.map_err(|_| RipError::Write(dst.to_string_lossy().into_owned()))?;

		// Summarize.
		let ripped = lba - start;
		if abandoned {
			Msg::warning(format!(
				"Track #{:02}: only {}/{} frames; the rest were unreadable.",
				track.number(),
				NiceU32::from(ripped),
				NiceU32::from(total),
			)).eprint();
		}
		else {
			Msg::new((label.as_str(), 10), format!(
				"{} frames ({}) in {}.",
				NiceU32::from(ripped),
				nice_seconds(ripped),
				NiceElapsed::from(started),
			))
				.with_newline(true)
				.eprint();
		}

		Ok(Some(dst))
	}
}



/// # Save Disc Metadata.
///
/// Drop the two sidecar files next to the ripped tracks: `discid.txt`
/// holding the 28-character MusicBrainz disc ID (newline-terminated), and
/// a pretty-printed `toc.json` describing the disc layout.
///
/// ## Errors
///
/// Returns an error if the directory cannot be created or the files cannot
/// be written.
pub fn save_metadata(toc: &Toc, dir: &Path) -> Result<(), RipError> {
	std::fs::create_dir_all(dir)
		.map_err(|_| RipError::Write(dir.to_string_lossy().into_owned()))?;

	let dst = dir.join(DISCID_FILE);
	let line = format!("{}\n", toc.musicbrainz_id());
	write_atomic::write_file(&dst, line.as_bytes())
		.map_err(|_| RipError::Write(dst.to_string_lossy().into_owned()))?;

	let dst = dir.join(TOC_FILE);
	let json = serde_json::to_vec_pretty(toc)
		.map_err(|_| RipError::Write(dst.to_string_lossy().into_owned()))?;
	write_atomic::write_file(&dst, &json)
		.map_err(|_| RipError::Write(dst.to_string_lossy().into_owned()))?;

	Ok(())
}



/// # Super Basic Log.
///
/// Retry/abandonment events collected during a rip, printed to STDOUT en
/// masse at the end of the run (verbose mode only). Batching keeps the
/// records from tangling with the progress bar.
struct RipLog(Vec<(FmtUtc2k, RipLogEvent)>);

impl RipLog {
	/// # New Instance.
	const fn new() -> Self { Self(Vec::new()) }

	/// # Record a Retry.
	fn add_retry(&mut self, track: Track, lba: u32, err: RipError) {
		self.0.push((FmtUtc2k::now(), RipLogEvent::Retry(track.number(), lba, err)));
	}

	/// # Record an Abandonment.
	fn add_abandon(&mut self, track: Track, lba: u32) {
		self.0.push((FmtUtc2k::now(), RipLogEvent::Abandon(track.number(), lba)));
	}

	/// # Flush.
	fn flush(&mut self) {
		if self.0.is_empty() { return; }

		let writer = std::io::stdout();
		let mut handle = writer.lock();
		let _res = writeln!(&mut handle, "##\n## Rip Events: {}\n##", self.0.len());
		for (time, event) in self.0.drain(..) {
			let _res = writeln!(&mut handle, "## [{time}] {event}");
		}
		let _res = handle.flush();
	}
}

/// # Event Kind.
enum RipLogEvent {
	Retry(u8, u32, RipError),
	Abandon(u8, u32),
}

impl fmt::Display for RipLogEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Retry(track, lba, e) => write!(f, "{track:02}  {lba:06}  {e}"),
			Self::Abandon(track, lba) => write!(f, "{track:02}  {lba:06}  Abandoned."),
		}
	}
}



/// # Track Number to Flag.
///
/// The selection set is a single `u128` bitflag, which spares us the
/// trouble of sorting/deduping some sort of vector-like structure. Valid
/// track numbers (1–99) get a bit; anything else maps to zero.
const fn track_idx_to_bits(idx: u8) -> u128 {
	if idx == 0 || 99 < idx { 0 }
	else { 1_u128 << idx }
}

/// # Nice Seconds.
///
/// Render a frame count as seconds with one decimal, e.g. `243.1s`.
fn nice_seconds(frames: u32) -> String {
	format!("{:.1}s", f64::from(frames) / f64::from(FRAMES_PER_SECOND))
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Test TOC.
	///
	/// Three audio tracks with a lead-out at 54,750.
	const TOC_RAW: [u8; 36] = [
		0x00, 0x22, 0x01, 0x03,
		0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x96,
		0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x47, 0x4A,
		0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x8E, 0x94,
		0x00, 0x00, 0xAA, 0x00, 0x00, 0x00, 0xD5, 0xDE,
	];

	#[test]
	fn t_rip_options_chunk_size() {
		for v in [1, 75, 450] {
			let opts = RipOptions::default().with_chunk_size(v);
			assert_eq!(opts.chunk_size(), v);
		}

		// Zero re-defaults.
		let opts = RipOptions::default().with_chunk_size(0);
		assert_eq!(opts.chunk_size(), DEFAULT_CHUNK_SIZE);

		// Excess clamps.
		let opts = RipOptions::default().with_chunk_size(9999);
		assert_eq!(opts.chunk_size(), CHUNK_MAX);
	}

	#[test]
	fn t_rip_options_tracks() {
		let mut opts = RipOptions::default();
		assert!(! opts.has_tracks(), "The track list should start empty.");

		// Zero and 100+ are not tracks.
		opts = opts.with_track(0).with_track(100).with_track(255);
		assert!(! opts.has_tracks(), "Out-of-range tracks should be ignored.");

		// Everything else is.
		for idx in [3_u8, 1, 99, 3] { opts = opts.with_track(idx); }
		let selected: Vec<u8> = opts.tracks().collect();
		assert_eq!(selected, vec![1, 3, 99], "Tracks should come back sorted and deduped.");
		assert!(opts.has_track(3));
		assert!(! opts.has_track(2));
	}

	#[test]
	fn t_save_metadata() {
		let toc = Toc::parse(TOC_RAW.as_slice()).expect("Unable to parse TOC.");
		let dir = tempfile::tempdir().expect("Unable to create tempdir.");

		save_metadata(&toc, dir.path()).expect("Unable to save metadata.");

		// The disc ID: twenty-eight characters and a newline.
		let discid = std::fs::read_to_string(dir.path().join(DISCID_FILE))
			.expect("Missing discid.txt.");
		assert_eq!(discid.len(), 29);
		assert!(discid.ends_with('\n'));
		assert_eq!(discid.trim_end(), toc.musicbrainz_id().as_str());

		// The TOC JSON should round-trip the interesting fields.
		let json = std::fs::read_to_string(dir.path().join(TOC_FILE))
			.expect("Missing toc.json.");
		let parsed: serde_json::Value = serde_json::from_str(&json)
			.expect("Invalid toc.json.");
		assert_eq!(parsed["first_track"], 1);
		assert_eq!(parsed["last_track"], 3);
		assert_eq!(parsed["leadout_lba"], 54_750);
		assert_eq!(parsed["tracks"][1]["lba"], 18_250);
		assert_eq!(parsed["tracks"][2]["type"], "audio");
	}
}

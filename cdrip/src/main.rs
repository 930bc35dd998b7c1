/*!
# CD Rip!
*/

#![forbid(unsafe_code)]

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

mod cli;

use cdrip_core::{
	Device,
	KillSwitch,
	RipError,
	RipOptions,
	Ripper,
	save_metadata,
	Toc,
};
use dactyl::NiceElapsed;
use fyi_msg::{
	Msg,
	Progless,
};
use oxford_join::OxfordJoin;



/// # A Divider Line.
///
/// This is used to encase the drive vendor/model during summary. We'll
/// slice it to match the length rather than `"-".repeat()` or whatever.
const DIVIDER: &str = "----------------------------------------";



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() {
	match _main() {
		Ok(()) => {},
		Err(e @ (RipError::PrintHelp | RipError::PrintVersion)) => { println!("{e}"); },
		Err(e) => {
			Msg::from(e).eprint();
			std::process::exit(1);
		},
	}
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn _main() -> Result<(), RipError> {
	// Load CLI arguments, if any.
	let (opts, (vid, pid), toc_only) = cli::parse()?;

	// Connect to the drive and introduce it.
	let mut device = Device::open(vid, pid)?;
	let info = device.inquiry()?;
	let vm = info.to_string();
	if ! vm.is_empty() {
		let len = usize::min(vm.len(), DIVIDER.len());
		eprintln!(
			"\x1b[2;36m{}\n\x1b[0;1;36m{vm}\n\x1b[0;2;36m{}\n\x1b[0m",
			&DIVIDER[..len],
			&DIVIDER[..len],
		);
	}
	if ! info.is_cdrom() {
		Msg::warning("This doesn't look like an optical drive, but here goes…").eprint();
	}

	// No disc, no dice.
	if ! device.test_unit_ready() { return Err(RipError::DiscNotReady); }

	// Fetch and display the table of contents.
	let toc = device.read_toc()?;
	eprintln!("{toc}");

	// All done already?
	if toc_only { return Ok(()); }

	// Make sure the requested tracks actually exist.
	for idx in opts.tracks() {
		if toc.audio_track(idx).is_none() { return Err(RipError::NoTrack(idx)); }
	}

	// Set up the ripper!
	let progress = Progless::default();
	let killed = KillSwitch::default();
	sigint(killed.clone(), Some(progress.clone()));
	rip_summary(&opts, &toc);

	// Rip and rip and rip!
	let now = std::time::Instant::now();
	let mut ripper = Ripper::new(&mut device, &toc, &opts)?;
	let saved = ripper.rip(&progress, &killed)?;

	// The sidecar files.
	save_metadata(&toc, opts.output())?;

	// Print what we did!
	if ! saved.is_empty() {
		eprintln!("\nThe fruits of your labor:");
		for file in saved {
			eprintln!("  \x1b[2m{}\x1b[0m", file.to_string_lossy());
		}
		eprintln!();
	}

	if killed.killed() { Err(RipError::Killed) }
	else {
		Msg::success(format!("Finished in {}.", NiceElapsed::from(now))).eprint();
		Ok(())
	}
}

/// # Rip Summary.
///
/// Note the chosen settings before proceeding so surprises come early.
fn rip_summary(opts: &RipOptions, toc: &Toc) {
	let nice_tracks =
		if opts.has_tracks() {
			opts.tracks()
				.map(|n| format!("{n:02}"))
				.collect::<Vec<String>>()
				.oxford_and()
				.into_owned()
		}
		else {
			format!("all {}", toc.audio_tracks().count())
		};

	let set = [
		("Tracks:", nice_tracks),
		("Chunk Size:", format!("{} frames", opts.chunk_size())),
		("Destination:", format!("{}/track##.wav", opts.output().to_string_lossy())),
	];
	let max_label = set.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

	eprintln!("\x1b[1;38;5;199mRipping…\x1b[0m");
	for (k, v) in set {
		eprintln!("  {k:max_label$} \x1b[1m{v}\x1b[0m");
	}
	eprintln!();
}

/// # Hook Up CTRL+C.
fn sigint(killed: KillSwitch, progress: Option<Progless>) {
	let _res = ctrlc::set_handler(move ||
		if killed.kill() {
			if let Some(p) = &progress { p.sigint(); }
		}
	);
}

/*!
# CD Rip: CLI
*/

use argyle::Argument;
use cdrip_core::{
	RipError,
	RipOptions,
};
use dactyl::traits::BytesToUnsigned;



/// # Options Return Type.
///
/// The rip options, the VID/PID override (zeroes meaning "sweep the known
/// list"), and the TOC-only switch.
pub(super) type Parsed = (RipOptions, (u16, u16), bool);



/// # Parse Options.
pub(super) fn parse() -> Result<Parsed, RipError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut opts = RipOptions::default();
	let mut toc_only = false;
	let mut vendor_id = 0;
	let mut product_id = 0;
	let mut tracks = String::new();
	for arg in args {
		match arg {
			Argument::Key("-h" | "--help") => return Err(RipError::PrintHelp),
			Argument::Key("--toc") => { toc_only = true; },
			Argument::Key("-v" | "--verbose") => { opts = opts.with_verbose(true); },
			Argument::Key("-V" | "--version") => return Err(RipError::PrintVersion),

			Argument::KeyWithValue("--chunk-size", s) => {
				let s = u32::btou(s.trim().as_bytes())
					.ok_or(RipError::CliParse("--chunk-size"))?;
				opts = opts.with_chunk_size(s);
			},
			Argument::KeyWithValue("-o" | "--output", s) => {
				opts = opts.with_output(s);
			},
			Argument::KeyWithValue("--product-id", s) => {
				product_id = parse_hex_id(&s).ok_or(RipError::CliParse("--product-id"))?;
			},
			Argument::KeyWithValue("-t" | "--track" | "--tracks", s) => {
				if ! tracks.is_empty() { tracks.push(','); }
				tracks.push_str(&s);
			},
			Argument::KeyWithValue("--vendor-id", s) => {
				vendor_id = parse_hex_id(&s).ok_or(RipError::CliParse("--vendor-id"))?;
			},

			_ => {},
		}
	}

	// The override only works as a pair.
	if (vendor_id == 0) != (product_id == 0) {
		return Err(RipError::CliParse("--vendor-id/--product-id"));
	}

	// Turn the collected track strings into numbers.
	opts = parse_tracks(opts, &tracks)?;

	Ok((opts, (vendor_id, product_id), toc_only))
}



/// # Parse Hex ID.
///
/// Decode a `0x`-optional hexadecimal VID or PID. Zero doesn't identify
/// anything, so it reads as a failure too.
fn parse_hex_id(raw: &str) -> Option<u16> {
	let raw = raw.trim();
	let raw = raw.strip_prefix("0x")
		.or_else(|| raw.strip_prefix("0X"))
		.unwrap_or(raw);
	u16::from_str_radix(raw, 16).ok().filter(|&v| v != 0)
}

/// # Parse Track Selection.
///
/// Split the comma-separated list and add each entry to the options. Empty
/// entries are skipped; anything unparseable is an error.
fn parse_tracks(mut opts: RipOptions, tracks: &str) -> Result<RipOptions, RipError> {
	for v in tracks.split(',') {
		let v = v.as_bytes().trim_ascii();
		if v.is_empty() { continue; }

		let v = u8::btou(v).ok_or(RipError::CliParse("-t/--tracks"))?;
		opts = opts.with_track(v);
	}

	Ok(opts)
}

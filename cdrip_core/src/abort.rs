/*!
# CD Rip: Kill Switch
*/

use std::sync::{
	Arc,
	atomic::{
		AtomicBool,
		Ordering::{
			Acquire,
			Relaxed,
			SeqCst,
		},
	},
};



#[derive(Debug, Clone)]
/// # Kill Switch.
///
/// A shared one-shot abort flag for the rip loop. Ripping itself is
/// single-threaded, but the flip comes from a CTRL-C handler, so the state
/// lives in an atomic behind an `Arc` and clones all point at the same
/// flag.
///
/// Once killed, a switch stays killed. The rip loop checks it at every
/// chunk boundary, leaving completed tracks on disk and letting the device
/// unwind through `Drop`.
pub struct KillSwitch(Arc<AtomicBool>);

impl Default for KillSwitch {
	fn default() -> Self { Self(Arc::from(AtomicBool::new(false))) }
}

impl KillSwitch {
	#[must_use]
	/// # Dead?
	pub fn killed(&self) -> bool { self.0.load(Acquire) }

	/// # Kill!
	///
	/// Flip the switch, returning `true` if this particular call did the
	/// flipping. (Signal handlers can fire more than once; the abort
	/// side effects shouldn't.)
	pub fn kill(&self) -> bool {
		self.0.compare_exchange(false, true, SeqCst, Relaxed).is_ok()
	}
}

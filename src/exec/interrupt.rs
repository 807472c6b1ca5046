use crate::error::{Result, SmeltError};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Keeps the wrapper alive through SIGINT/SIGTERM.
///
/// Arming replaces the default fatal disposition with flag-setting handlers,
/// so an interrupt aimed at the foreground process group kills the child but
/// leaves the wrapper running to drain the child's remaining output and
/// finalize any open diagnostic block. The recorded signal is polled by the
/// watch loop between reruns.
pub struct InterruptFlags {
	sigint: Arc<AtomicBool>,
	sigterm: Arc<AtomicBool>,
}

impl InterruptFlags {
	/// Install flag-setting handlers for SIGINT and SIGTERM.
	pub fn arm() -> Result<Self> {
		let sigint = Arc::new(AtomicBool::new(false));
		let sigterm = Arc::new(AtomicBool::new(false));
		signal_hook::flag::register(SIGINT, Arc::clone(&sigint))
			.map_err(|source| SmeltError::SignalSetup { source })?;
		signal_hook::flag::register(SIGTERM, Arc::clone(&sigterm))
			.map_err(|source| SmeltError::SignalSetup { source })?;
		Ok(InterruptFlags { sigint, sigterm })
	}

	/// The signal received since arming, if any. SIGINT wins when both
	/// have been delivered.
	pub fn pending(&self) -> Option<i32> {
		if self.sigint.load(Ordering::Relaxed) {
			Some(SIGINT)
		} else if self.sigterm.load(Ordering::Relaxed) {
			Some(SIGTERM)
		} else {
			None
		}
	}
}

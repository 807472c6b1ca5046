//! Watch mode for smelt.
//!
//! This module handles:
//! - Watching source paths for filesystem changes (via notify)
//! - Rerunning the wrapped build command after each change settles
//! - Clean shutdown on SIGINT/SIGTERM

use crate::error::{Result, SmeltError};
use crate::exec;
use crate::exec::interrupt::InterruptFlags;
use crate::exec::status::RunStatus;
use crate::transform::rules::RuleSet;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;
use tracing::debug;

/// Quiet period after the first event, so one save that touches several
/// files triggers a single rebuild.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// How often a blocked wait wakes up to check the signal flags.
const SIGNAL_POLL: Duration = Duration::from_millis(200);

/// Why a wait on the listener returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
	/// A watched path changed and the change has settled.
	Changed,
	/// SIGINT or SIGTERM was delivered; carries the signal number.
	Interrupted(i32),
	/// The watcher backend shut down and no more events will arrive.
	Closed,
}

/// Blocks until a watched path changes or an interrupt arrives.
///
/// Signal delivery only sets a flag; the listener polls it between channel
/// timeouts so `wait` returns promptly without running code in signal context.
pub struct ChangeListener {
	rx: mpsc::Receiver<PathBuf>,
	interrupts: InterruptFlags,
	_watcher: notify::RecommendedWatcher,
}

impl ChangeListener {
	/// Watch `paths` recursively. Interrupts are reported through the
	/// caller-armed `interrupts` flags.
	pub fn new(paths: &[PathBuf], interrupts: InterruptFlags) -> Result<Self> {
		// Canonicalize so events (which arrive with symlinks resolved) can be
		// relativized against the roots before filtering.
		let roots: Vec<PathBuf> = paths
			.iter()
			.map(|path| path.canonicalize().unwrap_or_else(|_| path.clone()))
			.collect();

		let (tx, rx) = mpsc::channel();
		let filter_roots = roots.clone();
		let mut watcher =
			notify::recommended_watcher(move |result: std::result::Result<Event, notify::Error>| {
				if let Ok(event) = result {
					if let Some(path) = relevant_path(&event, &filter_roots) {
						let _ = tx.send(path.clone());
					}
				}
			})
			.map_err(|source| SmeltError::WatchSetup {
				path: PathBuf::from("."),
				source,
			})?;

		for root in &roots {
			watcher
				.watch(root, RecursiveMode::Recursive)
				.map_err(|source| SmeltError::WatchSetup {
					path: root.clone(),
					source,
				})?;
		}

		Ok(ChangeListener {
			rx,
			interrupts,
			_watcher: watcher,
		})
	}

	/// Block until something changes or an interrupt arrives.
	pub fn wait(&self) -> Wake {
		loop {
			if let Some(signal) = self.interrupts.pending() {
				return Wake::Interrupted(signal);
			}
			match self.rx.recv_timeout(SIGNAL_POLL) {
				Ok(path) => {
					debug!(path = %path.display(), "change detected");
					self.settle();
					return Wake::Changed;
				}
				Err(RecvTimeoutError::Timeout) => continue,
				Err(RecvTimeoutError::Disconnected) => return Wake::Closed,
			}
		}
	}

	/// Wait out the debounce window, then drain whatever queued up behind
	/// the first event.
	fn settle(&self) {
		std::thread::sleep(DEBOUNCE);
		while self.rx.try_recv().is_ok() {}
	}
}

/// First path in the event worth rebuilding for, if any.
fn relevant_path<'a>(event: &'a Event, roots: &[PathBuf]) -> Option<&'a PathBuf> {
	if !matches!(
		event.kind,
		EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
	) {
		return None;
	}
	event
		.paths
		.iter()
		.find(|path| !is_ignored(strip_root(path, roots)))
}

/// The part of `path` below the watch root it belongs to. Filtering only
/// looks at that part, so a dot in the root's own spelling doesn't mute
/// everything under it.
fn strip_root<'a>(path: &'a Path, roots: &[PathBuf]) -> &'a Path {
	roots
		.iter()
		.find_map(|root| path.strip_prefix(root).ok())
		.unwrap_or(path)
}

/// Dotfiles and build output directories churn during every build; changes
/// there never warrant another run.
fn is_ignored(path: &Path) -> bool {
	path.components().any(|component| match component {
		Component::Normal(name) => {
			let name = name.to_string_lossy();
			name.starts_with('.') || name == "build" || name == "target" || name == "out"
		}
		_ => false,
	})
}

/// Run the build once, then rerun it every time the watched paths change.
///
/// Returns when an interrupt is delivered, either to us directly or to the
/// child (a ctrl-c on the shared terminal hits both). The status of the
/// final run is what the process should exit with.
pub fn run_watch(
	program: &str,
	args: &[String],
	cwd: &Path,
	rules: &RuleSet,
	paths: &[PathBuf],
	interrupts: InterruptFlags,
) -> Result<RunStatus> {
	let listener = ChangeListener::new(paths, interrupts)?;
	eprintln!("[smelt] watching for changes (ctrl-c to stop)");

	let mut status = exec::run_build(program, args, cwd, rules)?;
	loop {
		if status.is_interrupted() {
			return Ok(status);
		}
		match listener.wait() {
			Wake::Changed => {
				eprintln!("[smelt] restarting due to changes...");
				status = exec::run_build(program, args, cwd, rules)?;
			}
			Wake::Interrupted(signal) => return Ok(RunStatus::Interrupted(signal)),
			Wake::Closed => return Ok(status),
		}
	}
}

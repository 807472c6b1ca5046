//! Build command execution for smelt.
//!
//! This module handles:
//! - Spawning the wrapped build command with piped output channels
//! - Driving both channels through the transformation engine
//! - Exit status propagation, including signal deaths

pub mod interrupt;
pub mod status;

use crate::error::{Result, SmeltError};
use crate::transform::router::Router;
use crate::transform::rules::RuleSet;
use crate::transform::sink::WriteSink;
use status::RunStatus;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Run one build command in `cwd`, refining its output through `rules`.
///
/// stdin passes through untouched; stdout and stderr are piped through the
/// transformation engine onto our own streams. Blocks until the child exits
/// and both channels are drained.
pub fn run_build(program: &str, args: &[String], cwd: &Path, rules: &RuleSet) -> Result<RunStatus> {
	debug!(command = %program, "starting build");

	let mut child = Command::new(program)
		.args(args)
		.current_dir(cwd)
		.stdin(Stdio::inherit())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.map_err(|source| {
			if source.kind() == std::io::ErrorKind::NotFound {
				SmeltError::CommandNotFound {
					command: program.to_string(),
				}
			} else {
				SmeltError::CommandFailed {
					command: program.to_string(),
					source,
				}
			}
		})?;

	let stdout = child.stdout.take().ok_or_else(|| SmeltError::OutputCapture {
		command: program.to_string(),
	})?;
	let stderr = child.stderr.take().ok_or_else(|| SmeltError::OutputCapture {
		command: program.to_string(),
	})?;

	// Drain both channels before reaping the child; waiting first could
	// deadlock on a full pipe.
	let mut out_sink = WriteSink::stdout();
	let mut err_sink = WriteSink::stderr();
	Router::new(rules).run(stdout, stderr, &mut out_sink, &mut err_sink);

	let exit = child.wait().map_err(|source| SmeltError::CommandFailed {
		command: program.to_string(),
		source,
	})?;

	let run_status = RunStatus::from_exit(exit);
	debug!(?run_status, "build finished");
	Ok(run_status)
}

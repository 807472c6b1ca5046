use std::process::ExitStatus;

/// How a wrapped build invocation ended.
///
/// Signal deaths are kept apart from clean non-zero exits because callers
/// react differently: the watch loop treats an interrupt as "stop watching",
/// not as "the build failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
	/// Exited zero.
	Success,

	/// Exited with a non-zero code.
	Failure(i32),

	/// Killed by a signal before it could exit.
	Interrupted(i32),
}

impl RunStatus {
	/// Translate a child's raw exit status.
	pub fn from_exit(status: ExitStatus) -> RunStatus {
		if status.success() {
			RunStatus::Success
		} else if let Some(code) = status.code() {
			RunStatus::Failure(code)
		} else {
			signal_status(status)
		}
	}

	/// Exit code for the wrapper itself: the child's own code, or the shell
	/// convention `128 + signal` for a signal death.
	pub fn exit_code(self) -> i32 {
		match self {
			RunStatus::Success => 0,
			RunStatus::Failure(code) => code,
			RunStatus::Interrupted(signal) => 128 + signal,
		}
	}

	pub fn is_interrupted(self) -> bool {
		matches!(self, RunStatus::Interrupted(_))
	}
}

#[cfg(unix)]
fn signal_status(status: ExitStatus) -> RunStatus {
	use std::os::unix::process::ExitStatusExt;
	match status.signal() {
		Some(signal) => RunStatus::Interrupted(signal),
		None => RunStatus::Failure(1),
	}
}

#[cfg(not(unix))]
fn signal_status(_status: ExitStatus) -> RunStatus {
	RunStatus::Failure(1)
}

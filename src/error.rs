use std::path::PathBuf;

/// Library-level structured errors for smelt.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum SmeltError {
	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid regex in rule pattern: {pattern}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Rule \"{pattern}\" sets both ignore and replace; pick one")]
	RuleConflict { pattern: String },

	#[error("Rule \"{pattern}\" sets neither ignore nor replace")]
	RuleWithoutAction { pattern: String },

	#[error("Command execution failed: {command}")]
	CommandFailed {
		command: String,
		#[source]
		source: std::io::Error,
	},

	#[error("Command not found: {command}")]
	CommandNotFound { command: String },

	#[error("Failed to capture output stream of: {command}")]
	OutputCapture { command: String },

	#[error("Failed to watch {path} for changes")]
	WatchSetup {
		path: PathBuf,
		#[source]
		source: notify::Error,
	},

	#[error("Failed to install signal handlers")]
	SignalSetup {
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using SmeltError.
pub type Result<T> = std::result::Result<T, SmeltError>;

//! Pure formatting helpers for rendered diagnostic blocks.
//!
//! All colored output for the cc dialect goes through these functions, which
//! keeps styling decisions testable and out of the state machine.

use colored::Colorize;
use std::path::Path;

/// Severity of a compiler diagnostic, decoded from its keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	Error,
	Warning,
}

impl Severity {
	/// The keywords [`Severity::from_keyword`] accepts, in match order.
	pub const KEYWORDS: &'static [&'static str] = &["error", "fatal error", "warning"];

	/// Decode a cc-style severity keyword.
	pub fn from_keyword(word: &str) -> Option<Self> {
		match word {
			"error" | "fatal error" => Some(Severity::Error),
			"warning" => Some(Severity::Warning),
			_ => None,
		}
	}

	/// Apply this severity's color to `text`.
	pub fn paint(self, text: &str) -> String {
		match self {
			Severity::Error => text.red().to_string(),
			Severity::Warning => text.yellow().to_string(),
		}
	}
}

/// Header line for a diagnostic block: `  ● Error: <message>`.
pub fn format_header(severity: Severity, message: &str) -> String {
	let label = match severity {
		Severity::Error => "● Error:".red().bold(),
		Severity::Warning => "● Warning:".yellow().bold(),
	};
	format!("  {} {}", label, message)
}

/// The offending source line, stripped of its original indent and shown dim.
pub fn format_code(code: &str) -> String {
	format!("    {}", code.dimmed())
}

/// The caret line under the offending source. Clang draws spans with `~`;
/// they normalize to `^` before the severity color is applied.
pub fn format_underline(severity: Severity, underline: &str) -> String {
	format!("    {}", severity.paint(&underline.replace('~', "^")))
}

/// A `note:` attached to the current diagnostic.
pub fn format_note(note: &str) -> String {
	format!("    note: {}", note)
}

/// Location footer: `    at <dirs>/<file>:<line>` with the directory part
/// dimmed and the path shown relative to `root` when it lies inside it.
pub fn format_location(path: &str, line: u32, root: &Path) -> String {
	let shown = Path::new(path)
		.strip_prefix(root)
		.ok()
		.and_then(Path::to_str)
		.unwrap_or(path);

	match shown.rsplit_once('/') {
		Some((dirs, file)) => format!("    at {}/{}:{}", dirs.dimmed(), file, line),
		None => format!("    at {}:{}", shown, line),
	}
}

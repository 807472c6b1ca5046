use crate::dialect::format::{self, Severity};
use crate::error::{Result, SmeltError};
use crate::transform::pattern::LineMatch;
use crate::transform::response::{FeedResult, Response};
use crate::transform::sink::Sink;
use regex::Regex;
use std::path::{Path, PathBuf};

/// The `note:` companion-line shape. Compiled once per rule set; every
/// diagnostic block started by that set shares the clone.
pub fn note_pattern() -> Result<Regex> {
	let pattern = r"^([^\s:][^:]*):(\d+):\d+: note: (.*)$";
	Regex::new(pattern).map_err(|source| SmeltError::InvalidPattern {
		pattern: pattern.to_string(),
		source,
	})
}

/// Which line of a code/underline/note group comes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	Code,
	Underline,
	NoteOrContinuation,
}

/// Multi-line renderer for one cc-style diagnostic.
///
/// Created when a `file:line:col: error|warning: message` line matches.
/// Consumes the offending source line and its caret line, then any `note:`
/// lines (each bringing another code/underline pair) and continuation
/// fragments indented at least eight spaces. The first line fitting none of
/// those shapes ends the block and is handed back to the router.
pub struct DiagnosticResponse {
	severity: Severity,
	message: String,
	path: String,
	line: u32,
	root: PathBuf,
	note: Regex,
	state: State,
	indent: usize,
}

impl DiagnosticResponse {
	/// Build a response from a matched diagnostic header line.
	///
	/// Returns `None` when the captures don't decode, which turns the match
	/// back into an ordinary passthrough line.
	pub fn from_match(mat: &LineMatch, root: &Path, note: Regex) -> Option<Self> {
		let severity = Severity::from_keyword(mat.get(3))?;
		let line = mat.parse::<u32>(1)?;

		Some(DiagnosticResponse {
			severity,
			message: mat.get(4).to_string(),
			path: mat.get(0).to_string(),
			line,
			root: root.to_path_buf(),
			note,
			state: State::Code,
			indent: 0,
		})
	}
}

impl Response for DiagnosticResponse {
	fn open(&mut self, sink: &mut dyn Sink) {
		sink.emit_line("");
		sink.emit_line(&format::format_header(self.severity, &self.message));
		sink.emit_line("");
	}

	fn feed(&mut self, line: &str, sink: &mut dyn Sink) -> FeedResult {
		match self.state {
			State::Code => {
				self.indent = leading_spaces(line);
				sink.emit_line(&format::format_code(strip_indent(line, self.indent)));
				self.state = State::Underline;
				FeedResult::Consumed
			}
			State::Underline => {
				sink.emit_line(&format::format_underline(
					self.severity,
					strip_indent(line, self.indent),
				));
				self.state = State::NoteOrContinuation;
				FeedResult::Consumed
			}
			State::NoteOrContinuation => {
				if let Some(caps) = self.note.captures(line) {
					let text = caps.get(3).map_or("", |m| m.as_str());
					sink.emit_line(&format::format_note(text));
					sink.emit_line("");
					self.state = State::Code;
					FeedResult::Consumed
				} else if line.starts_with("        ") {
					sink.emit_line(strip_indent(line, self.indent));
					sink.emit_line("");
					FeedResult::Consumed
				} else {
					FeedResult::Rejected
				}
			}
		}
	}

	fn finish(&mut self, sink: &mut dyn Sink) {
		sink.emit_line(&format::format_location(&self.path, self.line, &self.root));
		sink.emit_line("");
	}
}

fn leading_spaces(line: &str) -> usize {
	line.chars().take_while(|&c| c == ' ').count()
}

/// Drop the first `count` characters. The caret and continuation lines are
/// stripped by the code line's measured indent, which keeps their alignment.
fn strip_indent(line: &str, count: usize) -> &str {
	match line.char_indices().nth(count) {
		Some((offset, _)) => &line[offset..],
		None => "",
	}
}

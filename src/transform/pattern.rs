use crate::error::{Result, SmeltError};
use regex::Regex;
use std::str::FromStr;

/// One of the two output streams of the wrapped process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
	Stdout,
	Stderr,
}

/// Which channels a pattern applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFilter {
	Stdout,
	Stderr,
	Both,
}

impl ChannelFilter {
	/// Check whether lines from `channel` should be tried against the pattern.
	pub fn accepts(&self, channel: Channel) -> bool {
		match (self, channel) {
			(ChannelFilter::Both, _) => true,
			(ChannelFilter::Stdout, Channel::Stdout) => true,
			(ChannelFilter::Stderr, Channel::Stderr) => true,
			_ => false,
		}
	}
}

/// Validation applied to one capture group when a pattern matches.
///
/// A capture that fails validation makes the whole pattern a non-match for
/// that line, so malformed input falls through to later rules or passthrough
/// instead of producing a half-decoded match.
#[derive(Debug, Clone, Copy)]
pub enum CaptureKind {
	/// Any text, including empty.
	Text,

	/// Must parse as an unsigned integer.
	Integer,

	/// Must be one of the listed words.
	Keyword(&'static [&'static str]),
}

impl CaptureKind {
	fn validates(&self, text: &str) -> bool {
		match self {
			CaptureKind::Text => true,
			CaptureKind::Integer => text.parse::<u64>().is_ok(),
			CaptureKind::Keyword(words) => words.contains(&text),
		}
	}
}

/// An immutable compiled line-matching rule: a regex, the channels it applies
/// to, and typed validation for its capture groups.
#[derive(Debug)]
pub struct Pattern {
	regex: Regex,
	channels: ChannelFilter,
	captures: Vec<CaptureKind>,
}

impl Pattern {
	/// Compile a pattern whose captures are all plain text.
	pub fn new(expression: &str, channels: ChannelFilter) -> Result<Self> {
		Self::with_captures(expression, channels, &[])
	}

	/// Compile a pattern with typed capture validation.
	///
	/// `captures[i]` validates capture group `i + 1`; groups beyond the list
	/// are treated as plain text.
	pub fn with_captures(
		expression: &str,
		channels: ChannelFilter,
		captures: &[CaptureKind],
	) -> Result<Self> {
		let regex = Regex::new(expression).map_err(|source| SmeltError::InvalidPattern {
			pattern: expression.to_string(),
			source,
		})?;

		Ok(Pattern {
			regex,
			channels,
			captures: captures.to_vec(),
		})
	}

	/// Try this pattern against a line from the given channel.
	///
	/// Returns the realized match, or `None` when the channel filter, the
	/// regex, or any typed capture validation rejects the line.
	pub fn try_match(&self, line: &str, channel: Channel) -> Option<LineMatch> {
		if !self.channels.accepts(channel) {
			return None;
		}

		let caps = self.regex.captures(line)?;
		let captured: Vec<String> = caps
			.iter()
			.skip(1) // Skip the full match
			.map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
			.collect();

		for (kind, text) in self.captures.iter().zip(&captured) {
			if !kind.validates(text) {
				return None;
			}
		}

		Some(LineMatch {
			line: line.to_string(),
			captures: captured,
		})
	}
}

/// One realized application of a [`Pattern`] to a specific line.
///
/// Capture index 0 corresponds to the pattern's first capture group.
#[derive(Debug, Clone)]
pub struct LineMatch {
	line: String,
	captures: Vec<String>,
}

impl LineMatch {
	/// The full line the pattern matched.
	pub fn line(&self) -> &str {
		&self.line
	}

	/// Text of capture group `index`, empty when the group didn't participate.
	pub fn get(&self, index: usize) -> &str {
		self.captures.get(index).map_or("", String::as_str)
	}

	/// Decode capture group `index` as `T`; `None` when missing or malformed.
	pub fn parse<T: FromStr>(&self, index: usize) -> Option<T> {
		self.captures.get(index)?.parse().ok()
	}

	/// All captured fields, in group order.
	pub fn captures(&self) -> &[String] {
		&self.captures
	}

	/// Expand `$1`..`$9` capture references in a replacement template.
	///
	/// `$0` expands to the whole matched line and `$$` to a literal dollar
	/// sign; a reference to a group the pattern doesn't have expands to
	/// nothing.
	pub fn expand(&self, template: &str) -> String {
		let mut out = String::with_capacity(template.len());
		let mut chars = template.chars().peekable();

		while let Some(c) = chars.next() {
			if c != '$' {
				out.push(c);
				continue;
			}
			match chars.peek() {
				Some('$') => {
					chars.next();
					out.push('$');
				}
				Some(&digit) if digit.is_ascii_digit() => {
					chars.next();
					if let Some(index) = digit.to_digit(10) {
						if index == 0 {
							out.push_str(&self.line);
						} else {
							out.push_str(self.get(index as usize - 1));
						}
					}
				}
				_ => out.push('$'),
			}
		}

		out
	}
}

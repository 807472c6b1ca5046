use crate::transform::dedup::{DedupStore, MatchKey};
use crate::transform::pattern::{Channel, LineMatch, Pattern};
use crate::transform::response::Response;

/// Computes replacement text for a single matched line.
pub type ReplaceFn = Box<dyn Fn(&LineMatch) -> String + Send + Sync>;

/// Builds a multi-line response from a register match. Returning `None`
/// declines the match and the line falls through to lower-priority rules.
pub type StartFn = Box<dyn Fn(&LineMatch) -> Option<Box<dyn Response>> + Send + Sync>;

/// What the router should do with one line.
pub enum Action {
	/// No rule matched; emit the line verbatim to its natural sink.
	Passthrough,

	/// An ignore rule matched; emit nothing.
	Suppress,

	/// A replace rule matched; emit this text in place of the line.
	Substitute(String),

	/// A register rule matched; drive this response over the following lines.
	Begin {
		response: Box<dyn Response>,
		/// The same diagnostic was already rendered earlier in this run.
		duplicate: bool,
	},
}

struct ReplaceRule {
	pattern: Pattern,
	replace: ReplaceFn,
}

struct RegisterRule {
	pattern: Pattern,
	start: StartFn,
}

/// Ordered, per-channel rule table.
///
/// Classification tries ignore rules first, then replace rules, then
/// register rules, so a line that would start a multi-line diagnostic can
/// never also be independently rewritten. Within each category the
/// first-added rule wins.
#[derive(Default)]
pub struct RuleSet {
	ignores: Vec<Pattern>,
	replaces: Vec<ReplaceRule>,
	registers: Vec<RegisterRule>,
}

impl RuleSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Suppress lines matching `pattern`.
	pub fn ignore(&mut self, pattern: Pattern) {
		self.ignores.push(pattern);
	}

	/// Rewrite single lines matching `pattern` with `replace`.
	pub fn replace<F>(&mut self, pattern: Pattern, replace: F)
	where
		F: Fn(&LineMatch) -> String + Send + Sync + 'static,
	{
		self.replaces.push(ReplaceRule {
			pattern,
			replace: Box::new(replace),
		});
	}

	/// Promote lines matching `pattern` to a stateful multi-line response.
	pub fn register<F>(&mut self, pattern: Pattern, start: F)
	where
		F: Fn(&LineMatch) -> Option<Box<dyn Response>> + Send + Sync + 'static,
	{
		self.registers.push(RegisterRule {
			pattern,
			start: Box::new(start),
		});
	}

	/// Decide what to do with one line from `channel`.
	///
	/// Register matches consult `dedup` atomically, so the duplicate flag is
	/// correct even when both channels classify concurrently.
	pub fn classify(&self, line: &str, channel: Channel, dedup: &DedupStore) -> Action {
		for pattern in &self.ignores {
			if pattern.try_match(line, channel).is_some() {
				return Action::Suppress;
			}
		}

		for rule in &self.replaces {
			if let Some(mat) = rule.pattern.try_match(line, channel) {
				return Action::Substitute((rule.replace)(&mat));
			}
		}

		for (index, rule) in self.registers.iter().enumerate() {
			if let Some(mat) = rule.pattern.try_match(line, channel) {
				if let Some(response) = (rule.start)(&mat) {
					let duplicate = !dedup.first_sighting(MatchKey::new(index, mat.captures()));
					return Action::Begin { response, duplicate };
				}
				// Factory declined the match; keep trying lower-priority rules.
			}
		}

		Action::Passthrough
	}
}

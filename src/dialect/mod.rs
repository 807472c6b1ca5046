//! Built-in rules for cc-style build output.
//!
//! Understands the lines make and cmake driven compiles actually produce:
//! compiler diagnostics (`file:line:col: error: ...`) on stderr, progress
//! and bookkeeping chatter on stdout. Everything unrecognized passes through
//! untouched.

pub mod diagnostic;
pub mod format;

use crate::config::types::MergedConfig;
use crate::error::Result;
use crate::transform::pattern::{CaptureKind, ChannelFilter, Pattern};
use crate::transform::response::Response;
use crate::transform::rules::RuleSet;
use colored::Colorize;
use diagnostic::DiagnosticResponse;
use format::Severity;
use std::path::Path;

/// Build the cc rule set alone. `root` is the build working directory;
/// diagnostic footers show paths relative to it.
pub fn cc_rules(root: &Path) -> Result<RuleSet> {
	let mut rules = RuleSet::new();
	install(&mut rules, root)?;
	Ok(rules)
}

/// Build the effective rule set: configured rules first, then the built-ins.
pub fn assemble_rules(config: &MergedConfig, root: &Path) -> Result<RuleSet> {
	let mut rules = RuleSet::new();

	for entry in &config.rules {
		let pattern = Pattern::new(&entry.rule.pattern, entry.rule.channel.into())?;
		if entry.rule.ignore {
			rules.ignore(pattern);
		} else if let Some(template) = &entry.rule.replace {
			let template = template.clone();
			rules.replace(pattern, move |mat| mat.expand(&template));
		}
	}

	install(&mut rules, root)?;
	Ok(rules)
}

/// Append the built-in cc rules to `rules`. User rules added beforehand keep
/// priority within their category.
pub fn install(rules: &mut RuleSet, root: &Path) -> Result<()> {
	// stdout bookkeeping with no diagnostic value
	rules.ignore(Pattern::new(
		r"^Scanning dependencies of target ",
		ChannelFilter::Stdout,
	)?);
	rules.ignore(Pattern::new(
		r"^make(\[\d+\])?: (Entering|Leaving) directory ",
		ChannelFilter::Stdout,
	)?);
	rules.ignore(Pattern::new(
		r"^\[\s*\d+%\] Built target ",
		ChannelFilter::Stdout,
	)?);

	// stderr trailers that only repeat what the diagnostics already said
	rules.ignore(Pattern::new(r"^make(\[\d+\])?: \*\*\* ", ChannelFilter::Stderr)?);
	rules.ignore(Pattern::new(
		r"^compilation terminated\.$",
		ChannelFilter::Stderr,
	)?);
	rules.ignore(Pattern::new(
		r"^\d+ (error|warning)s? generated\.$",
		ChannelFilter::Stderr,
	)?);

	// progress lines, rewritten to something quieter
	rules.replace(
		Pattern::new(
			r"^\[\s*\d+%\] Building \w+ object (.*)$",
			ChannelFilter::Stdout,
		)?,
		|mat| format!("{}{}", "Compile ".dimmed(), mat.get(0)),
	);
	rules.replace(
		Pattern::new(
			r"^\[\s*\d+%\] Linking \w+ (?:executable|static library|shared library|shared module) (.*)$",
			ChannelFilter::Stdout,
		)?,
		|mat| format!("\n{}{}", "Link ".blue(), mat.get(0)),
	);

	// compiler diagnostics become multi-line blocks
	let root = root.to_path_buf();
	let note = diagnostic::note_pattern()?;
	rules.register(
		Pattern::with_captures(
			r"^([^\s:][^:]*):(\d+):(\d+): (error|fatal error|warning): (.*)$",
			ChannelFilter::Stderr,
			&[
				CaptureKind::Text,
				CaptureKind::Integer,
				CaptureKind::Integer,
				CaptureKind::Keyword(Severity::KEYWORDS),
				CaptureKind::Text,
			],
		)?,
		move |mat| {
			DiagnosticResponse::from_match(mat, &root, note.clone())
				.map(|response| Box::new(response) as Box<dyn Response>)
		},
	);

	Ok(())
}

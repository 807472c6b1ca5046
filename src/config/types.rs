use crate::error::{Result, SmeltError};
use crate::transform::pattern::{ChannelFilter, Pattern};
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level configuration from a `.smelt.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// If true, stop the directory cascade at this file.
	#[serde(default)]
	pub root: bool,

	/// Build command to run when none is given on the command line.
	#[serde(default)]
	pub command: Vec<String>,

	/// Paths to watch in --watch mode.
	#[serde(default)]
	pub watch: Vec<PathBuf>,

	/// Output rules, tried before the built-in ones. First match wins.
	#[serde(default)]
	pub rules: Vec<Rule>,
}

/// Which channel a configured rule applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleChannel {
	Stdout,
	Stderr,
	#[default]
	Both,
}

impl RuleChannel {
	/// Name as it appears in config files.
	pub fn as_str(self) -> &'static str {
		match self {
			RuleChannel::Stdout => "stdout",
			RuleChannel::Stderr => "stderr",
			RuleChannel::Both => "both",
		}
	}
}

impl From<RuleChannel> for ChannelFilter {
	fn from(channel: RuleChannel) -> Self {
		match channel {
			RuleChannel::Stdout => ChannelFilter::Stdout,
			RuleChannel::Stderr => ChannelFilter::Stderr,
			RuleChannel::Both => ChannelFilter::Both,
		}
	}
}

/// A single configured output rule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Rule {
	/// Regex applied to each line of the chosen channel.
	pub pattern: String,

	/// Channel the rule applies to.
	#[serde(default)]
	pub channel: RuleChannel,

	/// Suppress matching lines entirely (mutually exclusive with replace).
	#[serde(default)]
	pub ignore: bool,

	/// Replacement for matching lines; `$1`..`$9` expand capture groups and
	/// `$0` the whole line (mutually exclusive with ignore).
	pub replace: Option<String>,
}

impl Rule {
	/// Check that the rule names exactly one action and a valid pattern.
	pub fn validate(&self) -> Result<()> {
		if self.ignore && self.replace.is_some() {
			return Err(SmeltError::RuleConflict {
				pattern: self.pattern.clone(),
			});
		}
		if !self.ignore && self.replace.is_none() {
			return Err(SmeltError::RuleWithoutAction {
				pattern: self.pattern.clone(),
			});
		}
		// Surface bad regexes at load time instead of mid-build.
		Pattern::new(&self.pattern, self.channel.into())?;
		Ok(())
	}
}

impl Config {
	/// Validate all rules in this config.
	pub fn validate(&self) -> Result<()> {
		for rule in &self.rules {
			rule.validate()?;
		}
		Ok(())
	}
}

/// A loaded configuration with its source path for display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Effective configuration merged from the whole cascade.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
	/// Default build command; the most specific config wins.
	pub command: Option<Vec<String>>,

	/// Watch paths; the most specific config that sets any wins.
	pub watch: Vec<PathBuf>,

	/// All rules from all configs, in cascade order (first match wins).
	pub rules: Vec<RuleWithSource>,
}

/// A rule with its source config path for display.
#[derive(Debug, Clone)]
pub struct RuleWithSource {
	/// The rule itself.
	pub rule: Rule,

	/// The config file this rule came from.
	pub source: PathBuf,
}

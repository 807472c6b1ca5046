use crate::config::parser::parse_config_file;
use crate::config::types::{LoadedConfig, MergedConfig, RuleWithSource};
use crate::error::{Result, SmeltError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Discover and load all config files in the cascade.
///
/// The cascade order is:
/// 1. Start from `start_dir` and look for `.smelt.toml`
/// 2. If found and `root = true`, stop walking up
/// 3. Otherwise, continue up the directory tree
/// 4. Finally, check ~/.smelt.toml
///
/// Returns configs in cascade order (most specific first).
pub fn discover_configs(start_dir: &Path) -> Result<Vec<LoadedConfig>> {
	let mut configs = Vec::new();
	let mut current_dir = start_dir.to_path_buf();

	// Walk up the directory tree
	loop {
		let config_path = current_dir.join(".smelt.toml");

		if config_path.exists() {
			let config = parse_config_file(&config_path)?;
			debug!(path = %config_path.display(), "loaded config");
			let stop = config.root;

			configs.push(LoadedConfig {
				config,
				path: config_path,
			});

			if stop {
				break;
			}
		}

		// Move to parent directory
		if let Some(parent) = current_dir.parent() {
			current_dir = parent.to_path_buf();
		} else {
			break;
		}
	}

	if let Some(user_config) = load_user_config()? {
		configs.push(user_config);
	}

	Ok(configs)
}

/// Load the user's ~/.smelt.toml if it exists.
fn load_user_config() -> Result<Option<LoadedConfig>> {
	let user_config_path = user_config_path()?;

	if user_config_path.exists() {
		let config = parse_config_file(&user_config_path)?;
		Ok(Some(LoadedConfig {
			config,
			path: user_config_path,
		}))
	} else {
		Ok(None)
	}
}

/// Merge multiple configs into a single effective config.
///
/// Rules are collected in cascade order (first match wins); the command and
/// the watch list come from the most specific config that sets them.
pub fn merge_configs(configs: &[LoadedConfig]) -> MergedConfig {
	let mut merged = MergedConfig::default();

	for loaded in configs {
		for rule in &loaded.config.rules {
			merged.rules.push(RuleWithSource {
				rule: rule.clone(),
				source: loaded.path.clone(),
			});
		}

		if merged.command.is_none() && !loaded.config.command.is_empty() {
			merged.command = Some(loaded.config.command.clone());
		}

		if merged.watch.is_empty() && !loaded.config.watch.is_empty() {
			merged.watch = loaded.config.watch.clone();
		}
	}

	merged
}

/// Convenience function to discover, load, and merge configs from a directory.
pub fn load_merged_config(start_dir: &Path) -> Result<MergedConfig> {
	let configs = discover_configs(start_dir)?;
	Ok(merge_configs(&configs))
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(SmeltError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(".smelt.toml"))
}

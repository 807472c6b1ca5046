//! Configuration loading and parsing for smelt.
//!
//! This module handles:
//! - TOML config file parsing
//! - Directory cascade discovery
//! - Config merging

pub mod cascade;
pub mod parser;
pub mod types;

pub use cascade::{discover_configs, load_merged_config, merge_configs, user_config_path};
pub use parser::{parse_config_file, parse_config_str};
pub use types::{Config, LoadedConfig, MergedConfig, Rule, RuleChannel, RuleWithSource};

/// Starter config written by `smelt --init`.
pub fn init_template() -> &'static str {
	r#"# smelt configuration
#
# smelt runs the command below (or the one given on the command line),
# rewriting recognized build output as it streams.

root = true

# Default build command for bare `smelt`.
# command = ["make", "-j4"]

# Paths watched in --watch mode, relative to the working directory.
# watch = ["src", "include", "Makefile"]

# Rules run before the built-ins. A rule either ignores matching lines or
# replaces them; $1-$9 reference capture groups, $0 the whole line.
# [[rules]]
# pattern = "^warning: directory marked as dirty$"
# channel = "stderr"
# ignore = true

# [[rules]]
# pattern = "^-- Found ([A-Za-z0-9_]+)$"
# replace = "Found $1"
"#
}

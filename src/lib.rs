//! Smelt - CLI tool that wraps build commands and refines their output in real time.
//!
//! This library provides the core functionality for smelt, including:
//! - Configuration file parsing and cascade discovery
//! - Ordered rewrite rules applied line by line to both output channels
//! - Multi-line compiler diagnostic reformatting with duplicate suppression
//! - Build command execution with exit status propagation
//!
//! # Example
//!
//! ```no_run
//! use smelt_cli::config::load_merged_config;
//! use smelt_cli::dialect::assemble_rules;
//! use smelt_cli::exec::run_build;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let config = load_merged_config(&cwd).unwrap();
//! let rules = assemble_rules(&config, &cwd).unwrap();
//!
//! let status = run_build("make", &[], &cwd, &rules).unwrap();
//! std::process::exit(status.exit_code());
//! ```

pub mod config;
pub mod dialect;
pub mod error;
pub mod exec;
pub mod transform;
pub mod watch;

pub use error::{Result, SmeltError};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use smelt_cli::config::{load_merged_config, user_config_path};
use smelt_cli::dialect::assemble_rules;
use smelt_cli::exec::interrupt::InterruptFlags;
use smelt_cli::exec::run_build;
use smelt_cli::watch::run_watch;

#[derive(Parser)]
#[command(name = "smelt")]
#[command(
	author,
	version,
	about = "CLI tool that wraps build commands and refines their output in real time"
)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Rerun the command whenever watched files change
	#[arg(short = 'w', long)]
	watch: bool,

	/// When to color refined output
	#[arg(long, value_enum, default_value = "auto")]
	color: ColorMode,

	/// Increase log verbosity (-v debug, -vv trace)
	#[arg(short = 'v', long, action = clap::ArgAction::Count)]
	verbose: u8,

	/// Create a template .smelt.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .smelt.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,

	/// Build command to run through smelt
	#[arg(trailing_var_arg = true, allow_hyphen_values = true)]
	args: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
	/// Write a completion script for the given shell to stdout
	Completions {
		#[arg(value_enum)]
		shell: Shell,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display merged effective configuration with source annotations
	Show,
	/// Check all config files for errors without running anything
	Validate,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorMode {
	/// Color when the stream is a terminal
	Auto,
	/// Always emit color codes
	Always,
	/// Never emit color codes
	Never,
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	init_logging(cli.verbose);
	apply_color_mode(cli.color);

	// Handle --init
	if cli.init {
		return handle_init(cli.force);
	}

	// Handle subcommands
	if let Some(command) = cli.command {
		return match command {
			Commands::Config { action } => match action {
				ConfigAction::Show => handle_config_show(),
				ConfigAction::Validate => handle_config_validate(),
			},
			Commands::Completions { shell } => handle_completions(shell),
		};
	}

	// Everything else is a build run, with or without --watch
	handle_build(&cli.args, cli.watch)
}

fn init_logging(verbose: u8) {
	let log_level = match verbose {
		0 => "warn",
		1 => "debug",
		_ => "trace",
	};

	// Our stdout belongs to the wrapped build; diagnostics go to stderr.
	tracing_subscriber::fmt()
		.with_env_filter(log_level)
		.with_writer(std::io::stderr)
		.with_target(verbose >= 2)
		.init();

	debug!("smelt started with verbosity level: {}", verbose);
}

fn apply_color_mode(color: ColorMode) {
	match color {
		ColorMode::Auto => {}
		ColorMode::Always => colored::control::set_override(true),
		ColorMode::Never => colored::control::set_override(false),
	}
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(".smelt.toml");

	if config_path.exists() && !force {
		anyhow::bail!(".smelt.toml already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, smelt_cli::config::init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created .smelt.toml");
	Ok(ExitCode::SUCCESS)
}

fn handle_config_show() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let configs =
		smelt_cli::config::discover_configs(&cwd).context("Failed to discover config files")?;

	if configs.is_empty() {
		println!("No configuration files found.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("Configuration files (in cascade order):\n");

	for loaded in &configs {
		println!("# Source: {}", loaded.path.display());
		println!("# root: {}", loaded.config.root);
		if !loaded.config.command.is_empty() {
			println!("# command: {}", loaded.config.command.join(" "));
		}
		if !loaded.config.watch.is_empty() {
			let watch: Vec<String> = loaded
				.config
				.watch
				.iter()
				.map(|path| path.display().to_string())
				.collect();
			println!("# watch: {}", watch.join(" "));
		}
		println!("# rules: {}", loaded.config.rules.len());
		println!();

		for (i, rule) in loaded.config.rules.iter().enumerate() {
			println!("  Rule {}:", i + 1);
			println!("    pattern: {}", rule.pattern);
			println!("    channel: {}", rule.channel.as_str());
			if rule.ignore {
				println!("    ignore: true");
			}
			if let Some(ref replace) = rule.replace {
				println!("    replace: {}", replace);
			}
			println!();
		}
	}

	// Show user config path
	if let Ok(user_path) = user_config_path() {
		println!("User config path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	match smelt_cli::config::discover_configs(&cwd) {
		Ok(configs) => {
			if configs.is_empty() {
				println!("No configuration files found.");
			} else {
				println!("All configuration files are valid:");
				for loaded in &configs {
					println!(
						"  {} ({} rules)",
						loaded.path.display(),
						loaded.config.rules.len()
					);
				}
			}
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Configuration error: {}", e);
			Ok(ExitCode::FAILURE)
		}
	}
}

fn handle_completions(shell: Shell) -> Result<ExitCode> {
	let mut cmd = Cli::command();
	clap_complete::generate(shell, &mut cmd, "smelt", &mut std::io::stdout());
	Ok(ExitCode::SUCCESS)
}

fn handle_build(args: &[String], watch: bool) -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	// Load and merge config
	let config = load_merged_config(&cwd).context("Failed to load configuration")?;

	// Command line wins over the configured default
	let command: Vec<String> = if args.is_empty() {
		config.command.clone().unwrap_or_default()
	} else {
		args.to_vec()
	};
	let Some((program, program_args)) = command.split_first() else {
		anyhow::bail!("No build command: pass one to smelt or set `command` in .smelt.toml");
	};

	// Compile rules
	let rules = assemble_rules(&config, &cwd).context("Failed to compile rules")?;

	// A terminal ctrl-c signals the whole process group. Armed flags keep
	// the wrapper alive to drain the dying child and close out any open
	// diagnostic block before exiting.
	let interrupts = InterruptFlags::arm()?;

	let status = if watch {
		let paths = if config.watch.is_empty() {
			vec![cwd.clone()]
		} else {
			config.watch.clone()
		};
		run_watch(program, program_args, &cwd, &rules, &paths, interrupts)
			.with_context(|| format!("Failed to watch: {}", program))?
	} else {
		run_build(program, program_args, &cwd, &rules)
			.with_context(|| format!("Failed to execute: {}", program))?
	};

	Ok(ExitCode::from(status.exit_code() as u8))
}

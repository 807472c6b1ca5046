#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but replacement requires nightly

use predicates::prelude::*;
use std::fs;

fn smelt_cmd() -> assert_cmd::Command {
	assert_cmd::Command::cargo_bin("smelt").unwrap()
}

// ============================================================================
// CLI flag tests
// ============================================================================

#[test]
fn test_help_flag() {
	smelt_cmd()
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("wraps build commands"));
}

#[test]
fn test_version_flag() {
	smelt_cmd()
		.arg("--version")
		.assert()
		.success()
		.stdout(predicate::str::contains("smelt"));
}

#[test]
fn test_no_args_without_config_reports_missing_command() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("No build command"));
}

// ============================================================================
// --init tests
// ============================================================================

#[test]
fn test_init_creates_config() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join(".smelt.toml");

	smelt_cmd()
		.arg("--init")
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Created .smelt.toml"));

	assert!(config_path.exists());

	let content = fs::read_to_string(&config_path).unwrap();
	assert!(content.contains("root = true"));
	assert!(content.contains("[[rules]]"));
}

#[test]
fn test_init_fails_if_exists() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join(".smelt.toml");

	// Create existing file
	fs::write(&config_path, "# existing").unwrap();

	smelt_cmd()
		.arg("--init")
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_force_overwrites() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join(".smelt.toml");

	// Create existing file
	fs::write(&config_path, "# existing").unwrap();

	smelt_cmd()
		.args(["--init", "--force"])
		.current_dir(temp_dir.path())
		.assert()
		.success();

	let content = fs::read_to_string(&config_path).unwrap();
	assert!(content.contains("root = true"));
}

#[test]
fn test_init_template_is_valid_config() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.arg("--init")
		.current_dir(temp_dir.path())
		.assert()
		.success();

	smelt_cmd()
		.args(["config", "validate"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("valid"));
}

// ============================================================================
// config subcommand tests
// ============================================================================

#[test]
fn test_config_validate_no_config() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.args(["config", "validate"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("No configuration files found"));
}

#[test]
fn test_config_validate_valid_config() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join(".smelt.toml");

	fs::write(
		&config_path,
		r#"
root = true

[[rules]]
pattern = "^-- Found ([A-Z]+)$"
replace = "Found $1"
"#,
	)
	.unwrap();

	smelt_cmd()
		.args(["config", "validate"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("valid"));
}

#[test]
fn test_config_validate_invalid_toml() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join(".smelt.toml");

	fs::write(&config_path, "invalid toml [[[").unwrap();

	smelt_cmd()
		.args(["config", "validate"])
		.current_dir(temp_dir.path())
		.assert()
		.failure();
}

#[test]
fn test_config_validate_rejects_rule_with_both_actions() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join(".smelt.toml");

	fs::write(
		&config_path,
		r#"
root = true

[[rules]]
pattern = "^x"
ignore = true
replace = "y"
"#,
	)
	.unwrap();

	smelt_cmd()
		.args(["config", "validate"])
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("ignore and replace"));
}

#[test]
fn test_config_show_displays_config() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join(".smelt.toml");

	fs::write(
		&config_path,
		r#"
root = true
command = ["make", "-j4"]

[[rules]]
pattern = "^-- Found ([A-Z]+)$"
channel = "stdout"
replace = "Found $1"
"#,
	)
	.unwrap();

	smelt_cmd()
		.args(["config", "show"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("command: make -j4"))
		.stdout(predicate::str::contains("pattern: ^-- Found ([A-Z]+)$"))
		.stdout(predicate::str::contains("channel: stdout"))
		.stdout(predicate::str::contains("replace: Found $1"));
}

// ============================================================================
// completions subcommand tests
// ============================================================================

#[test]
fn test_completions_bash() {
	smelt_cmd()
		.args(["completions", "bash"])
		.assert()
		.success()
		.stdout(predicate::str::contains("_smelt"));
}

#[test]
fn test_completions_rejects_unknown_shell() {
	smelt_cmd()
		.args(["completions", "csh"])
		.assert()
		.failure();
}

// ============================================================================
// Command execution tests (Unix only - these use Unix commands)
// ============================================================================

#[test]
fn test_command_not_found() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.args(["smelt_nonexistent_command_12345"])
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("not found"));
}

#[cfg(unix)]
#[test]
fn test_run_simple_command() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.args(["echo", "hello world"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("hello world"));
}

#[cfg(unix)]
#[test]
fn test_output_ends_with_separator_line() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.args(["echo", "hello"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout("hello\n\n");
}

#[cfg(unix)]
#[test]
fn test_command_exit_code_propagates() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.args(["sh", "-c", "exit 42"])
		.current_dir(temp_dir.path())
		.assert()
		.code(42);
}

#[cfg(unix)]
#[test]
fn test_signal_death_maps_to_128_plus_signal() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.args(["sh", "-c", "kill -TERM $$"])
		.current_dir(temp_dir.path())
		.assert()
		.code(143);
}

#[cfg(unix)]
#[test]
fn test_configured_default_command() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join(".smelt.toml");

	fs::write(
		&config_path,
		r#"
root = true
command = ["echo", "configured-build"]
"#,
	)
	.unwrap();

	smelt_cmd()
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("configured-build"));
}

#[cfg(unix)]
#[test]
fn test_cli_command_overrides_config() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join(".smelt.toml");

	fs::write(
		&config_path,
		r#"
root = true
command = ["sh", "-c", "exit 7"]
"#,
	)
	.unwrap();

	smelt_cmd()
		.args(["echo", "direct"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("direct"));
}

// ============================================================================
// Output refinement tests (Unix only)
// ============================================================================

#[cfg(unix)]
#[test]
fn test_diagnostic_block_is_reformatted() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.args([
			"sh",
			"-c",
			"printf 'src/main.x:12:5: error: missing semicolon\\n    return x\\n           ^\\n' >&2",
		])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stderr(predicate::str::contains("● Error: missing semicolon"))
		.stderr(predicate::str::contains("    return x"))
		.stderr(predicate::str::contains("           ^"))
		.stderr(predicate::str::contains("at src/main.x:12"));
}

#[cfg(unix)]
#[test]
fn test_repeated_diagnostic_is_reported_once() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.args([
			"sh",
			"-c",
			"printf 'src/a.c:1:2: error: boom\\n  x\\n  ^\\nsrc/a.c:1:2: error: boom\\n  x\\n  ^\\ncontrol\\n' >&2",
		])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stderr(predicate::str::contains("● Error: boom").count(1))
		.stderr(predicate::str::contains("at src/a.c:1").count(1))
		.stderr(predicate::str::contains("control"));
}

#[cfg(unix)]
#[test]
fn test_progress_line_is_rewritten() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.args(["echo", "[ 50%] Building C object foo.c.o"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Compile foo.c.o"))
		.stdout(predicate::str::contains("[ 50%]").not());
}

#[cfg(unix)]
#[test]
fn test_bookkeeping_chatter_is_suppressed() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.args([
			"sh",
			"-c",
			"echo \"make[1]: Entering directory '/proj'\"; echo kept",
		])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("kept"))
		.stdout(predicate::str::contains("Entering").not());
}

#[cfg(unix)]
#[test]
fn test_configured_replace_rule_expands_captures() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join(".smelt.toml");

	fs::write(
		&config_path,
		r#"
root = true

[[rules]]
pattern = "^-- Found ([A-Z]+)$"
replace = "Found $1"
"#,
	)
	.unwrap();

	smelt_cmd()
		.args(["echo", "-- Found ZLIB"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Found ZLIB"))
		.stdout(predicate::str::contains("-- Found").not());
}

#[cfg(unix)]
#[test]
fn test_unrecognized_stderr_passes_through() {
	let temp_dir = tempfile::tempdir().unwrap();

	smelt_cmd()
		.args(["sh", "-c", "echo 'ld: library not found for -lfoo' >&2"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stderr(predicate::str::contains("ld: library not found for -lfoo"));
}

// ============================================================================
// Interrupt and watch-mode tests (Unix only)
// ============================================================================

/// Spawn smelt in its own process group, so a group signal hits the wrapper
/// and its child together the way a terminal delivers ctrl-c.
#[cfg(unix)]
fn spawn_in_own_group(args: &[&str], dir: &std::path::Path) -> std::process::Child {
	use std::os::unix::process::CommandExt;
	std::process::Command::new(env!("CARGO_BIN_EXE_smelt"))
		.args(args)
		.current_dir(dir)
		.process_group(0)
		.stdout(std::process::Stdio::piped())
		.stderr(std::process::Stdio::piped())
		.spawn()
		.unwrap()
}

#[cfg(unix)]
fn interrupt_group(pid: u32) {
	let status = std::process::Command::new("sh")
		.args(["-c", &format!("kill -s INT -- -{}", pid)])
		.status()
		.unwrap();
	assert!(status.success());
}

#[cfg(unix)]
#[test]
fn test_interrupted_run_still_finalizes_open_block() {
	use std::time::Duration;

	let temp_dir = tempfile::tempdir().unwrap();
	let child = spawn_in_own_group(
		&[
			"sh",
			"-c",
			"printf 'src/a.c:1:1: error: boom\\n    x\\n' >&2; sleep 5",
		],
		temp_dir.path(),
	);

	// Let the diagnostic header and code line land, then interrupt the
	// whole group mid-block.
	std::thread::sleep(Duration::from_millis(800));
	let pid = child.id();
	interrupt_group(pid);

	let output = child.wait_with_output().unwrap();
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("● Error: boom"), "stderr was: {stderr}");
	assert!(stderr.contains("at src/a.c:1"), "stderr was: {stderr}");
	assert_eq!(output.status.code(), Some(130));
}

#[cfg(unix)]
#[test]
fn test_watch_reruns_after_change_then_interrupt_stops_it() {
	use std::time::Duration;

	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(temp_dir.path().join("main.c"), "int main() {}\n").unwrap();

	let child = spawn_in_own_group(&["-w", "echo", "build-pass"], temp_dir.path());

	// First run completes, then a source change forces a second one.
	std::thread::sleep(Duration::from_millis(1000));
	fs::write(temp_dir.path().join("main.c"), "int main() { return 1; }\n").unwrap();
	std::thread::sleep(Duration::from_millis(1200));

	let pid = child.id();
	interrupt_group(pid);

	let output = child.wait_with_output().unwrap();
	let stdout = String::from_utf8_lossy(&output.stdout);
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert_eq!(
		stdout.matches("build-pass").count(),
		2,
		"stdout was: {stdout}"
	);
	assert!(stderr.contains("watching for changes"), "stderr was: {stderr}");
	assert!(
		stderr.contains("restarting due to changes"),
		"stderr was: {stderr}"
	);
	assert_eq!(output.status.code(), Some(130));
}

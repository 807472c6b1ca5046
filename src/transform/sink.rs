use std::io::Write;

/// Destination for transformed output lines.
///
/// Implementations must make each line visible immediately: a wrapped build
/// can run for minutes, and the point of streaming transformation is that
/// progress stays live while it does.
pub trait Sink {
	/// Write one line, newline-terminated.
	fn emit_line(&mut self, line: &str);
}

/// Writes newline-terminated lines to a stream, flushing after each one.
///
/// Write failures are ignored; once the consumer of our output is gone there
/// is nowhere left to report them.
pub struct WriteSink<W: Write> {
	writer: W,
}

impl WriteSink<std::io::Stdout> {
	pub fn stdout() -> Self {
		WriteSink {
			writer: std::io::stdout(),
		}
	}
}

impl WriteSink<std::io::Stderr> {
	pub fn stderr() -> Self {
		WriteSink {
			writer: std::io::stderr(),
		}
	}
}

impl<W: Write> Sink for WriteSink<W> {
	fn emit_line(&mut self, line: &str) {
		let _ = writeln!(self.writer, "{}", line);
		let _ = self.writer.flush();
	}
}

/// Swallows everything. Duplicate diagnostics are driven through their full
/// state machine with this as the destination, so the block is consumed but
/// nothing is shown.
pub struct NullSink;

impl Sink for NullSink {
	fn emit_line(&mut self, _line: &str) {}
}

/// Collects emitted lines in memory so tests can assert on exact output.
#[cfg(test)]
pub struct MemorySink {
	pub lines: Vec<String>,
}

#[cfg(test)]
impl MemorySink {
	pub fn new() -> Self {
		MemorySink { lines: Vec::new() }
	}

	/// The collected output as it would appear on the stream.
	pub fn text(&self) -> String {
		self.lines
			.iter()
			.map(|line| format!("{}\n", line))
			.collect()
	}
}

#[cfg(test)]
impl Sink for MemorySink {
	fn emit_line(&mut self, line: &str) {
		self.lines.push(line.to_string());
	}
}

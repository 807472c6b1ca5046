use crate::transform::dedup::DedupStore;
use crate::transform::pattern::Channel;
use crate::transform::response::{FeedResult, Response};
use crate::transform::rules::{Action, RuleSet};
use crate::transform::sink::{NullSink, Sink};
use std::io::{BufRead, BufReader, Read};
use tracing::debug;

/// A response being driven over a channel, with its destination fixed at
/// creation: duplicates keep consuming their block but write into a null
/// sink instead of the channel's real one.
struct ActiveResponse {
	response: Box<dyn Response>,
	muted: bool,
	null: NullSink,
}

impl ActiveResponse {
	fn new(response: Box<dyn Response>, muted: bool) -> Self {
		ActiveResponse {
			response,
			muted,
			null: NullSink,
		}
	}

	fn open(&mut self, sink: &mut dyn Sink) {
		if self.muted {
			self.response.open(&mut self.null);
		} else {
			self.response.open(sink);
		}
	}

	fn feed(&mut self, line: &str, sink: &mut dyn Sink) -> FeedResult {
		if self.muted {
			self.response.feed(line, &mut self.null)
		} else {
			self.response.feed(line, sink)
		}
	}

	fn finish(&mut self, sink: &mut dyn Sink) {
		if self.muted {
			self.response.finish(&mut self.null);
		} else {
			self.response.finish(sink);
		}
	}
}

/// Read one line, stripping the `\n` (and a preceding `\r`) terminator.
/// Invalid UTF-8 degrades to replacement characters rather than an error;
/// build tools occasionally emit raw bytes mid-stream.
fn next_line<R: BufRead>(reader: &mut R) -> Option<String> {
	let mut buf = Vec::new();
	match reader.read_until(b'\n', &mut buf) {
		Ok(0) => None,
		Ok(_) => {
			if buf.last() == Some(&b'\n') {
				buf.pop();
			}
			if buf.last() == Some(&b'\r') {
				buf.pop();
			}
			Some(String::from_utf8_lossy(&buf).into_owned())
		}
		Err(_) => None,
	}
}

/// Apply the active response or the rule table to one line.
fn process_line(
	line: &str,
	channel: Channel,
	rules: &RuleSet,
	dedup: &DedupStore,
	sink: &mut dyn Sink,
	active: &mut Option<ActiveResponse>,
) {
	if let Some(mut current) = active.take() {
		match current.feed(line, sink) {
			FeedResult::Consumed => {
				*active = Some(current);
				return;
			}
			FeedResult::Rejected => {
				// The block ended here; close it out, then reprocess the
				// rejected line as a fresh one.
				current.finish(sink);
			}
		}
	}

	match rules.classify(line, channel, dedup) {
		Action::Passthrough => sink.emit_line(line),
		Action::Suppress => {}
		Action::Substitute(text) => sink.emit_line(&text),
		Action::Begin {
			response,
			duplicate,
		} => {
			if duplicate {
				debug!("suppressing duplicate diagnostic");
			}
			let mut current = ActiveResponse::new(response, duplicate);
			current.open(sink);
			*active = Some(current);
		}
	}
}

/// Drain one channel through the rule table until it closes. A response
/// still active at closure is finalized, so a block cut short by a dying
/// process keeps its closing output.
fn drive_channel<R: BufRead>(
	mut reader: R,
	channel: Channel,
	rules: &RuleSet,
	dedup: &DedupStore,
	sink: &mut dyn Sink,
) {
	let mut active: Option<ActiveResponse> = None;

	while let Some(line) = next_line(&mut reader) {
		process_line(&line, channel, rules, dedup, sink, &mut active);
	}

	if let Some(mut current) = active.take() {
		current.finish(sink);
	}
}

/// Drives both output channels of a running build through one rule set.
///
/// Channel state (the active response) is channel-local; the dedup store is
/// the only state shared between the two workers. One router instance covers
/// exactly one build invocation; the next run gets a fresh one.
pub struct Router<'a> {
	rules: &'a RuleSet,
	dedup: DedupStore,
}

impl<'a> Router<'a> {
	pub fn new(rules: &'a RuleSet) -> Self {
		Router {
			rules,
			dedup: DedupStore::new(),
		}
	}

	/// Transform both channels to their sinks until the source closes.
	///
	/// The stderr channel runs on its own thread while the calling thread
	/// drains stdout; each produced line is written and flushed immediately.
	/// Once both channels are done, a trailing separator line goes to the
	/// stdout sink.
	pub fn run<O, E>(
		&self,
		stdout: O,
		stderr: E,
		out_sink: &mut (dyn Sink + Send),
		err_sink: &mut (dyn Sink + Send),
	) where
		O: Read + Send,
		E: Read + Send,
	{
		std::thread::scope(|scope| {
			let worker = scope.spawn(|| {
				drive_channel(
					BufReader::new(stderr),
					Channel::Stderr,
					self.rules,
					&self.dedup,
					err_sink,
				);
			});

			drive_channel(
				BufReader::new(stdout),
				Channel::Stdout,
				self.rules,
				&self.dedup,
				out_sink,
			);

			// Re-raise a worker panic; joining quietly would let the run
			// report the child's status as if nothing went wrong.
			if let Err(panic) = worker.join() {
				std::panic::resume_unwind(panic);
			}
		});

		out_sink.emit_line("");
	}
}

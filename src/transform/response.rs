use crate::transform::sink::Sink;

/// Outcome of feeding one line to an active [`Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedResult {
	/// The response consumed the line; keep feeding it.
	Consumed,

	/// The line doesn't belong to the block. The response is done and the
	/// router must reprocess this line as a fresh, unconsumed one.
	Rejected,
}

/// A stateful multi-line consumer created when a register rule matches.
///
/// The router drives exactly one response per channel at a time: `open` once
/// with the sink, then `feed` for each subsequent line until the response
/// rejects one, then `finish`. Channel closure with a response still active
/// skips straight to `finish`, so a block cut short by a dying process still
/// gets its closing output.
///
/// Responses never pick their own destination. The router passes the
/// channel's real sink for a first sighting and a null sink for a duplicate,
/// which keeps the state machine advancing over the block either way.
pub trait Response {
	/// Render any leading output for the line that created the response.
	fn open(&mut self, sink: &mut dyn Sink);

	/// Offer the next line from the same channel.
	fn feed(&mut self, line: &str, sink: &mut dyn Sink) -> FeedResult;

	/// Render any closing output. Called exactly once, after rejection or at
	/// end of channel.
	fn finish(&mut self, sink: &mut dyn Sink);
}

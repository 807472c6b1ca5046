use std::collections::HashSet;
use std::sync::Mutex;

/// Identity of one diagnostic: which register rule matched and what it
/// captured. Two matches with equal keys describe the same diagnostic even
/// when separate compiles emit it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
	rule: usize,
	captures: Vec<String>,
}

impl MatchKey {
	pub fn new(rule: usize, captures: &[String]) -> Self {
		MatchKey {
			rule,
			captures: captures.to_vec(),
		}
	}
}

/// Per-invocation memory of diagnostics already rendered.
///
/// Shared by both channel workers. The mutex makes the membership test and
/// the insertion one atomic step, so the same diagnostic arriving on both
/// channels at once still renders exactly once. Grows monotonically for the
/// lifetime of one run and is dropped with it.
#[derive(Debug, Default)]
pub struct DedupStore {
	seen: Mutex<HashSet<MatchKey>>,
}

impl DedupStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record `key` and report whether this is its first sighting.
	pub fn first_sighting(&self, key: MatchKey) -> bool {
		self.seen
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.insert(key)
	}
}

//! The line transformation engine.
//!
//! This module handles:
//! - Channel-aware pattern matching with typed captures
//! - Ordered ignore/replace/register rule tables
//! - Multi-line responses that claim and reshape whole blocks
//! - Duplicate suppression shared across both channels
//! - Concurrent routing of a child's stdout and stderr

pub mod dedup;
pub mod pattern;
pub mod response;
pub mod router;
pub mod rules;
pub mod sink;

pub use dedup::{DedupStore, MatchKey};
pub use pattern::{CaptureKind, Channel, ChannelFilter, LineMatch, Pattern};
pub use response::{FeedResult, Response};
pub use router::Router;
pub use rules::{Action, RuleSet};
pub use sink::{NullSink, Sink, WriteSink};

//! Landmark sources: where hand frames come from each tick.
//!
//! The detector itself is external. A [`LandmarkSource`] is polled once per
//! tick and reports either a frame or why there is none; "not ready" and
//! "no hand" are normal outcomes, not errors.
//!
//! Recordings are JSON lines of [`FeedEvent`]s:
//!
//! ```text
//! {"type":"frame","landmarks":[{"x":0.5,"y":0.4}, ...],"timestamp_ms":16}
//! {"type":"no_hand","timestamp_ms":33}
//! {"type":"action","action":"add_page"}
//! ```

use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::landmark::HandFrame;
use crate::{ScribeError, ScribeResult};

/// Result of polling a source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePoll {
    /// Detector or video not ready; retry next tick.
    NotReady,
    /// Frame processed, no hand in it.
    NoHand {
        /// Capture timestamp in milliseconds.
        timestamp_ms: u64,
    },
    /// A hand was detected.
    Hand(HandFrame),
    /// The source will never produce anything again.
    Exhausted,
}

/// A document-level user action, replayed alongside frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedAction {
    /// Append a page and switch to it.
    AddPage,
    /// Switch to the following page.
    NextPage,
    /// Switch to the preceding page.
    PreviousPage,
    /// Delete the current page.
    DeletePage,
    /// Remove every stroke from the current page.
    ClearPage,
    /// Set the current page background.
    SetBackground {
        /// Image source.
        uri: String,
    },
    /// Remove the current page background.
    RemoveBackground,
}

/// One line of a landmark recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// Detector not ready at this point of the recording.
    NotReady,
    /// A detected hand.
    Frame(HandFrame),
    /// A processed frame without a hand.
    NoHand {
        /// Capture timestamp in milliseconds.
        timestamp_ms: u64,
    },
    /// A user action between frames.
    Action {
        /// The action.
        action: FeedAction,
    },
}

/// Per-tick provider of hand frames.
pub trait LandmarkSource {
    /// Whether the detector has finished initializing.
    fn is_ready(&self) -> bool;

    /// Poll for the frame of this tick.
    ///
    /// Live sources stamp frames with `timestamp_ms`; recorded sources keep
    /// their own timestamps.
    fn poll(&mut self, timestamp_ms: u64) -> SourcePoll;

    /// User actions that arrived before the last polled frame.
    fn drain_actions(&mut self) -> Vec<FeedAction> {
        Vec::new()
    }
}

/// In-memory source returning a fixed sequence of polls.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    polls: VecDeque<SourcePoll>,
    warmup: usize,
}

impl ScriptedSource {
    /// Create a source that yields `polls` in order, then [`SourcePoll::Exhausted`].
    #[must_use]
    pub fn new(polls: impl IntoIterator<Item = SourcePoll>) -> Self {
        Self {
            polls: polls.into_iter().collect(),
            warmup: 0,
        }
    }

    /// Create a source yielding one hand frame per poll.
    #[must_use]
    pub fn from_frames(frames: impl IntoIterator<Item = HandFrame>) -> Self {
        Self::new(frames.into_iter().map(SourcePoll::Hand))
    }

    /// Report not-ready for the first `polls` polls.
    #[must_use]
    pub const fn with_warmup(mut self, polls: usize) -> Self {
        self.warmup = polls;
        self
    }

    /// Polls still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.polls.len()
    }
}

impl LandmarkSource for ScriptedSource {
    fn is_ready(&self) -> bool {
        self.warmup == 0
    }

    fn poll(&mut self, _timestamp_ms: u64) -> SourcePoll {
        if self.warmup > 0 {
            self.warmup -= 1;
            return SourcePoll::NotReady;
        }
        self.polls.pop_front().unwrap_or(SourcePoll::Exhausted)
    }
}

/// Source replaying a JSON-lines recording.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    events: VecDeque<FeedEvent>,
    pending: Vec<FeedAction>,
}

impl ReplaySource {
    /// Create a source from parsed events.
    #[must_use]
    pub fn new(events: impl IntoIterator<Item = FeedEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            pending: Vec::new(),
        }
    }

    /// Parse a JSON-lines recording. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::InvalidFeed`] with the one-based line number of
    /// the first malformed line.
    pub fn from_jsonl(contents: &str) -> ScribeResult<Self> {
        let mut events = VecDeque::new();
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let event = serde_json::from_str(line).map_err(|e| ScribeError::InvalidFeed {
                line: index + 1,
                reason: e.to_string(),
            })?;
            events.push_back(event);
        }
        tracing::debug!(events = events.len(), "Recording parsed");
        Ok(Self {
            events,
            pending: Vec::new(),
        })
    }

    /// Read and parse a recording file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> ScribeResult<Self> {
        Self::from_jsonl(&std::fs::read_to_string(path)?)
    }

    /// Events not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl LandmarkSource for ReplaySource {
    fn is_ready(&self) -> bool {
        !matches!(self.events.front(), Some(FeedEvent::NotReady))
    }

    fn poll(&mut self, _timestamp_ms: u64) -> SourcePoll {
        while let Some(event) = self.events.pop_front() {
            match event {
                FeedEvent::Action { action } => self.pending.push(action),
                FeedEvent::NotReady => return SourcePoll::NotReady,
                FeedEvent::NoHand { timestamp_ms } => return SourcePoll::NoHand { timestamp_ms },
                FeedEvent::Frame(frame) => return SourcePoll::Hand(frame),
            }
        }
        SourcePoll::Exhausted
    }

    fn drain_actions(&mut self) -> Vec<FeedAction> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING: &str = r#"
{"type":"not_ready"}
{"type":"frame","landmarks":[{"x":0.5,"y":0.4,"z":0.0}],"timestamp_ms":16}
{"type":"action","action":"add_page"}
{"type":"action","action":{"set_background":{"uri":"bg.png"}}}
{"type":"no_hand","timestamp_ms":33}
{"type":"action","action":"clear_page"}
"#;

    #[test]
    fn test_replay_mixed_lines() {
        let mut source = ReplaySource::from_jsonl(RECORDING).expect("parse");
        assert_eq!(source.remaining(), 6);
        assert!(!source.is_ready());

        assert_eq!(source.poll(0), SourcePoll::NotReady);
        assert!(source.is_ready());
        let SourcePoll::Hand(frame) = source.poll(0) else {
            panic!("expected a frame");
        };
        assert_eq!(frame.timestamp_ms, 16);
        assert!(source.drain_actions().is_empty());

        assert_eq!(source.poll(0), SourcePoll::NoHand { timestamp_ms: 33 });
        assert_eq!(
            source.drain_actions(),
            vec![
                FeedAction::AddPage,
                FeedAction::SetBackground {
                    uri: "bg.png".to_string()
                }
            ]
        );

        assert_eq!(source.poll(0), SourcePoll::Exhausted);
        assert_eq!(source.drain_actions(), vec![FeedAction::ClearPage]);
        assert_eq!(source.poll(0), SourcePoll::Exhausted);
    }

    #[test]
    fn test_replay_reports_bad_line() {
        let err = ReplaySource::from_jsonl("{\"type\":\"no_hand\",\"timestamp_ms\":1}\n{oops}\n")
            .expect_err("should fail");
        assert!(matches!(err, ScribeError::InvalidFeed { line: 2, .. }));
    }

    #[test]
    fn test_scripted_warmup() {
        let mut source =
            ScriptedSource::new([SourcePoll::NoHand { timestamp_ms: 5 }]).with_warmup(2);
        assert!(!source.is_ready());
        assert_eq!(source.poll(0), SourcePoll::NotReady);
        assert_eq!(source.poll(0), SourcePoll::NotReady);
        assert!(source.is_ready());
        assert_eq!(source.poll(0), SourcePoll::NoHand { timestamp_ms: 5 });
        assert_eq!(source.remaining(), 0);
        assert_eq!(source.poll(0), SourcePoll::Exhausted);
    }

    #[test]
    fn test_event_serialization_shape() {
        let json = serde_json::to_string(&FeedEvent::Action {
            action: FeedAction::DeletePage,
        })
        .expect("serialize");
        assert_eq!(json, r#"{"type":"action","action":"delete_page"}"#);
    }
}

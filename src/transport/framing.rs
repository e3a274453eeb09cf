// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Wire framing: splitting outbound messages and reassembling inbound
//! frames.
//!
//! The wire rule is bit-exact and inherited from the server protocol:
//!
//! - A serialized message at or under the per-frame byte cap goes out as a
//!   single frame with no header.
//! - A larger message goes out as N segments split at the cap, preceded by
//!   one frame holding the decimal segment count `N`. There is no delimiter;
//!   reassembly is concatenation in arrival order.
//! - When not mid-assembly, a received frame of at most
//!   [`MAX_FRAME_COUNT_CHARS`] characters that parses as a decimal integer
//!   is a count header. This means a short numeric-looking single-frame
//!   message *will* be misread as a header. The ambiguity is part of the
//!   wire protocol; changing it here would break compatibility, so it is
//!   preserved as-is. In practice application messages are JSON objects and
//!   never look numeric.
//! - The keepalive frame is the literal `"0"`, sent only while idle, and is
//!   special-cased as a no-op on receive rather than a zero-frame message.

/// Longest frame-count header the server may send (decimal characters).
pub const MAX_FRAME_COUNT_CHARS: usize = 6;

/// The idle no-op frame.
pub const KEEPALIVE_FRAME: &str = "0";

/// Split a serialized message at the byte cap. Split points back off to the
/// nearest UTF-8 character boundary, so ASCII payloads split at exactly the
/// cap and no segment ever exceeds it.
#[must_use]
pub fn split_frames(message: &str, max_bytes: usize) -> Vec<&str> {
    assert!(max_bytes >= 4, "frame cap must fit any UTF-8 character");
    if message.is_empty() {
        return vec![""];
    }
    let mut segments = Vec::with_capacity(message.len() / max_bytes + 1);
    let mut rest = message;
    while !rest.is_empty() {
        let mut cut = max_bytes.min(rest.len());
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (segment, tail) = rest.split_at(cut);
        segments.push(segment);
        rest = tail;
    }
    segments
}

/// The full outbound frame sequence for a message: the segments from
/// [`split_frames`], prefixed with a count header when there is more than
/// one.
#[must_use]
pub fn frames_for_message(message: &str, max_bytes: usize) -> Vec<String> {
    let segments = split_frames(message, max_bytes);
    let mut frames = Vec::with_capacity(segments.len() + 1);
    if segments.len() > 1 {
        frames.push(segments.len().to_string());
    }
    frames.extend(segments.into_iter().map(str::to_string));
    frames
}

/// What one inbound frame amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Frame consumed; a multi-frame message is still being buffered.
    Buffering,
    /// A complete raw message payload, ready to parse.
    Complete(String),
    /// The idle no-op frame; nothing to deliver.
    KeepAlive,
}

/// Reassembles inbound frames into complete message payloads.
///
/// Not mid-assembly: a short numeric frame starts buffering that many
/// frames; anything else is a complete one-frame message. Mid-assembly:
/// every frame is appended until the expected count is reached.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    /// `None` when not mid-assembly.
    frames: Option<Vec<String>>,
    expected: usize,
}

impl FrameAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a multi-frame message is being buffered.
    #[must_use]
    pub fn is_buffering(&self) -> bool {
        self.frames.is_some()
    }

    /// Feed one inbound frame.
    pub fn ingest(&mut self, data: &str) -> FrameOutcome {
        if let Some(buffered) = self.frames.as_mut() {
            buffered.push(data.to_string());
            if buffered.len() < self.expected {
                return FrameOutcome::Buffering;
            }
            let full = self.frames.take().expect("buffer present").concat();
            return FrameOutcome::Complete(full);
        }

        if data == KEEPALIVE_FRAME {
            return FrameOutcome::KeepAlive;
        }
        if data.len() <= MAX_FRAME_COUNT_CHARS {
            if let Ok(count) = data.parse::<usize>() {
                // A parsed count of zero only arises from a degenerate
                // keepalive variant ("00" etc.); treat it as a no-op too.
                if count == 0 {
                    return FrameOutcome::KeepAlive;
                }
                self.frames = Some(Vec::with_capacity(count));
                self.expected = count;
                return FrameOutcome::Buffering;
            }
        }
        FrameOutcome::Complete(data.to_string())
    }
}

// src/core/storage/stream.rs

//! The stream submodel: ids, id generation, entries, and the ordered entry log.

use crate::core::CitrineError;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

// --- Stream ID ---

/// A stream entry id: a millisecond timestamp plus a sequence number,
/// totally ordered as the pair `(ms, seq)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Default)]
pub struct StreamId {
    pub ms: u64,
    pub seq: u64,
}

impl StreamId {
    pub fn new(ms: u64, seq: u64) -> Self {
        Self { ms, seq }
    }

    /// The smallest addressable id, i.e. what `-` resolves to in XRANGE.
    /// `0-0` itself is never a legal entry id.
    pub const MIN: StreamId = StreamId { ms: 0, seq: 1 };

    /// The largest addressable id, i.e. what `+` resolves to in XRANGE.
    pub const MAX: StreamId = StreamId {
        ms: u64::MAX,
        seq: u64::MAX,
    };
}

impl FromStr for StreamId {
    type Err = CitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            None => {
                let ms = s.parse().map_err(|_| CitrineError::InvalidStreamId)?;
                Ok(StreamId::new(ms, 0))
            }
            Some((ms_part, seq_part)) => {
                let ms = ms_part.parse().map_err(|_| CitrineError::InvalidStreamId)?;
                let seq = seq_part.parse().map_err(|_| CitrineError::InvalidStreamId)?;
                Ok(StreamId::new(ms, seq))
            }
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

/// The id argument of an XADD, which may leave one or both parts for the
/// server to generate. Parsing is pure; resolution against the stream's tail
/// and the wall clock happens inside [`Stream::add_entry`], under the
/// keyspace lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamIdSpec {
    /// `*`: both parts are generated.
    Auto,
    /// `ms-*`: the timestamp is given, the sequence is generated.
    AutoSeq { ms: u64 },
    /// `ms-seq`: a fully explicit id.
    Explicit(StreamId),
}

impl FromStr for StreamIdSpec {
    type Err = CitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            return Ok(StreamIdSpec::Auto);
        }
        if let Some((ms_part, "*")) = s.split_once('-') {
            let ms = ms_part.parse().map_err(|_| CitrineError::InvalidStreamId)?;
            return Ok(StreamIdSpec::AutoSeq { ms });
        }
        s.parse::<StreamId>().map(StreamIdSpec::Explicit)
    }
}

// --- Stream Entry ---

/// A single stream entry: its id plus the flat field/value pair list.
/// Pairs are kept as a `Vec` so duplicate field names survive verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub id: StreamId,
    pub fields: Vec<(Bytes, Bytes)>,
}

// --- Main Stream Struct ---

/// The append-only entry log of a stream key. `entries` is strictly
/// increasing by id; `last_id` is the id of the most recently appended entry
/// (`0-0` for a stream that has never seen one).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stream {
    pub entries: BTreeMap<StreamId, StreamEntry>,
    pub last_id: StreamId,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the id spec against the current tail and appends the entry.
    ///
    /// Resolution happens here, after observing any existing entries, so that
    /// clock reads and tail reads sit in the same critical section as the
    /// append itself.
    pub fn add_entry(
        &mut self,
        id_spec: StreamIdSpec,
        fields: Vec<(Bytes, Bytes)>,
    ) -> Result<StreamId, CitrineError> {
        let new_id = match id_spec {
            StreamIdSpec::Explicit(id) => {
                if id == StreamId::new(0, 0) {
                    return Err(CitrineError::StreamIdZero);
                }
                id
            }
            StreamIdSpec::AutoSeq { ms } => {
                let seq = if ms == self.last_id.ms {
                    self.last_id.seq + 1
                } else {
                    0
                };
                StreamId::new(ms, seq)
            }
            StreamIdSpec::Auto => {
                let mut ms = now_unix_ms();
                // A backwards clock step must not break monotonicity.
                if ms < self.last_id.ms {
                    ms = self.last_id.ms;
                }
                let seq = if ms == self.last_id.ms {
                    self.last_id.seq + 1
                } else {
                    0
                };
                StreamId::new(ms, seq)
            }
        };

        if new_id <= self.last_id {
            return Err(CitrineError::StreamIdTooSmall);
        }

        self.entries.insert(new_id, StreamEntry { id: new_id, fields });
        self.last_id = new_id;
        Ok(new_id)
    }

    /// All entries with `start <= id <= end`, in id order.
    pub fn range(&self, start: StreamId, end: StreamId) -> Vec<StreamEntry> {
        if start > end {
            return Vec::new();
        }
        self.entries
            .range((Bound::Included(start), Bound::Included(end)))
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    /// All entries strictly newer than `watermark`, in id order.
    pub fn entries_after(&self, watermark: StreamId) -> Vec<StreamEntry> {
        self.entries
            .range((Bound::Excluded(watermark), Bound::Unbounded))
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

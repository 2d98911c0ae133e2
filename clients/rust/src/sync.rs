//! Client side rules that keep a viewer consistent with the server:
//! self echo suppression, superseded fetches and stale mutation responses.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use studio_booking_domain::{SyncFrame, SyncMessage, SyncMessageType};

/// Locally generated identifier attached to every mutation of a client
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a viewer should do about a live sync message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncAction {
    /// Fetch the visible window again
    Refetch,
    /// Show the new number of viewers
    ViewerCount(usize),
    Ignore,
}

/// Updates caused by the client itself are skipped, it already shows the result
pub fn react_to(message: &SyncMessage, own: &ConnectionId) -> SyncAction {
    match message.kind {
        SyncMessageType::Update => match &message.connection_id {
            Some(origin) if origin == own.as_str() => SyncAction::Ignore,
            _ => SyncAction::Refetch,
        },
        SyncMessageType::Viewers => match message.count {
            Some(count) => SyncAction::ViewerCount(count),
            None => SyncAction::Ignore,
        },
        SyncMessageType::Connected => SyncAction::Ignore,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchTicket(u64);

/// Only the most recently started fetch may deliver its result
#[derive(Debug, Default)]
pub struct FetchSequencer {
    latest: AtomicU64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: FetchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// `None` if a newer fetch was started in the meantime
    pub fn accept<T>(&self, ticket: FetchTicket, value: T) -> Option<T> {
        if self.is_latest(ticket) {
            Some(value)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationTicket {
    definition_id: i64,
    sequence: u64,
}

/// Remembers the last mutation started per booking. A response for an older
/// mutation on the same booking is stale.
#[derive(Debug, Default)]
pub struct MutationTracker {
    sequence: AtomicU64,
    latest: Mutex<HashMap<i64, u64>>,
}

impl MutationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, definition_id: i64) -> MutationTicket {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(definition_id, sequence);
        MutationTicket {
            definition_id,
            sequence,
        }
    }

    pub fn is_current(&self, ticket: MutationTicket) -> bool {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ticket.definition_id)
            == Some(&ticket.sequence)
    }

    /// `None` if a newer mutation on the same booking was started in the meantime
    pub fn accept<T>(&self, ticket: MutationTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            None
        }
    }
}

/// Splits a server sent event byte stream into frames
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a chunk and returns every frame that is complete now
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SyncFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(end) = find_block_end(&self.buffer) {
            let block = self.buffer.drain(..end.1).collect::<Vec<_>>();
            let block = String::from_utf8_lossy(&block[..end.0]);
            if let Some(frame) = SyncFrame::parse(&block) {
                frames.push(frame);
            }
        }
        frames
    }
}

/// Position of the first blank line as `(block end, separator end)`
fn find_block_end(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|i| (i, i + 2));
    let crlf = buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| (i, i + 4));
    match (lf, crlf) {
        (Some(lf), Some(crlf)) => Some(if lf.0 < crlf.0 { lf } else { crlf }),
        (lf, crlf) => lf.or(crlf),
    }
}

//! Result delivery for browse operations.
//!
//! A browse never returns its entries directly: they are pushed one by one
//! into a [`BrowseSink`] as [`BrowseEvent`]s. Every event carries the number
//! of entries still to come, and the listing ends with exactly one terminal
//! event:
//!
//! - the last `Entry` (its `remaining` is `0`),
//! - `Done` when the listing is empty,
//! - `Failed` when the listing could not be produced.
//!
//! [`Emitter`] is the single-shot guard sources use to honour these rules.

use crate::{MediaEntry, Result, SourceError};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One delivery to a browse caller
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseEvent {
    /// An entry, followed by `remaining` more entries
    Entry { entry: MediaEntry, remaining: usize },
    /// Terminal signal of an empty listing
    Done,
    /// Terminal failure, no entries precede it
    Failed(SourceError),
}

impl BrowseEvent {
    /// Returns `true` if nothing may follow this event
    pub fn is_terminal(&self) -> bool {
        match self {
            BrowseEvent::Entry { remaining, .. } => *remaining == 0,
            BrowseEvent::Done | BrowseEvent::Failed(_) => true,
        }
    }

    pub fn remaining(&self) -> usize {
        match self {
            BrowseEvent::Entry { remaining, .. } => *remaining,
            _ => 0,
        }
    }

    pub fn entry(&self) -> Option<&MediaEntry> {
        match self {
            BrowseEvent::Entry { entry, .. } => Some(entry),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SourceError> {
        match self {
            BrowseEvent::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Receiver of browse events
pub trait BrowseSink: Send {
    fn emit(&mut self, event: BrowseEvent);
}

impl BrowseSink for Vec<BrowseEvent> {
    fn emit(&mut self, event: BrowseEvent) {
        self.push(event);
    }
}

impl BrowseSink for UnboundedSender<BrowseEvent> {
    fn emit(&mut self, event: BrowseEvent) {
        // A closed receiver means the caller went away
        if self.send(event).is_err() {
            debug!("Browse receiver dropped, event discarded");
        }
    }
}

/// Adapts a closure into a [`BrowseSink`]
pub struct FnSink<F>(pub F);

impl<F> BrowseSink for FnSink<F>
where
    F: FnMut(BrowseEvent) + Send,
{
    fn emit(&mut self, event: BrowseEvent) {
        (self.0)(event)
    }
}

/// Folds a complete event sequence into the listed entries.
///
/// Fails with the delivered error, or with a `BrowseError` when the sequence
/// never reached a terminal event.
pub fn events_into_result(events: Vec<BrowseEvent>) -> Result<Vec<MediaEntry>> {
    let mut entries = Vec::with_capacity(events.len());
    let mut terminated = false;

    for event in events {
        if terminated {
            return Err(SourceError::BrowseError(
                "event delivered after the terminal event".to_string(),
            ));
        }
        terminated = event.is_terminal();
        match event {
            BrowseEvent::Entry { entry, .. } => entries.push(entry),
            BrowseEvent::Done => {}
            BrowseEvent::Failed(err) => return Err(err),
        }
    }

    if !terminated {
        return Err(SourceError::BrowseError(
            "listing ended without a terminal event".to_string(),
        ));
    }
    Ok(entries)
}

/// Single-shot delivery guard bound to one browse request.
///
/// Once a terminal event went out, or once the request's token is
/// cancelled, the emitter stays silent.
pub struct Emitter<'a> {
    sink: &'a mut dyn BrowseSink,
    cancel: CancellationToken,
    delivered: usize,
    finished: bool,
}

impl<'a> Emitter<'a> {
    pub fn new(sink: &'a mut dyn BrowseSink, cancel: CancellationToken) -> Self {
        Self {
            sink,
            cancel,
            delivered: 0,
            finished: false,
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns `true` once no further event can be delivered
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of events handed to the sink so far
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Delivers a whole listing in order, counting `remaining` down to `0`.
    ///
    /// An empty listing is signalled with a single `Done`. Returns `true`
    /// when the terminal event reached the sink.
    pub fn emit_all(&mut self, entries: Vec<MediaEntry>) -> bool {
        if entries.is_empty() {
            return self.deliver(BrowseEvent::Done);
        }

        let total = entries.len();
        for (index, entry) in entries.into_iter().enumerate() {
            let remaining = total - index - 1;
            if !self.deliver(BrowseEvent::Entry { entry, remaining }) {
                return false;
            }
        }
        true
    }

    /// Delivers a terminal failure
    pub fn fail(&mut self, error: SourceError) -> bool {
        self.deliver(BrowseEvent::Failed(error))
    }

    /// Closes the emitter without telling the sink anything
    pub fn abandon(&mut self) {
        self.finished = true;
    }

    fn deliver(&mut self, event: BrowseEvent) -> bool {
        if self.finished {
            warn!("Browse event after terminal signal dropped");
            return false;
        }
        if self.cancel.is_cancelled() {
            debug!("Browse cancelled, suppressing delivery");
            self.finished = true;
            return false;
        }

        let terminal = event.is_terminal();
        self.sink.emit(event);
        self.delivered += 1;
        if terminal {
            self.finished = true;
        }
        true
    }
}

//! Per-call browse request and its fetch state machine.
//!
//! ```text
//! Idle -> ProxyOpening -> Fetching -> Emitting -> Done
//!              |              |
//!              +--> Error <---+
//! ```
//!
//! Cancellation moves any non-terminal state straight to `Done` without
//! telling the sink. Once `Done` or `Error` is reached the request refuses
//! any further work.

use crate::error::Error;
use pmosource::{BrowseSink, Emitter, MediaEntry, SourceError};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    Idle,
    ProxyOpening,
    Fetching,
    Emitting,
    Done,
    Error,
}

impl FetchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FetchState::Done | FetchState::Error)
    }

    /// Returns `true` if `self -> next` is a legal step
    pub fn can_advance_to(self, next: FetchState) -> bool {
        use FetchState::*;
        matches!(
            (self, next),
            (Idle, ProxyOpening)
                | (ProxyOpening, Fetching)
                | (Fetching, Emitting)
                | (Emitting, Done)
                | (ProxyOpening, Error)
                | (Fetching, Error)
        )
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchState::Idle => "idle",
            FetchState::ProxyOpening => "proxy-opening",
            FetchState::Fetching => "fetching",
            FetchState::Emitting => "emitting",
            FetchState::Done => "done",
            FetchState::Error => "error",
        };
        f.write_str(name)
    }
}

/// One browse call: container id, sink and cancel token.
///
/// The request is single-shot; it delivers at most one terminal event.
pub struct BrowseRequest<'s> {
    container_id: Option<String>,
    state: FetchState,
    emitter: Emitter<'s>,
}

impl<'s> BrowseRequest<'s> {
    pub fn new(
        container_id: Option<&str>,
        sink: &'s mut dyn BrowseSink,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            container_id: container_id.map(str::to_string),
            state: FetchState::Idle,
            emitter: Emitter::new(sink, cancel),
        }
    }

    pub fn container_id(&self) -> Option<&str> {
        self.container_id.as_deref()
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        self.emitter.cancel_token()
    }

    pub fn is_cancelled(&self) -> bool {
        self.emitter.is_cancelled()
    }

    /// Moves to `next`. Returns `false` and leaves the state unchanged when
    /// the step is illegal.
    pub fn advance(&mut self, next: FetchState) -> bool {
        if !self.state.can_advance_to(next) {
            warn!(from = %self.state, to = %next, "Illegal browse state transition refused");
            return false;
        }
        self.state = next;
        true
    }

    /// Ends the request with the outcome of its fetch.
    ///
    /// A cancelled request, or a `Cancelled` error, ends silently in `Done`.
    pub fn finish(&mut self, outcome: Result<Vec<MediaEntry>, Error>) {
        if self.state.is_terminal() {
            warn!(state = %self.state, "Browse request already finished");
            return;
        }

        if self.is_cancelled() || matches!(outcome, Err(Error::Cancelled)) {
            debug!(container = ?self.container_id, "Browse cancelled, nothing delivered");
            self.emitter.abandon();
            self.state = FetchState::Done;
            return;
        }

        match outcome {
            Ok(entries) => {
                if self.state == FetchState::Fetching {
                    self.advance(FetchState::Emitting);
                }
                self.emitter.emit_all(entries);
                self.state = FetchState::Done;
            }
            Err(err) => {
                error!(container = ?self.container_id, "Browse failed: {}", err);
                self.emitter.fail(SourceError::from(err));
                self.state = FetchState::Error;
            }
        }
    }
}

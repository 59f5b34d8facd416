//! Dispatch of individual daemon round trips.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Per-request call policy: cancellation and reply timeout.
///
/// Every suspension point of a browse goes through [`RpcContext::dispatch`].
#[derive(Debug, Clone)]
pub struct RpcContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl RpcContext {
    pub fn new(cancel: CancellationToken, timeout: Option<Duration>) -> Self {
        Self { cancel, timeout }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Issues one call unless the request is already cancelled.
    ///
    /// `call` is only invoked after the token has been checked, so a
    /// cancelled request dispatches nothing. A call already in flight is not
    /// aborted by a later cancellation.
    pub async fn dispatch<T, F, Fut>(&self, method: &'static str, call: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            debug!(method, "Request cancelled, call not dispatched");
            return Err(Error::Cancelled);
        }

        let result = match self.timeout {
            Some(after) => match tokio::time::timeout(after, call()).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout { method, after }),
            },
            None => call().await,
        };

        if let Err(err) = &result {
            debug!(method, "Call failed: {}", err);
        }
        result
    }
}
